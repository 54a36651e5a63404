use anyhow::Result;
use bulkpatch::{load_from_path, FileOutcome, Patcher, RuleEngine, RulesConfig};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bulkpatch")]
#[command(about = "Bulk regex patching for source trees", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a rules file to every eligible file under a root directory
    Apply {
        /// Root directory to patch
        root: PathBuf,

        /// Path to the TOML rules file
        rules: PathBuf,

        /// Compute and report changes without writing any file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a unified diff for each modified file
        #[arg(short, long)]
        diff: bool,
    },

    /// Report which files a rules file would change, without writing
    Check {
        /// Root directory to inspect
        root: PathBuf,

        /// Path to the TOML rules file
        rules: PathBuf,
    },

    /// List the rule sets in a rules file
    List {
        /// Path to the TOML rules file
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            root,
            rules,
            dry_run,
            diff,
        } => cmd_apply(&root, &rules, dry_run, diff),

        Commands::Check { root, rules } => cmd_apply(&root, &rules, true, false),

        Commands::List { rules } => cmd_list(&rules),
    }
}

/// Load the rules file and compile its patterns.
///
/// Both steps happen before any target file is read, so a malformed rules
/// file or pattern aborts with a non-zero exit and an untouched tree.
fn load_engine(rules: &Path) -> Result<(RulesConfig, RuleEngine)> {
    let config = load_from_path(rules)?;
    let engine = RuleEngine::compile(&config)?;
    Ok((config, engine))
}

fn cmd_apply(root: &Path, rules: &Path, dry_run: bool, show_diff: bool) -> Result<()> {
    let (config, engine) = load_engine(rules)?;

    println!("Root: {}", root.display());
    println!(
        "Rules: {} ({} rules in {} enabled sets)",
        config.meta.name,
        engine.rule_count(),
        config.sets.iter().filter(|s| s.enabled).count()
    );
    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }
    println!();

    // Capture originals of the files that will change, so diffs can still
    // be shown after the rewrite.
    let mut originals: HashMap<PathBuf, String> = HashMap::new();
    if show_diff {
        let preview = Patcher::new(engine.clone(), config.meta.extensions.clone()).dry_run();
        for (path, outcome) in preview.run(root)?.outcomes {
            if matches!(outcome, Ok(FileOutcome::Patched)) {
                if let Ok(content) = fs::read_to_string(&path) {
                    originals.insert(path, content);
                }
            }
        }
    }

    let mut patcher = Patcher::new(engine.clone(), config.meta.extensions.clone());
    if dry_run {
        patcher = patcher.dry_run();
    }

    let report = patcher.run(root)?;

    for (path, outcome) in &report.outcomes {
        match outcome {
            Ok(FileOutcome::Patched) => {
                if dry_run {
                    println!("{} Would fix: {}", "✓".green(), path.display());
                } else {
                    println!("{} Fixed: {}", "✓".green(), path.display());
                }
                if show_diff {
                    if let Some(original) = originals.get(path) {
                        let patched = if dry_run {
                            let rel = path.strip_prefix(root).unwrap_or(path);
                            engine.apply(rel, original).into_owned()
                        } else {
                            fs::read_to_string(path).unwrap_or_default()
                        };
                        display_diff(path, original, &patched);
                    }
                }
            }
            Ok(FileOutcome::Unchanged) => {}
            Err(e) => {
                eprintln!("{} Error in {}: {}", "✗".red(), path.display(), e);
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} patched", format!("{}", report.patched()).green());
    println!("  {} unchanged", format!("{}", report.unchanged()).dimmed());
    println!("  {} failed", format!("{}", report.failed()).red());

    // Per-file failures are best-effort by policy: visible in the log
    // stream above, never in the exit code.
    Ok(())
}

fn cmd_list(rules: &Path) -> Result<()> {
    let config = load_from_path(rules)?;

    println!("{} {}", "Rules file:".bold(), config.meta.name);
    if let Some(description) = &config.meta.description {
        println!("{}", description.dimmed());
    }
    println!("Extensions: {}", config.meta.extensions.join(", "));
    println!();

    for set in &config.sets {
        let state = if set.enabled {
            "enabled".green()
        } else {
            "disabled".yellow()
        };
        let scope = set
            .file
            .as_deref()
            .map(|f| format!(" -> {}", f))
            .unwrap_or_default();
        println!("- {} ({} rules, {}){}", set.name, set.rules.len(), state, scope);
        for rule in &set.rules {
            println!(
                "    {} {} {}",
                rule.pattern.dimmed(),
                "=>".dimmed(),
                rule.replacement.dimmed()
            );
        }
    }

    Ok(())
}

/// Show a unified diff between original and patched content.
fn display_diff(file: &Path, original: &str, patched: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, patched);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
