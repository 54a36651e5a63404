//! Rule compilation and application.
//!
//! Patterns are compiled eagerly, before any file is read: a malformed
//! pattern invalidates the whole run, since silently skipping rules would
//! patch the tree inconsistently.

use crate::config::RulesConfig;
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("rule set '{set}': invalid pattern `{pattern}`: {source}")]
    BadPattern {
        set: String,
        pattern: String,
        source: regex::Error,
    },
}

/// A single compiled substitution.
#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    replacement: String,
}

/// A named group of compiled rules, optionally scoped to one file.
#[derive(Debug, Clone)]
struct CompiledSet {
    file: Option<PathBuf>,
    rules: Vec<CompiledRule>,
}

/// All enabled rule sets of a rules file, compiled and ready to apply.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    sets: Vec<CompiledSet>,
}

impl RuleEngine {
    /// Compile every enabled rule set. Disabled sets are dropped here so
    /// the apply path never has to consult the flag again.
    pub fn compile(config: &RulesConfig) -> Result<Self, PatternError> {
        let mut sets = Vec::new();

        for set in config.sets.iter().filter(|s| s.enabled) {
            let mut rules = Vec::with_capacity(set.rules.len());
            for rule in &set.rules {
                let pattern =
                    Regex::new(&rule.pattern).map_err(|source| PatternError::BadPattern {
                        set: set.name.clone(),
                        pattern: rule.pattern.clone(),
                        source,
                    })?;
                rules.push(CompiledRule {
                    pattern,
                    replacement: rule.replacement.clone(),
                });
            }
            sets.push(CompiledSet {
                file: set.file.as_ref().map(PathBuf::from),
                rules,
            });
        }

        Ok(Self { sets })
    }

    /// Apply every applicable rule to `content`, in set order then rule
    /// order. Each substitution is global (all non-overlapping matches),
    /// and later rules see the output of earlier ones.
    ///
    /// `rel_path` is the file's path relative to the run root; sets
    /// carrying a file scope only fire when it matches.
    ///
    /// Pure: no I/O, no side effects. Returns `Cow::Borrowed` when no rule
    /// matched anywhere.
    pub fn apply<'a>(&self, rel_path: &Path, content: &'a str) -> Cow<'a, str> {
        let mut current: Cow<'a, str> = Cow::Borrowed(content);

        for set in &self.sets {
            if let Some(scope) = &set.file {
                if rel_path != scope {
                    continue;
                }
            }
            for rule in &set.rules {
                let replaced = rule
                    .pattern
                    .replace_all(current.as_ref(), rule.replacement.as_str());
                if let Cow::Owned(next) = replaced {
                    current = Cow::Owned(next);
                }
            }
        }

        current
    }

    /// Total number of rules across enabled sets.
    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(|s| s.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
