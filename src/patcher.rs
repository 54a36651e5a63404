//! File patching and tree traversal.
//!
//! One linear pass: each eligible file is read fully, run through the rule
//! engine, and rewritten only when the result differs byte-for-byte from
//! what was read. Per-file failures are recorded and never stop the run.

use crate::engine::RuleEngine;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Directories that never contain hand-written sources worth patching.
const PRUNED_DIRS: &[&str] = &[".git", "node_modules", "dist", "build", "target"];

#[derive(Error, Debug)]
pub enum PatchError {
    /// File unreadable, or not valid UTF-8.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("root directory does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("root directory is not readable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of patching one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "FileOutcome should be checked for patched/unchanged"]
pub enum FileOutcome {
    /// Content changed and the file was rewritten.
    Patched,
    /// No rule changed the content; the file was left untouched on disk.
    Unchanged,
}

/// Per-file outcomes for one run, in traversal order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<(PathBuf, Result<FileOutcome, PatchError>)>,
}

impl RunReport {
    pub fn patched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, r)| matches!(r, Ok(FileOutcome::Patched)))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, r)| matches!(r, Ok(FileOutcome::Unchanged)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_err()).count()
    }
}

/// Applies a compiled rule engine across a directory tree.
#[derive(Debug, Clone)]
pub struct Patcher {
    engine: RuleEngine,
    extensions: Vec<String>,
    dry_run: bool,
}

impl Patcher {
    pub fn new(engine: RuleEngine, extensions: Vec<String>) -> Self {
        Self {
            engine,
            extensions,
            dry_run: false,
        }
    }

    /// Compute outcomes without writing anything back.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    fn eligible(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Read one file, apply every rule, and rewrite it only when the result
    /// differs byte-for-byte from what was read.
    ///
    /// Unchanged files are never opened for writing, so their content and
    /// mtime both stay as they were.
    pub fn patch_file(&self, root: &Path, path: &Path) -> Result<FileOutcome, PatchError> {
        let content = fs::read_to_string(path).map_err(|source| PatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let rel = path.strip_prefix(root).unwrap_or(path);
        let patched = self.engine.apply(rel, &content);

        if patched == content {
            return Ok(FileOutcome::Unchanged);
        }

        if !self.dry_run {
            atomic_write(path, patched.as_bytes()).map_err(|source| PatchError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(FileOutcome::Patched)
    }

    /// Walk the tree under `root` and patch every eligible file.
    ///
    /// Read/write failures are caught at the per-file boundary and recorded
    /// in the report; traversal continues. Only a missing or non-directory
    /// root aborts the run, before any file is touched.
    pub fn run(&self, root: &Path) -> Result<RunReport, PatchError> {
        if !root.exists() {
            return Err(PatchError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(PatchError::NotADirectory(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|source| PatchError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut report = RunReport::default();

        // depth 0 is the root itself, which may legitimately be named like
        // a pruned directory.
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| PRUNED_DIRS.contains(&name)))
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    let source = err.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop")
                    });
                    report
                        .outcomes
                        .push((path.clone(), Err(PatchError::Read { path, source })));
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.eligible(entry.path()) {
                continue;
            }

            let outcome = self.patch_file(root, entry.path());
            report.outcomes.push((entry.path().to_path_buf(), outcome));
        }

        Ok(report)
    }
}

/// Atomic file write: tempfile in the same directory + fsync + rename.
///
/// Either the full write lands or the original file is untouched.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Bump mtime so watchers keyed on coarse timestamps see the change.
    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    Ok(())
}
