//! Bulkpatch: deterministic bulk regex patching for source trees
//!
//! Applies ordered pattern/replacement rule sets to every eligible file
//! under a root directory, rewriting only files whose content changed.
//!
//! # Architecture
//!
//! Rules live in a TOML rules file and are compiled eagerly into a
//! [`RuleEngine`] before any file is read. Application is a pure function
//! over file content; all intelligence lives in the rule list, not in the
//! apply loop. [`Patcher`] owns the traversal and the write policy.
//!
//! Substitution is textual, with no syntactic awareness: a pattern that
//! also matches unrelated occurrences will rewrite them too. That is the
//! documented contract, not a defect; a syntax-aware rewriter is a
//! different, larger tool.
//!
//! # Safety
//!
//! - Patterns compile before traversal begins; one bad rule aborts the run
//! - Byte-for-byte comparison: untouched files keep content and mtime
//! - Atomic file writes (tempfile + fsync + rename)
//! - Per-file read/write errors are recorded, never abort the run
//!
//! # Example
//!
//! ```no_run
//! use bulkpatch::{load_from_str, Patcher, RuleEngine};
//! use std::path::Path;
//!
//! let config = load_from_str(
//!     r#"
//! [meta]
//! name = "ts-fixes"
//!
//! [[sets]]
//! name = "renames"
//!
//! [[sets.rules]]
//! pattern = "currentImages="
//! replacement = "currentImageUrls="
//! "#,
//! )
//! .unwrap();
//!
//! let engine = RuleEngine::compile(&config).unwrap();
//! let patcher = Patcher::new(engine, config.meta.extensions.clone());
//! let report = patcher.run(Path::new("web/src")).unwrap();
//! println!("{} files patched", report.patched());
//! ```

pub mod config;
pub mod engine;
pub mod patcher;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, Rule, RuleSet, RulesConfig};
pub use engine::{PatternError, RuleEngine};
pub use patcher::{FileOutcome, PatchError, Patcher, RunReport};
