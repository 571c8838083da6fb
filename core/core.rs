pub mod builtin;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod gather;
pub mod logger;
pub mod policy;
pub mod rules;
pub mod tree;

pub use builtin::{BuiltinIgnores, get_builtin_ignore_patterns, is_binary_extension};
pub use config::Config;
pub use context::{Artifact, assemble, placeholder, write_artifact};
pub use error::{AppError, Result};
pub use export::{RunReport, export_project, scan_project};
pub use gather::{FileRecord, WalkOutcome, load_all, walk};
pub use logger::{EventLevel, LogEvent, MemoryLogger, RunLogger};
pub use policy::{Exclusion, ExclusionPolicy};
pub use rules::{IgnoreRules, IgnoreRulesBuilder, Verdict};
pub use tree::{TreeNode, render_structure};
