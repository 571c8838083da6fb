//! Gitignore-dialect rule sets.
//!
//! Rules are evaluated in load order and the last matching rule decides, so
//! a later `!pattern` re-includes a path that an earlier rule excluded. The
//! matching itself is delegated to the `ignore` crate's gitignore engine; this
//! module owns loading, path normalization and case handling.

use crate::error::{AppError, Result};
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::fs;
use std::path::Path;

/// Outcome of evaluating one path against a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The last matching rule is an exclusion.
    Ignored,
    /// The last matching rule is a negation (`!pattern`).
    Whitelisted,
    /// No rule matched.
    Unmatched,
}

/// Whether the host filesystem is usually case-insensitive.
pub fn host_is_case_insensitive() -> bool {
    cfg!(any(windows, target_os = "macos"))
}

/// Convert a relative path to the slash-separated form rules are matched
/// against. Leading `./` and `/` and any trailing `/` are removed.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    let trimmed = normalized.trim_start_matches('/').trim_end_matches('/');
    trimmed.to_string()
}

pub struct IgnoreRulesBuilder {
    builder: GitignoreBuilder,
    case_insensitive: bool,
    rule_count: usize,
    rejected: Vec<String>,
}

impl IgnoreRulesBuilder {
    pub fn new(case_insensitive: bool) -> Self {
        let mut builder = GitignoreBuilder::new(".");
        if let Err(e) = builder.case_insensitive(case_insensitive) {
            log::warn!("Could not configure case sensitivity for ignore rules: {}", e);
        }
        Self {
            builder,
            case_insensitive,
            rule_count: 0,
            rejected: Vec::new(),
        }
    }

    /// Append patterns after every previously loaded one. Blank lines and
    /// `#` comments are accepted and skipped; invalid globs are recorded in
    /// `rejected()` and otherwise ignored.
    pub fn load<I, S>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.add(pattern.as_ref());
        }
        self
    }

    /// Load the raw text of an ignore file, one pattern per line.
    pub fn load_text(&mut self, text: &str) -> &mut Self {
        self.load(text.lines())
    }

    pub fn add(&mut self, pattern: &str) -> &mut Self {
        let line = pattern.trim_end_matches(['\r', '\n']);
        match self.builder.add_line(None, line) {
            Ok(_) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    self.rule_count += 1;
                    log::trace!("Loaded ignore rule: {}", line);
                }
            }
            Err(e) => {
                log::warn!("Skipping invalid ignore pattern \"{}\": {}", line, e);
                self.rejected.push(line.to_string());
            }
        }
        self
    }

    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn build(&self) -> Result<IgnoreRules> {
        let matcher = self.builder.build()?;
        log::debug!(
            "Built ignore rule set with {} rules (case-insensitive: {})",
            self.rule_count,
            self.case_insensitive
        );
        Ok(IgnoreRules {
            matcher,
            rule_count: self.rule_count,
        })
    }
}

/// An immutable, ordered rule set. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
    rule_count: usize,
}

impl IgnoreRules {
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            rule_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }

    /// Evaluate `path` and, when nothing matches it directly, its ancestor
    /// directories (closest first).
    pub fn verdict(&self, path: &str, is_dir: bool) -> Verdict {
        let normalized = normalize_path(path);
        if normalized.is_empty() || self.matcher.is_empty() {
            return Verdict::Unmatched;
        }
        match self
            .matcher
            .matched_path_or_any_parents(Path::new(&normalized), is_dir)
        {
            Match::Ignore(_) => Verdict::Ignored,
            Match::Whitelist(_) => Verdict::Whitelisted,
            Match::None => Verdict::Unmatched,
        }
    }

    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        self.verdict(path, is_dir) == Verdict::Ignored
    }

    /// Convenience form: a trailing `/` marks the path as a directory.
    pub fn matches(&self, path: &str) -> bool {
        let is_dir = path.ends_with('/') || path.ends_with('\\');
        self.is_ignored(path, is_dir)
    }
}

/// Read the raw pattern text of an ignore file that lives at `file_name`
/// relative to the project root.
pub fn read_ignore_file(project_root: &Path, file_name: &str) -> Result<String> {
    let path = project_root.join(file_name);
    log::debug!("Reading ignore file: {}", path.display());
    fs::read_to_string(&path).map_err(|e| AppError::FileRead { path, source: e })
}
