//! The layered exclusion decision applied to every walked entry.

use crate::builtin::{get_builtin_ignore_patterns, is_binary_extension};
use crate::error::Result;
use crate::rules::{IgnoreRules, IgnoreRulesBuilder, Verdict, normalize_path};
use log;
use std::path::Path;

/// Why an entry was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Hidden,
    Builtin,
    OutputArtifact,
    IgnoreFile,
    BinaryExtension,
}

#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    builtin: IgnoreRules,
    ignore_file: IgnoreRules,
    output_path: Option<String>,
    include_hidden: bool,
}

impl ExclusionPolicy {
    /// Policy with the built-in patterns compiled for the given case mode.
    pub fn new(ignore_file: IgnoreRules, include_hidden: bool, case_insensitive: bool) -> Result<Self> {
        let builtin = IgnoreRulesBuilder::new(case_insensitive)
            .load(&get_builtin_ignore_patterns().hardcoded)
            .build()?;
        Ok(Self::with_builtin(builtin, ignore_file, include_hidden))
    }

    pub fn with_builtin(builtin: IgnoreRules, ignore_file: IgnoreRules, include_hidden: bool) -> Self {
        Self {
            builtin,
            ignore_file,
            output_path: None,
            include_hidden,
        }
    }

    /// Exclude the artifact itself, given as a path relative to the project
    /// root. Paths that leave the root are not reachable by the walk and are
    /// dropped.
    pub fn exclude_output(mut self, relative_path: &Path) -> Self {
        let normalized = normalize_path(&relative_path.to_string_lossy());
        if normalized.is_empty() || normalized == ".." || normalized.starts_with("../") {
            log::debug!(
                "Output path {} lies outside the project root; nothing to exclude",
                relative_path.display()
            );
            self.output_path = None;
        } else {
            log::debug!("Excluding output artifact: {}", normalized);
            self.output_path = Some(normalized);
        }
        self
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    pub fn should_exclude(&self, relative_path: &str, is_dir: bool) -> bool {
        self.exclusion_reason(relative_path, is_dir).is_some()
    }

    pub fn exclusion_reason(&self, relative_path: &str, is_dir: bool) -> Option<Exclusion> {
        let path = normalize_path(relative_path);
        if path.is_empty() {
            return None;
        }

        let ignore_verdict = self.ignore_file.verdict(&path, is_dir);

        if !self.include_hidden
            && is_hidden(&path)
            && ignore_verdict != Verdict::Whitelisted
        {
            return Some(Exclusion::Hidden);
        }

        if self.builtin.is_ignored(&path, is_dir) {
            return Some(Exclusion::Builtin);
        }

        if !is_dir && self.output_path.as_deref() == Some(path.as_str()) {
            return Some(Exclusion::OutputArtifact);
        }

        if ignore_verdict == Verdict::Ignored {
            return Some(Exclusion::IgnoreFile);
        }

        if !is_dir && has_binary_extension(&path) {
            return Some(Exclusion::BinaryExtension);
        }

        None
    }
}

/// Any component that starts with a dot makes the path hidden.
pub fn is_hidden(normalized_path: &str) -> bool {
    normalized_path
        .split('/')
        .any(|component| component.starts_with('.') && component != "." && component != "..")
}

fn has_binary_extension(normalized_path: &str) -> bool {
    Path::new(normalized_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_binary_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore_rules(patterns: &[&str]) -> IgnoreRules {
        IgnoreRulesBuilder::new(false)
            .load(patterns.iter().copied())
            .build()
            .unwrap()
    }

    fn policy(patterns: &[&str], include_hidden: bool) -> ExclusionPolicy {
        ExclusionPolicy::new(ignore_rules(patterns), include_hidden, false).unwrap()
    }

    #[test]
    fn builtin_directories_are_excluded() {
        let p = policy(&[], true);
        assert_eq!(p.exclusion_reason("node_modules", true), Some(Exclusion::Builtin));
        assert_eq!(p.exclusion_reason(".git", true), Some(Exclusion::Builtin));
        assert_eq!(p.exclusion_reason("pkg/dist", true), Some(Exclusion::Builtin));
        assert_eq!(p.exclusion_reason("src", true), None);
    }

    #[test]
    fn builtin_files_are_excluded() {
        let p = policy(&[], true);
        assert!(p.should_exclude("package-lock.json", false));
        assert!(p.should_exclude("server.log", false));
        assert!(p.should_exclude(".DS_Store", false));
        assert!(p.should_exclude(".env", false));
        assert!(p.should_exclude(".env.local", false));
        assert!(!p.should_exclude(".env.example", false));
        assert!(!p.should_exclude("src/main.rs", false));
    }

    #[test]
    fn hidden_entries_need_the_flag() {
        let p = policy(&[], false);
        assert_eq!(p.exclusion_reason(".github", true), Some(Exclusion::Hidden));
        assert_eq!(p.exclusion_reason(".prettierrc", false), Some(Exclusion::Hidden));
        assert_eq!(p.exclusion_reason("src/.hidden/x.rs", false), Some(Exclusion::Hidden));

        let p = policy(&[], true);
        assert_eq!(p.exclusion_reason(".prettierrc", false), None);
        assert_eq!(p.exclusion_reason(".github", true), None);
    }

    #[test]
    fn ignore_file_negation_rescues_hidden_entries() {
        let p = policy(&["!.github/"], false);
        assert_eq!(p.exclusion_reason(".github", true), None);
        assert_eq!(p.exclusion_reason(".github/workflows/ci.yml", false), None);
        assert_eq!(p.exclusion_reason(".vscode", true), Some(Exclusion::Hidden));
    }

    #[test]
    fn negation_cannot_override_builtin() {
        let p = policy(&["!node_modules/"], true);
        assert_eq!(p.exclusion_reason("node_modules", true), Some(Exclusion::Builtin));
    }

    #[test]
    fn output_artifact_is_excluded() {
        let p = policy(&[], false).exclude_output(Path::new("codebase.txt"));
        assert_eq!(p.output_path(), Some("codebase.txt"));
        assert_eq!(p.exclusion_reason("codebase.txt", false), Some(Exclusion::OutputArtifact));
        assert_eq!(p.exclusion_reason("sub/codebase.txt", false), None);

        let nested = policy(&[], false).exclude_output(Path::new("./exports/all.md"));
        assert_eq!(nested.exclusion_reason("exports/all.md", false), Some(Exclusion::OutputArtifact));

        let outside = policy(&[], false).exclude_output(Path::new("../elsewhere.txt"));
        assert_eq!(outside.output_path(), None);
    }

    #[test]
    fn ignore_file_rules_apply_after_builtins() {
        let p = policy(&["*.snap", "fixtures/", "!fixtures/keep.txt"], false);
        assert_eq!(p.exclusion_reason("a.snap", false), Some(Exclusion::IgnoreFile));
        assert_eq!(p.exclusion_reason("fixtures", true), Some(Exclusion::IgnoreFile));
        assert_eq!(p.exclusion_reason("fixtures/keep.txt", false), None);
        assert_eq!(p.exclusion_reason("src/lib.rs", false), None);
    }

    #[test]
    fn binary_extensions_only_apply_to_files() {
        let p = policy(&[], false);
        assert_eq!(p.exclusion_reason("logo.PNG", false), Some(Exclusion::BinaryExtension));
        assert_eq!(p.exclusion_reason("assets/font.woff2", false), Some(Exclusion::BinaryExtension));
        assert_eq!(p.exclusion_reason("images.png", true), None);
        assert_eq!(p.exclusion_reason("icon.svg", false), None);
    }

    #[test]
    fn hidden_detection() {
        assert!(is_hidden(".env"));
        assert!(is_hidden("a/.b/c"));
        assert!(!is_hidden("a/b.c/d"));
        assert!(!is_hidden("src/main.rs"));
    }
}
