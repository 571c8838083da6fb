//! One export run: rules, walk, read, assemble, write.

use crate::config::Config;
use crate::context::{self, Artifact};
use crate::error::Result;
use crate::gather::{self, WalkOutcome};
use crate::logger::RunLogger;
use crate::policy::ExclusionPolicy;
use crate::rules::{IgnoreRules, IgnoreRulesBuilder, read_ignore_file};
use chrono::Utc;
use log;
use std::path::{Path, PathBuf};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub byte_size: u64,
    pub total_line_count: usize,
    pub file_count: usize,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.byte_size == 0 && self.file_count == 0
    }
}

/// Load the project's ignore file. A missing or unreadable file is not an
/// error: the run continues with the built-in rules only.
pub fn load_ignore_rules(
    project_root: &Path,
    config: &Config,
    logger: &dyn RunLogger,
) -> Result<IgnoreRules> {
    let ignore_file = &config.filters.ignore_file;
    let mut builder = IgnoreRulesBuilder::new(config.effective_case_insensitive());

    match read_ignore_file(project_root, ignore_file) {
        Ok(text) => {
            builder.load_text(&text);
            for rejected in builder.rejected() {
                logger.warn(&format!(
                    "Ignoring invalid pattern in {}: {}",
                    ignore_file, rejected
                ));
            }
            logger.info(&format!("{} rules loaded.", ignore_file));
        }
        Err(e) => {
            log::debug!("Ignore file unavailable: {}", e);
            logger.warn(&format!(
                "{} not found or unreadable. Proceeding with built-in exclusions only.",
                ignore_file
            ));
        }
    }

    builder.build()
}

pub fn build_policy(
    project_root: &Path,
    output_path: &Path,
    config: &Config,
    logger: &dyn RunLogger,
) -> Result<ExclusionPolicy> {
    let ignore_rules = load_ignore_rules(project_root, config, logger)?;
    let policy = ExclusionPolicy::new(
        ignore_rules,
        config.filters.include_hidden,
        config.effective_case_insensitive(),
    )?;
    Ok(match pathdiff::diff_paths(output_path, project_root) {
        Some(relative) => policy.exclude_output(&relative),
        None => policy,
    })
}

/// Scan without reading or writing anything. Useful to preview what a run
/// would pick up.
pub fn scan_project(
    project_root: &Path,
    config: &Config,
    logger: &dyn RunLogger,
) -> Result<WalkOutcome> {
    let output_path = config.output_path(project_root);
    let policy = build_policy(project_root, &output_path, config, logger)?;
    Ok(gather::walk(project_root, &policy, logger))
}

pub fn export_project(
    project_root: &Path,
    config: &Config,
    logger: &dyn RunLogger,
) -> Result<RunReport> {
    let output_path = config.output_path(project_root);
    logger.info(&format!(
        "Starting export... Output will be {}",
        config.output.filename
    ));

    let policy = build_policy(project_root, &output_path, config, logger)?;
    let outcome = gather::walk(project_root, &policy, logger);
    logger.info(&format!(
        "Found {} candidate files after filtering.",
        outcome.files.len()
    ));

    let records = gather::load_all(&outcome.files, project_root, logger);
    logger.info(&format!("Successfully read {} text files.", records.len()));

    let file_count = records.len();
    let artifact: Artifact = if records.is_empty() {
        context::placeholder(project_root, Utc::now())
    } else {
        context::assemble(records, &outcome.structure_preview())
    };

    let byte_size = match context::write_artifact(&output_path, &artifact) {
        Ok(size) => size,
        Err(e) => {
            logger.error(&format!(
                "Failed to write output file: {}",
                output_path.display()
            ));
            return Err(e);
        }
    };

    logger.success(&format!("Export written to {}", output_path.display()));
    Ok(RunReport {
        output_path,
        byte_size,
        total_line_count: artifact.line_count,
        file_count,
    })
}
