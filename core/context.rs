//! Output assembly: ordering, rendering and writing the single text artifact.

use crate::error::{AppError, Result};
use crate::gather::FileRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use log;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const PATH_MARKER: &str = "// ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub text: String,
    /// Newline count of `text`, i.e. what `wc -l` reports for the file.
    pub line_count: usize,
}

impl Artifact {
    fn from_text(text: String) -> Self {
        let line_count = count_lines(&text);
        Self { text, line_count }
    }

    pub fn byte_len(&self) -> usize {
        self.text.len()
    }
}

pub fn count_lines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

/// Render the preview followed by every record, sorted by relative path.
pub fn assemble(mut records: Vec<FileRecord>, structure_preview: &str) -> Artifact {
    records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let capacity = structure_preview.len()
        + records
            .iter()
            .map(|r| r.relative_path.len() + r.content.len() + 8)
            .sum::<usize>();
    let mut text = String::with_capacity(capacity + 2);

    text.push_str(structure_preview);
    text.push_str("\n\n");

    for record in &records {
        text.push_str(PATH_MARKER);
        text.push_str(&record.relative_path);
        text.push_str("\n\n");
        text.push_str(record.content.trim());
        text.push_str("\n\n");
    }

    let trimmed_len = text.trim_end().len();
    text.truncate(trimmed_len);
    text.push('\n');

    log::debug!(
        "Assembled artifact: {} files, {} bytes",
        records.len(),
        text.len()
    );
    Artifact::from_text(text)
}

/// The artifact written when nothing survived filtering.
pub fn placeholder(project_root: &Path, generated_at: DateTime<Utc>) -> Artifact {
    let text = format!(
        "// Export found no processable text files.\n// Searched root: {}\n// Generated at: {}\n",
        project_root.display(),
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    Artifact::from_text(text)
}

/// Write the artifact through a uniquely named temporary file in the same
/// directory and rename it into place, then stat the result. Returns the
/// size in bytes on disk. Existing files next to the output are never
/// reused as the temporary.
pub fn write_artifact(output_path: &Path, artifact: &Artifact) -> Result<u64> {
    let parent = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.exists() {
        fs::create_dir_all(&parent).map_err(|e| AppError::DirCreation {
            path: parent.clone(),
            source: e,
        })?;
    }

    let write_failure = |e: std::io::Error| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    };

    let mut temp_file = NamedTempFile::new_in(&parent).map_err(write_failure)?;
    log::debug!(
        "Writing artifact to temporary file {}",
        temp_file.path().display()
    );
    temp_file
        .write_all(artifact.text.as_bytes())
        .and_then(|_| temp_file.flush())
        .map_err(write_failure)?;
    // On failure the temporary is dropped and removed with the error.
    temp_file
        .persist(output_path)
        .map_err(|e| write_failure(e.error))?;

    let metadata = fs::metadata(output_path).map_err(|e| AppError::FileStat {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    log::info!(
        "Wrote {} bytes to {}",
        metadata.len(),
        output_path.display()
    );
    Ok(metadata.len())
}
