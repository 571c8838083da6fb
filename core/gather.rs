use crate::error::{AppError, Result};
use crate::logger::RunLogger;
use crate::policy::ExclusionPolicy;
use crate::tree::{TreeNode, render_structure};
use log;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One eligible file and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Slash-separated, relative to the project root.
    pub relative_path: String,
    pub content: String,
}

/// Result of a single descent: the flat list of eligible files and the tree
/// they were collected from. Both come from the same decisions, so a file is
/// in `files` exactly when it is a leaf of `tree`.
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub files: Vec<String>,
    pub tree: TreeNode,
}

impl WalkOutcome {
    pub fn structure_preview(&self) -> String {
        render_structure(&self.tree)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

pub fn walk(project_root: &Path, policy: &ExclusionPolicy, logger: &dyn RunLogger) -> WalkOutcome {
    log::info!("Walking project directory: {}", project_root.display());
    let root_name = project_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_root.display().to_string());

    let mut files = Vec::new();
    let children = match list_dir(project_root) {
        Ok(entries) => walk_entries(entries, "", policy, logger, &mut files),
        Err(e) => {
            logger.warn(&format!(
                "Could not read project root {}: {}",
                project_root.display(),
                e
            ));
            vec![TreeNode::Error {
                message: format!("Error reading project root: {}", e),
            }]
        }
    };

    // Traversal order puts directories first; the flat list is plain
    // lexicographic so it reads the same way the artifact does.
    files.sort();
    log::info!("Directory walk complete. Found {} eligible files.", files.len());

    WalkOutcome {
        files,
        tree: TreeNode::Dir {
            name: root_name,
            children,
        },
    }
}

fn walk_entries(
    entries: Vec<DirEntry>,
    parent_relative: &str,
    policy: &ExclusionPolicy,
    logger: &dyn RunLogger,
    files: &mut Vec<String>,
) -> Vec<TreeNode> {
    let mut nodes = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative_path = if parent_relative.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", parent_relative, name)
        };

        let Some(kind) = classify(&entry) else {
            continue;
        };
        let is_dir = kind == EntryKind::Dir;

        if let Some(reason) = policy.exclusion_reason(&relative_path, is_dir) {
            log::trace!("Excluding {} ({:?})", relative_path, reason);
            continue;
        }

        match kind {
            EntryKind::Dir => {
                let children = match list_dir(entry.path()) {
                    Ok(sub_entries) => {
                        walk_entries(sub_entries, &relative_path, policy, logger, files)
                    }
                    Err(e) => {
                        logger.warn(&format!(
                            "Could not read directory {}: {}",
                            relative_path, e
                        ));
                        vec![TreeNode::Error {
                            message: format!("Error reading directory: {}", name),
                        }]
                    }
                };
                nodes.push(TreeNode::Dir { name, children });
            }
            EntryKind::File => {
                log::trace!("Including file: {}", relative_path);
                files.push(relative_path);
                nodes.push(TreeNode::File { name });
            }
        }
    }

    nodes
}

/// List one directory level, directories first, then by name (byte order).
fn list_dir(dir: &Path) -> Result<Vec<DirEntry>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by(compare_entries)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, walkdir::Error>>()
        .map_err(AppError::from)
}

fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.file_type()
        .is_dir()
        .cmp(&a.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Symlinks are never descended into; a link to a regular file counts as a
/// file. Sockets, FIFOs and dangling links are skipped.
fn classify(entry: &DirEntry) -> Option<EntryKind> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return Some(EntryKind::Dir);
    }
    if file_type.is_file() {
        return Some(EntryKind::File);
    }
    if file_type.is_symlink() {
        return match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => Some(EntryKind::File),
            Ok(meta) if meta.is_dir() => {
                log::debug!("Skipping symlinked directory: {}", entry.path().display());
                None
            }
            Ok(_) => None,
            Err(e) => {
                log::debug!(
                    "Skipping dangling symlink {}: {}",
                    entry.path().display(),
                    e
                );
                None
            }
        };
    }
    log::trace!("Skipping special file: {}", entry.path().display());
    None
}

/// Read every file concurrently. A failed read is reported as a warning and
/// the file is dropped; it never aborts the batch.
pub fn load_all(files: &[String], project_root: &Path, logger: &dyn RunLogger) -> Vec<FileRecord> {
    log::info!("Reading content for {} files...", files.len());

    let results: Vec<(&String, Result<FileRecord>)> = files
        .par_iter()
        .map(|relative_path| (relative_path, read_file(project_root, relative_path)))
        .collect();

    let mut records = Vec::with_capacity(results.len());
    for (relative_path, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(e) => logger.warn(&format!(
                "Could not read file: {}. Error: {}. Skipping.",
                relative_path, e
            )),
        }
    }
    log::info!("File reading complete. {} of {} read.", records.len(), files.len());
    records
}

fn read_file(project_root: &Path, relative_path: &str) -> Result<FileRecord> {
    let path: PathBuf = project_root.join(relative_path);
    let bytes = fs::read(&path).map_err(|e| AppError::FileRead {
        path: path.clone(),
        source: e,
    })?;
    let content = String::from_utf8(bytes)?;
    Ok(FileRecord {
        relative_path: relative_path.to_string(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;
    use crate::rules::{IgnoreRules, IgnoreRulesBuilder};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn policy(ignore_patterns: &[&str], include_hidden: bool) -> ExclusionPolicy {
        let rules = IgnoreRulesBuilder::new(false)
            .load(ignore_patterns.iter().copied())
            .build()
            .unwrap();
        ExclusionPolicy::new(rules, include_hidden, false).unwrap()
    }

    #[test]
    fn directories_sort_before_files_then_by_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "zeta.txt", b"z");
        write(dir.path(), "Alpha.txt", b"A");
        write(dir.path(), "alpha.txt", b"a");
        write(dir.path(), "mid/inner.txt", b"i");
        write(dir.path(), "Zdir/x.txt", b"x");

        let logger = MemoryLogger::new();
        let outcome = walk(dir.path(), &policy(&[], false), &logger);

        let TreeNode::Dir { children, .. } = &outcome.tree else {
            panic!("root must be a directory");
        };
        let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Zdir", "mid", "Alpha.txt", "alpha.txt", "zeta.txt"]);
        assert_eq!(
            outcome.files,
            vec!["Alpha.txt", "Zdir/x.txt", "alpha.txt", "mid/inner.txt", "zeta.txt"]
        );
    }

    #[test]
    fn excluded_directories_are_pruned() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.js", b"main");
        write(dir.path(), "node_modules/pkg/index.js", b"dep");
        write(dir.path(), "generated/keep.rs", b"gen");

        let logger = MemoryLogger::new();
        let outcome = walk(dir.path(), &policy(&["generated/"], false), &logger);

        assert_eq!(outcome.files, vec!["index.js"]);
        let preview = outcome.structure_preview();
        assert!(!preview.contains("node_modules"));
        assert!(!preview.contains("generated"));
    }

    #[test]
    fn binary_and_hidden_files_are_left_out() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "logo.png", &[0x89, 0x50]);
        write(dir.path(), ".env", b"SECRET=1");
        write(dir.path(), ".config/settings.json", b"{}");
        write(dir.path(), "notes.md", b"notes");

        let logger = MemoryLogger::new();
        let outcome = walk(dir.path(), &policy(&[], false), &logger);
        assert_eq!(outcome.files, vec!["notes.md"]);

        let with_hidden = walk(dir.path(), &policy(&[], true), &logger);
        assert_eq!(with_hidden.files, vec![".config/settings.json", "notes.md"]);
    }

    #[test]
    fn flat_list_matches_preview_leaves() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", b"a");
        write(dir.path(), "b/c.txt", b"c");
        write(dir.path(), "b/d/e.txt", b"e");
        write(dir.path(), "b/d/skip.log", b"log");
        write(dir.path(), "f.zip", b"zip");

        let logger = MemoryLogger::new();
        let outcome = walk(dir.path(), &policy(&[], false), &logger);

        let mut leaves = outcome.tree.file_paths();
        leaves.sort();
        assert_eq!(leaves, outcome.files);
        assert_eq!(outcome.files, vec!["a.txt", "b/c.txt", "b/d/e.txt"]);
    }

    #[test]
    fn empty_directories_still_appear_in_preview() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        write(dir.path(), "a.txt", b"a");

        let logger = MemoryLogger::new();
        let outcome = walk(dir.path(), &policy(&[], false), &logger);
        assert!(outcome.structure_preview().contains("├── empty/"));
        assert_eq!(outcome.files, vec!["a.txt"]);
    }

    #[test]
    fn missing_root_renders_error_leaf() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let logger = MemoryLogger::new();
        let outcome = walk(&missing, &policy(&[], false), &logger);

        assert!(outcome.files.is_empty());
        assert!(outcome.structure_preview().contains("[Error reading project root:"));
        assert_eq!(logger.warnings().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_becomes_error_leaf() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "ok.txt", b"ok");
        write(dir.path(), "locked/secret.txt", b"s");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read the directory anyway.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let logger = MemoryLogger::new();
        let outcome = walk(dir.path(), &policy(&[], false), &logger);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(outcome.files, vec!["ok.txt"]);
        assert!(
            outcome
                .structure_preview()
                .contains("└── [Error reading directory: locked]")
        );
        assert_eq!(logger.warnings().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "real/file.txt", b"f");
        symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
        symlink(dir.path().join("real/file.txt"), dir.path().join("link.txt")).unwrap();
        symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt")).unwrap();

        let logger = MemoryLogger::new();
        let outcome = walk(dir.path(), &policy(&[], false), &logger);
        assert_eq!(outcome.files, vec!["link.txt", "real/file.txt"]);
    }

    #[test]
    fn load_all_drops_failed_reads_with_warning() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", b"hello");
        write(dir.path(), "b.txt", b"world");
        write(dir.path(), "locked.txt", &[0xff, 0xfe, 0x00]);

        let files = vec![
            "a.txt".to_string(),
            "b.txt".to_string(),
            "locked.txt".to_string(),
            "vanished.txt".to_string(),
        ];
        let logger = MemoryLogger::new();
        let mut records = load_all(&files, dir.path(), &logger);
        records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].relative_path, "a.txt");
        assert_eq!(records[0].content, "hello");
        assert_eq!(records[1].content, "world");

        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("locked.txt")));
        assert!(warnings.iter().any(|w| w.contains("vanished.txt")));
        assert!(warnings.iter().any(|w| w.contains("UTF-8")));
    }

    #[test]
    fn load_all_passes_text_through_untouched() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "data.weird", b"  padded \n\n");

        let logger = MemoryLogger::new();
        let records = load_all(&["data.weird".to_string()], dir.path(), &logger);
        assert_eq!(records[0].content, "  padded \n\n");
        assert!(logger.warnings().is_empty());
    }

    #[test]
    fn walk_with_empty_rules() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "x.rs", b"fn x() {}");
        let p = ExclusionPolicy::new(IgnoreRules::empty(), false, false).unwrap();
        let logger = MemoryLogger::new();
        assert_eq!(walk(dir.path(), &p, &logger).files, vec!["x.rs"]);
    }
}
