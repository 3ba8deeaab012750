use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    ignore::IgnoreSet,
};

/// A discovered file, one entry of the document catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Fully resolved absolute path.
    pub path: String,
    pub basename: String,
    /// Lower-cased extension including the leading dot; empty if none.
    pub extension: String,
    pub size_bytes: u64,
    /// ISO-8601 local timestamps at second precision.
    pub modified_at: String,
    pub created_at: String,
    pub accessed_at: String,
}

/// Recursively walk `roots` and collect eligible files.
///
/// Roots that do not exist are skipped; the crawl fails only when none of
/// the supplied roots resolve. Per-entry I/O errors (permissions, races)
/// are logged and skipped so one bad directory never aborts the crawl.
/// Directory entries are visited in file-name order, making repeated crawls
/// of an unchanged tree deterministic.
pub fn discover(
    roots: &[PathBuf],
    ignore: &IgnoreSet,
    extensions: Option<&HashSet<String>>,
) -> Result<Vec<FileRecord>> {
    let reachable: Vec<PathBuf> = roots
        .iter()
        .filter_map(|root| match root.canonicalize() {
            Ok(path) => Some(path),
            Err(_) => {
                debug!("skipping unreachable root {}", root.display());
                None
            }
        })
        .collect();

    if reachable.is_empty() {
        return Err(Error::Config(format!(
            "none of the {} supplied roots exist",
            roots.len()
        )));
    }

    let mut records = Vec::new();
    for root in &reachable {
        debug!("scanning root {}", root.display());
        walk_dir(root, ignore, extensions, &mut records);
    }
    debug!(
        "discovered {} files across {} roots",
        records.len(),
        reachable.len()
    );
    Ok(records)
}

fn walk_dir(
    dir: &Path,
    ignore: &IgnoreSet,
    extensions: Option<&HashSet<String>>,
    records: &mut Vec<FileRecord>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot read directory {}: {e}", dir.display());
            return;
        }
    };

    // Sort for stable traversal order; read_dir order is OS-dependent.
    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                warn!("cannot stat {}: {e}", path.display());
                continue;
            }
        };

        if file_type.is_dir() {
            if !ignore.is_ignored(&path) {
                walk_dir(&path, ignore, extensions, records);
            }
        } else if file_type.is_file() {
            visit_file(&path, &path, ignore, extensions, records);
        } else if file_type.is_symlink() {
            // Follow symlinks to regular files; skip broken links and
            // directory links (cycle prevention).
            match path.canonicalize() {
                Ok(resolved) if resolved.is_file() => {
                    visit_file(&path, &resolved, ignore, extensions, records);
                }
                _ => continue,
            }
        }
    }
}

fn visit_file(
    path: &Path,
    resolved: &Path,
    ignore: &IgnoreSet,
    extensions: Option<&HashSet<String>>,
    records: &mut Vec<FileRecord>,
) {
    if ignore.is_ignored(path) {
        return;
    }

    let extension = normalized_extension(path);
    if let Some(allowed) = extensions
        && !allowed.contains(&extension)
    {
        return;
    }

    let metadata = match std::fs::metadata(resolved) {
        Ok(m) => m,
        Err(e) => {
            warn!("cannot stat {}: {e}", path.display());
            return;
        }
    };

    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    records.push(FileRecord {
        path: path.to_string_lossy().to_string(),
        basename: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        extension,
        size_bytes: metadata.len(),
        modified_at: isoformat(modified),
        created_at: isoformat(metadata.created().unwrap_or(modified)),
        accessed_at: isoformat(metadata.accessed().unwrap_or(modified)),
    });
}

/// Lower-cased extension with leading dot, or empty string.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn isoformat(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(time)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}
