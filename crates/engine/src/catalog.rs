use std::fs;
use std::path::Path;
use std::time::SystemTime;

use comicshelf_core::{ArchiveEntry, Error, Result, SortKey, is_archive_name};
use log::{debug, warn};

/// Lists the archives directly inside `dir`, ordered by `key`.
///
/// An empty folder yields an empty list; only an unreadable folder is an error.
/// Files whose metadata cannot be read are left out.
pub fn scan(dir: &Path, key: SortKey, descending: bool) -> Result<Vec<ArchiveEntry>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let read_dir = fs::read_dir(dir).map_err(|err| {
        debug!("read dir {} failed: {err}", dir.display());
        Error::DirectoryNotFound {
            path: dir.to_path_buf(),
        }
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skip unreadable entry in {}: {err}", dir.display());
                continue;
            }
        };
        let display_name = entry.file_name().to_string_lossy().to_string();
        if !is_archive_name(&display_name) {
            continue;
        }
        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(err) => {
                warn!("skip {}: {err}", path.display());
                continue;
            }
        };
        entries.push(ArchiveEntry {
            path,
            display_name,
            size_bytes: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    // read_dir order is unspecified; fix it so ties sort the same on every scan.
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    sort_entries(&mut entries, key, descending);
    debug!("scanned {}: {} archives", dir.display(), entries.len());
    Ok(entries)
}

/// Stable sort by `key`; `descending` reverses the final order.
pub fn sort_entries(entries: &mut [ArchiveEntry], key: SortKey, descending: bool) {
    match key {
        SortKey::Name => entries.sort_by_cached_key(|entry| entry.title().to_lowercase()),
        SortKey::Date => entries.sort_by_key(|entry| entry.modified),
        SortKey::Size => entries.sort_by_key(|entry| entry.size_bytes),
    }
    if descending {
        entries.reverse();
    }
}
