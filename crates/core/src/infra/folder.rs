//! Input/output folder housekeeping: scanning, relocation and statistics.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::domain::api::FolderStats;
use crate::domain::error::AppError;
use crate::infra::extractor;
use crate::infra::output::timestamp;

/// Subfolder of the input dir receiving successfully processed files
pub const PROCESSED_DIR: &str = "processed";
/// Subfolder of the input dir receiving failed files
pub const ERRORS_DIR: &str = "errors";

/// Supported files directly inside `dir`, oldest modification first.
/// A missing folder is created and yields an empty list.
pub async fn scan_input_folder(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::storage(format!("Failed to create input folder {}: {e}", dir.display()))
        })?;
        return Ok(Vec::new());
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        AppError::storage(format!("Failed to read input folder {}: {e}", dir.display()))
    })?;

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Error while listing {}: {e}", dir.display());
                break;
            }
        };

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if !extractor::is_supported(&name) {
            continue;
        }

        // The file may vanish between listing and stat
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }

        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((modified, path));
    }

    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Moves `file` into `<input_dir>/processed/`, keeping its name.
pub async fn move_to_processed(input_dir: &Path, file: &Path) -> Result<PathBuf, AppError> {
    let name = file_name(file)?;
    let target = input_dir.join(PROCESSED_DIR).join(name);
    relocate(file, &target).await?;
    Ok(target)
}

/// Moves `file` into `<input_dir>/errors/error_<YYYYMMDD_HHMMSS>_<name>`.
pub async fn move_to_errors(input_dir: &Path, file: &Path) -> Result<PathBuf, AppError> {
    let name = file_name(file)?;
    let target = input_dir
        .join(ERRORS_DIR)
        .join(format!("error_{}_{name}", timestamp()));
    relocate(file, &target).await?;
    Ok(target)
}

fn file_name(file: &Path) -> Result<String, AppError> {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::internal(format!("Not a file path: {}", file.display())))
}

async fn relocate(from: &Path, to: &Path) -> Result<(), AppError> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::storage(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }

    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    // rename fails across filesystems; fall back to copy + delete
    tokio::fs::copy(from, to).await.map_err(|e| {
        AppError::storage(format!("Failed to move {} to {}: {e}", from.display(), to.display()))
    })?;
    tokio::fs::remove_file(from).await.map_err(|e| {
        AppError::storage(format!("Copied but could not remove {}: {e}", from.display()))
    })?;
    Ok(())
}

/// Recursive statistics for `dir`. A missing folder reports `exists: false`.
pub async fn folder_stats(dir: &Path) -> FolderStats {
    let mut stats = FolderStats {
        path: dir.display().to_string(),
        ..Default::default()
    };

    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return stats;
    }
    stats.exists = true;

    let mut total_size: u64 = 0;
    let mut file_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot read {}: {e}", current.display());
                continue;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let path = entry.path();

            if meta.is_dir() {
                stats.total_directories += 1;
                pending.push(path);
            } else if meta.is_file() {
                stats.total_files += 1;
                total_size += meta.len();

                let ext = path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                    .unwrap_or_default();
                *file_types.entry(ext).or_insert(0) += 1;

                let name = entry.file_name().to_string_lossy().to_string();
                if extractor::is_supported(&name) {
                    stats.supported_files += 1;
                }
            }
        }
    }

    stats.file_types = file_types;
    stats.total_size_mb = (total_size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;
    stats
}
