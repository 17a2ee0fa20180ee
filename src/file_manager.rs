//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file condivise dagli ottimizzatori.
//!
//! ## Responsabilità:
//! - Lettura dimensione file
//! - Elenco dei figli diretti di una directory (ordine stabile)
//! - Rimozione di file temporanei rimasti da esecuzioni precedenti
//! - Formattazione human-readable delle dimensioni
//! - Calcolo percentuale di riduzione
//!
//! ## Esempio:
//! ```rust,ignore
//! let children = FileManager::list_children(Path::new("/path/to/dir"))?;
//! for child in children {
//!     // dispatch child
//! }
//! ```

use crate::error::OptimizeError;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Manages file operations shared by the optimizers
pub struct FileManager;

impl FileManager {
    /// Size in bytes of the file at `path`
    pub async fn file_size(path: &Path) -> Result<u64, OptimizeError> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Immediate children of `dir`, sorted by file name.
    ///
    /// Links are not followed while listing. Entries that cannot be read are
    /// logged and left out.
    pub fn list_children(dir: &Path) -> Result<Vec<PathBuf>, OptimizeError> {
        // The root itself must be readable, otherwise walkdir only yields an error.
        std::fs::read_dir(dir)?;

        let mut children = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => children.push(entry.into_path()),
                Err(e) => warn!("Cannot read entry in {}: {}", dir.display(), e),
            }
        }

        Ok(children)
    }

    /// Delete `path` if it exists. Returns whether something was removed.
    pub async fn remove_if_exists(path: &Path) -> Result<bool, OptimizeError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Fail with `WouldOverwrite` if anything already sits at `target`.
    pub async fn ensure_vacant(target: &Path) -> Result<(), OptimizeError> {
        match fs::symlink_metadata(target).await {
            Ok(_) => Err(OptimizeError::WouldOverwrite(target.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
