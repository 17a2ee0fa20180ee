//! # Size Comparator
//!
//! Risolve una coppia (originale, candidato) lasciando su disco un solo file:
//! quello più piccolo. A parità di dimensione vince l'originale.

use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::outcome::Outcome;
use crate::optimizer::path_resolver::PathResolver;
use crate::optimizer::tool_runner::{self, Invocation};
use crate::tool_resolver::ToolTable;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Run a tool that writes `candidate`, then keep the smaller file.
///
/// A leftover candidate from an interrupted run is deleted first. If the tool
/// fails, whatever it wrote to `candidate` is deleted too.
///
/// When the winning candidate would be renamed onto a name other than
/// `original`, that name must be free or nothing runs.
pub async fn run_and_keep_smaller(
    tools: &ToolTable,
    invocation: &Invocation,
    original: &Path,
    candidate: &Path,
) -> Result<Outcome, OptimizeError> {
    if let Some(final_path) = PathResolver::strip_temp_suffix(candidate) {
        if final_path != original {
            FileManager::ensure_vacant(&final_path).await?;
        }
    }

    if FileManager::remove_if_exists(candidate).await? {
        warn!("Removed stale temporary file {}", candidate.display());
    }

    if let Err(e) = tool_runner::run(tools, invocation).await {
        FileManager::remove_if_exists(candidate).await?;
        return Err(e);
    }

    keep_smaller_file(original, candidate).await
}

/// Keep whichever of `original` and `candidate` is smaller.
///
/// A winning candidate loses its `.tmp` suffix; candidates without one keep
/// their name. If the candidate was never created nothing is touched.
pub async fn keep_smaller_file(original: &Path, candidate: &Path) -> Result<Outcome, OptimizeError> {
    let candidate_size = match fs::metadata(candidate).await {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(OptimizeError::CannotCompare(candidate.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let original_size = fs::metadata(original).await?.len();

    debug!(
        "Comparing {} ({} bytes) with {} ({} bytes)",
        original.display(),
        original_size,
        candidate.display(),
        candidate_size
    );

    if candidate_size < original_size {
        info!("New file was smaller in size.");
        fs::remove_file(original).await?;

        let path = match PathResolver::strip_temp_suffix(candidate) {
            Some(final_path) => {
                fs::rename(candidate, &final_path).await?;
                final_path
            }
            None => candidate.to_path_buf(),
        };

        Ok(Outcome::Replaced {
            path,
            original_size,
            new_size: candidate_size,
        })
    } else {
        info!("Original file was smaller or equal in size.");
        fs::remove_file(candidate).await?;

        Ok(Outcome::KeptOriginal {
            original_size,
            candidate_size,
        })
    }
}
