//! Typed result of optimizing one path.

use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::media_type::MediaType;
use std::fmt;
use std::path::PathBuf;

/// What a handler did with a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The candidate was smaller and now lives at `path`.
    Replaced {
        path: PathBuf,
        original_size: u64,
        new_size: u64,
    },
    /// The candidate was not smaller and was deleted.
    KeptOriginal { original_size: u64, candidate_size: u64 },
    /// An in-place tool rewrote the file.
    Rewritten { original_size: u64, new_size: u64 },
    /// A feature is disabled or the path was not processed for another reason.
    Skipped(String),
    NothingToDo,
    /// The type was recognized but there is no optimizer for it.
    Unsupported(String),
    /// A directory whose `entries` children were dispatched.
    Directory { entries: usize },
}

impl Outcome {
    /// Bytes saved on disk, zero if the file did not shrink.
    pub fn bytes_saved(&self) -> u64 {
        match self {
            Outcome::Replaced {
                original_size,
                new_size,
                ..
            }
            | Outcome::Rewritten {
                original_size,
                new_size,
            } => original_size.saturating_sub(*new_size),
            _ => 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Replaced {
                path,
                original_size,
                new_size,
            } => write!(
                f,
                "replaced by {} ({} -> {}, {:.1}% saved)",
                path.display(),
                FileManager::format_size(*original_size),
                FileManager::format_size(*new_size),
                FileManager::calculate_reduction(*original_size, *new_size)
            ),
            Outcome::KeptOriginal {
                original_size,
                candidate_size,
            } => write!(
                f,
                "kept original ({} <= {})",
                FileManager::format_size(*original_size),
                FileManager::format_size(*candidate_size)
            ),
            Outcome::Rewritten {
                original_size,
                new_size,
            } => write!(
                f,
                "optimized in place ({} -> {})",
                FileManager::format_size(*original_size),
                FileManager::format_size(*new_size)
            ),
            Outcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            Outcome::NothingToDo => f.write_str("nothing to do"),
            Outcome::Unsupported(what) => write!(f, "unsupported: {}", what),
            Outcome::Directory { entries } => write!(f, "directory with {} entries", entries),
        }
    }
}

/// Per-path entry of a run.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// `None` when detection itself failed.
    pub media_type: Option<MediaType>,
    pub result: Result<Outcome, OptimizeError>,
}

impl FileReport {
    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }
}
