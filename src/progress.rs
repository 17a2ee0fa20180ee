//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il feedback visivo e le statistiche della run.
//!
//! ## Responsabilità:
//! - Spinner con `indicatif` mentre un tool esterno è in esecuzione
//! - Tracking statistiche di ottimizzazione (file processati, saved, errors)
//! - Riepilogo finale su una riga
//!
//! ## Statistiche tracciate:
//! - **files_processed**: Totale file elaborati (le directory non contano)
//! - **files_optimized**: File diventati più piccoli
//! - **files_skipped**: File lasciati com'erano
//! - **total_bytes_saved**: Byte totali risparmiati
//! - **total_original_size**: Dimensione totale file originali
//! - **errors**: Numero di errori durante processing
//!
//! ## Esempio:
//! ```rust,ignore
//! let spinner = tool_spinner("Running optipng");
//! // ... attende il processo ...
//! spinner.finish_and_clear();
//!
//! let mut stats = OptimizationStats::new();
//! stats.record(&report);
//! info!("{}", stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use crate::optimizer::outcome::{FileReport, Outcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for a running external tool.
///
/// Draws to stderr and stays hidden when stderr is not a terminal.
pub fn tool_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();

    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner
}

/// Statistics tracker for optimization results
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_optimized: usize,
    pub files_skipped: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
    pub errors: usize,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one report. Directory entries are only containers.
    pub fn record(&mut self, report: &FileReport) {
        match &report.result {
            Ok(Outcome::Directory { .. }) => {}
            Ok(outcome @ (Outcome::Replaced { original_size, .. } | Outcome::Rewritten { original_size, .. })) => {
                let saved = outcome.bytes_saved();
                if saved > 0 {
                    self.add_optimized(*original_size, original_size - saved);
                } else {
                    self.add_skipped(*original_size);
                }
            }
            Ok(Outcome::KeptOriginal { original_size, .. }) => self.add_skipped(*original_size),
            Ok(Outcome::Skipped(_)) | Ok(Outcome::NothingToDo) | Ok(Outcome::Unsupported(_)) => {
                self.add_skipped(0)
            }
            Err(_) => self.add_error(),
        }
    }

    pub fn add_optimized(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_optimized += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_skipped(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_skipped += 1;
        self.total_original_size += original_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Optimized: {} | Skipped: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_optimized,
            self.files_skipped,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}
