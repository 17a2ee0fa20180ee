//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` per distinguere i diversi tipi di fallimento
//! - Separa "tool mancante" da "tool fallito" così il dispatcher può
//!   loggare e proseguire con il file successivo
//! - Integra con `thiserror` per la conversione automatica da `std::io::Error`
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Detection`: Impossibile determinare il tipo di un file
//! - `MissingDependency`: Tool esterno non installato (7z, flac, cwebp...)
//! - `ToolFailed`: Tool presente ma terminato con errore
//! - `CannotCompare`: Il file candidato non è mai stato creato
//! - `WouldOverwrite`: La conversione sovrascriverebbe un file esistente
//! - `Validation`: Errori di validazione della configurazione
//!
//! ## Esempio:
//! ```rust,ignore
//! let path = tools.path(Tool::Cwebp)?; // MissingDependency se non trovato
//! ```

use crate::tool_resolver::Tool;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Custom error types for lossless optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine the type of {}: {reason}", .path.display())]
    Detection { path: PathBuf, reason: String },

    #[error("`{0}` is not installed. {}", .0.install_hint())]
    MissingDependency(Tool),

    #[error("`{tool}` failed ({status}){}", stderr_suffix(.stderr))]
    ToolFailed {
        tool: Tool,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Could not compare file sizes: {} was never created", .0.display())]
    CannotCompare(PathBuf),

    #[error("Refusing to overwrite existing file {}", .0.display())]
    WouldOverwrite(PathBuf),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl OptimizeError {
    /// Whether this failure only means an optional tool is absent.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency(_))
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}
