//! # Lossless Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e feature opzionali
//! - `error`: Tipi di errore custom (tool mancante, tool fallito, ...)
//! - `media_type`: Enumerazione chiusa dei tipi gestiti
//! - `detector`: Rilevamento del MIME type con catena di fallback
//! - `platform` / `tool_resolver`: Ricerca dei tool esterni
//! - `image_processor`: JPEG, PNG, WebP
//! - `audio_processor`: FLAC, WAV
//! - `archive_processor`: gzip, 7z, ZIP/EPUB/ODT
//! - `optimizer`: Dispatcher, comparatore e esecuzione dei tool
//! - `file_manager`: Operazioni sui file
//! - `progress`: Spinner e statistiche
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use lossless_optimizer::{Config, MediaOptimizer, ToolTable};
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let config = Config::default();
//! let tools = ToolTable::resolve(&config.tool_paths);
//! let optimizer = MediaOptimizer::new(config, tools);
//! let report = optimizer.run(&[PathBuf::from("photo.png")]).await;
//! println!("{}", report.stats.format_summary());
//! # }
//! ```

pub mod archive_processor;
pub mod audio_processor;
pub mod config;
pub mod detector;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod media_type;
pub mod optimizer;
pub mod platform;
pub mod progress;
pub mod tool_resolver;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::{Config, DetectionMethod, Features};
pub use error::OptimizeError;
pub use media_type::MediaType;
pub use optimizer::{FileReport, MediaOptimizer, Outcome, RunReport};
pub use tool_resolver::{Tool, ToolTable};
