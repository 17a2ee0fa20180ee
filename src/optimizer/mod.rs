//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `media_optimizer`: Dispatcher principale
//! - `outcome`: Risultati tipizzati per ogni file
//! - `comparator`: Tiene il più piccolo tra originale e candidato
//! - `tool_runner`: Command line ed esecuzione dei tool esterni
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod comparator;
pub mod media_optimizer;
pub mod outcome;
pub mod path_resolver;
pub mod tool_runner;

pub use comparator::keep_smaller_file;
pub use media_optimizer::{MediaOptimizer, RunReport};
pub use outcome::{FileReport, Outcome};
pub use path_resolver::PathResolver;
pub use tool_runner::Invocation;
