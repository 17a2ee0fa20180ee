//! # Image Processing Module
//!
//! Questo modulo gestisce l'ottimizzazione lossless dei formati immagine
//! delegando tutto il lavoro a tool esterni.
//!
//! ## Formati Supportati
//!
//! | Formato | Default | Con feature attiva | Tool Utilizzati |
//! |---------|---------|--------------------|-----------------|
//! | JPEG    | ottimizzazione in-place, metadati intatti | `strip_jpeg`: rimozione metadati | jpegoptim |
//! | PNG     | due passate in-place | `convert_png`: conversione a WebP | optipng, advpng / cwebp |
//! | WebP    | ricodifica, tiene il più piccolo | - | cwebp |
//!
//! ## Strategia
//! - I tool in-place (jpegoptim, optipng, advpng) riscrivono il file da soli
//! - I tool che producono un nuovo file scrivono un candidato `.tmp`, poi il
//!   comparatore tiene il file più piccolo
//! - Un tool mancante non interrompe la run: l'errore risale al dispatcher
//!
//! ```rust,ignore
//! let processor = ImageProcessor::new(&tools, &config.features);
//! let outcome = processor.optimize_png(Path::new("logo.png")).await?;
//! ```

use crate::config::Features;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::comparator::run_and_keep_smaller;
use crate::optimizer::outcome::Outcome;
use crate::optimizer::path_resolver::PathResolver;
use crate::optimizer::tool_runner::{self, Invocation};
use crate::tool_resolver::ToolTable;
use std::path::Path;
use tracing::{info, warn};

/// Optimizes JPEG, PNG and WebP files with external tools.
pub struct ImageProcessor<'a> {
    /// Resolved tool locations
    tools: &'a ToolTable,
    /// Enabled optional optimizations
    features: &'a Features,
}

impl<'a> ImageProcessor<'a> {
    pub fn new(tools: &'a ToolTable, features: &'a Features) -> Self {
        Self { tools, features }
    }

    /// Run jpegoptim in place, stripping metadata only when enabled.
    pub async fn optimize_jpeg(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        if !self.features.strip_jpeg {
            warn!("Option `--strip-jpg` not set. Metadata will be untouched.");
        }

        let original_size = FileManager::file_size(file).await?;
        tool_runner::run(self.tools, &Invocation::jpegoptim(file, self.features.strip_jpeg)).await?;
        let new_size = FileManager::file_size(file).await?;

        Ok(Outcome::Rewritten {
            original_size,
            new_size,
        })
    }

    /// Optimize a PNG in place with two passes, or convert it to WebP.
    ///
    /// Both passes are always attempted. The file only counts as failed when
    /// neither pass ran.
    pub async fn optimize_png(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        if self.features.convert_png {
            info!("Converting PNG to WebP...");
            return self.convert_png_to_webp(file).await;
        }

        info!("Optimizing PNGs...");
        let original_size = FileManager::file_size(file).await?;

        let mut first_error = None;
        let mut passes_ok = 0;
        // advpng must run last
        for pass in [Invocation::optipng(file), Invocation::advpng(file)] {
            info!("Using {}...", pass.tool);
            match tool_runner::run(self.tools, &pass).await {
                Ok(()) => passes_ok += 1,
                Err(e) => {
                    warn!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if let (0, Some(e)) = (passes_ok, first_error) {
            return Err(e);
        }

        let new_size = FileManager::file_size(file).await?;
        Ok(Outcome::Rewritten {
            original_size,
            new_size,
        })
    }

    /// Re-encode a WebP at maximum effort and keep the smaller file.
    pub async fn optimize_webp(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        self.encode_webp(file).await
    }

    async fn convert_png_to_webp(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        FileManager::ensure_vacant(&PathResolver::converted_path(file, "webp")).await?;
        self.encode_webp(file).await
    }

    async fn encode_webp(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        let candidate = PathResolver::candidate_path(file, "webp");
        let invocation = Invocation::cwebp(file, &candidate);
        run_and_keep_smaller(self.tools, &invocation, file, &candidate).await
    }
}
