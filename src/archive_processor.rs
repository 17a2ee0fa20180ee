//! # Archive Processing Module
//!
//! Questo modulo gestisce i container compressi.
//!
//! ## Responsabilità:
//! - gzip: con `convert_gzip` decompressione in-process (`flate2`),
//!   ricompressione in un archivio 7z e confronto con l'originale
//! - ZIP, EPUB, ODT: ricompressione DEFLATE in-place con `advzip`
//! - 7z: riconosciuto ma non supportato
//!
//! ## Conversione gzip:
//! ```text
//! logs.tar.gz --(flate2)--> logs.tar --(7z)--> logs.tar.7z
//! ```
//! Il file intermedio viene sempre rimosso. Se `logs.tar` o `logs.tar.7z`
//! esistono già la conversione non parte.

use crate::config::Features;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::comparator::keep_smaller_file;
use crate::optimizer::outcome::Outcome;
use crate::optimizer::path_resolver::PathResolver;
use crate::optimizer::tool_runner::{self, Invocation};
use crate::tool_resolver::{Tool, ToolTable};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Optimizes gzip, 7z and zip-family containers.
pub struct ArchiveProcessor<'a> {
    tools: &'a ToolTable,
    features: &'a Features,
}

impl<'a> ArchiveProcessor<'a> {
    pub fn new(tools: &'a ToolTable, features: &'a Features) -> Self {
        Self { tools, features }
    }

    /// Repackage a gzip file as 7z when enabled.
    pub async fn optimize_gzip(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        if !self.features.convert_gzip {
            info!("Skipping {}. Converting gzip to 7zip not enabled.", file.display());
            return Ok(Outcome::Skipped("converting gzip to 7zip is not enabled".to_string()));
        }

        let (decompressed, archive) = PathResolver::gzip_conversion_paths(file);
        FileManager::ensure_vacant(&decompressed).await?;
        FileManager::ensure_vacant(&archive).await?;
        // Fail before decompressing anything
        self.tools.path(Tool::SevenZip)?;

        info!("Decompressing {}...", file.display());
        if let Err(e) = decompress_gzip(file, &decompressed).await {
            FileManager::remove_if_exists(&decompressed).await?;
            return Err(e);
        }

        info!("Creating 7zip container...");
        let packed = tool_runner::run(self.tools, &Invocation::seven_zip_archive(&archive, &decompressed)).await;
        FileManager::remove_if_exists(&decompressed).await?;
        if let Err(e) = packed {
            FileManager::remove_if_exists(&archive).await?;
            return Err(e);
        }

        keep_smaller_file(file, &archive).await
    }

    pub async fn optimize_seven_zip(&self, _file: &Path) -> Result<Outcome, OptimizeError> {
        info!("7zip not yet supported.");
        Ok(Outcome::Unsupported("7-Zip archive recompression".to_string()))
    }

    /// Recompress a zip container (plain ZIP or EPUB) in place.
    pub async fn optimize_zip(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        let original_size = FileManager::file_size(file).await?;
        tool_runner::run(self.tools, &Invocation::advzip(file)).await?;
        let new_size = FileManager::file_size(file).await?;

        Ok(Outcome::Rewritten {
            original_size,
            new_size,
        })
    }

    /// Recompress an OpenDocument text file.
    pub async fn optimize_odt(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        if self.features.delete_thumbnails {
            // TODO: drop Thumbnails/thumbnail.png from the container before recompressing
            info!("Thumbnail removal is not implemented yet. Recompressing only.");
        }

        info!("Optimizing ODT zip compression.");
        self.optimize_zip(file).await
    }
}

/// Decompress every gzip member of `source` into `target`.
async fn decompress_gzip(source: &Path, target: &Path) -> Result<u64, OptimizeError> {
    let source = source.to_path_buf();
    let target = target.to_path_buf();

    let written = tokio::task::spawn_blocking(move || -> io::Result<u64> {
        let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(&source)?));
        let mut output = BufWriter::new(File::create(&target)?);
        let written = io::copy(&mut decoder, &mut output)?;
        output.flush()?;
        Ok(written)
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

    debug!("Decompressed {} bytes", written);
    Ok(written)
}
