//! # Audio Processing Module
//!
//! Ricodifica lossless dell'audio con `flac`.
//!
//! ## Responsabilità:
//! - FLAC: ricodifica al livello di compressione massimo, tiene il più piccolo
//! - WAV: conversione a FLAC (solo con `convert_wav`); il WAV viene eliminato
//!   solo se il FLAC esiste alla fine della conversione

use crate::config::Features;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::comparator::run_and_keep_smaller;
use crate::optimizer::outcome::Outcome;
use crate::optimizer::path_resolver::PathResolver;
use crate::optimizer::tool_runner::Invocation;
use crate::tool_resolver::ToolTable;
use std::path::Path;
use tracing::{info, warn};

/// Optimizes FLAC and WAV files.
pub struct AudioProcessor<'a> {
    tools: &'a ToolTable,
    features: &'a Features,
}

impl<'a> AudioProcessor<'a> {
    pub fn new(tools: &'a ToolTable, features: &'a Features) -> Self {
        Self { tools, features }
    }

    /// Re-encode a FLAC file at the highest compression level.
    pub async fn optimize_flac(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        info!("Re-compressing {}...", file.display());
        self.encode_flac(file).await
    }

    /// Convert a WAV file to FLAC when enabled.
    pub async fn optimize_wav(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        if !self.features.convert_wav {
            info!("Leaving WAV as is.");
            return Ok(Outcome::Skipped("converting WAV to FLAC is not enabled".to_string()));
        }

        let flac = PathResolver::converted_path(file, "flac");
        FileManager::ensure_vacant(&flac).await?;

        info!("Converting wav file to FLAC...");
        let result = self.encode_flac(file).await;
        if let Err(ref e) = result {
            warn!("Failed to convert wav to FLAC: {}", e);
        }

        // The comparator normally removed the WAV already
        if flac.is_file() && FileManager::remove_if_exists(file).await? {
            info!("Deleted original {}", file.display());
        }

        result
    }

    async fn encode_flac(&self, file: &Path) -> Result<Outcome, OptimizeError> {
        let candidate = PathResolver::candidate_path(file, "flac");
        let invocation = Invocation::flac_encode(file, &candidate);
        run_and_keep_smaller(self.tools, &invocation, file, &candidate).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::FakeTools;
    use crate::tool_resolver::Tool;
    use tempfile::TempDir;

    fn convert_wav() -> Features {
        Features {
            convert_wav: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_flac_recompression_replaces_in_place() {
        let fakes = FakeTools::new();
        fakes.install(Tool::Flac, "printf 'fLaC' > \"$6\"");
        let tools = fakes.table();
        let dir = TempDir::new().unwrap();
        let song = dir.path().join("song.flac");
        std::fs::write(&song, vec![0u8; 50]).unwrap();

        let defaults = Features::default();
        let outcome = AudioProcessor::new(&tools, &defaults).optimize_flac(&song).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Replaced {
                path: song.clone(),
                original_size: 50,
                new_size: 4
            }
        );
        assert_eq!(std::fs::read(&song).unwrap(), b"fLaC");
        let candidate = dir.path().join("song.flac.tmp");
        assert_eq!(
            fakes.calls(),
            vec![format!(
                "flac {} -f -V --compression-level-8 -o {}",
                song.display(),
                candidate.display()
            )]
        );
    }

    #[tokio::test]
    async fn test_wav_left_alone_by_default() {
        let fakes = FakeTools::new();
        fakes.install(Tool::Flac, "printf 'fLaC' > \"$6\"");
        let tools = fakes.table();
        let dir = TempDir::new().unwrap();
        let wav = dir.path().join("take.wav");
        std::fs::write(&wav, vec![0u8; 50]).unwrap();

        let defaults = Features::default();
        let outcome = AudioProcessor::new(&tools, &defaults).optimize_wav(&wav).await.unwrap();

        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert!(wav.exists());
        assert!(fakes.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wav_deleted_once_flac_exists() {
        let fakes = FakeTools::new();
        fakes.install(Tool::Flac, "printf 'fLaC' > \"$6\"");
        let tools = fakes.table();
        let dir = TempDir::new().unwrap();
        let wav = dir.path().join("take.wav");
        std::fs::write(&wav, vec![0u8; 50]).unwrap();

        let features = convert_wav();
        let outcome = AudioProcessor::new(&tools, &features).optimize_wav(&wav).await.unwrap();

        let flac = dir.path().join("take.flac");
        assert!(matches!(outcome, Outcome::Replaced { ref path, .. } if path == &flac));
        assert!(!wav.exists());
        assert_eq!(std::fs::read(&flac).unwrap(), b"fLaC");
    }

    #[tokio::test]
    async fn test_wav_preserved_when_flac_missing_or_failing() {
        let dir = TempDir::new().unwrap();
        let wav = dir.path().join("take.wav");
        std::fs::write(&wav, vec![0u8; 50]).unwrap();
        let features = convert_wav();

        // not installed
        let none = ToolTable::default();
        let err = AudioProcessor::new(&none, &features).optimize_wav(&wav).await.unwrap_err();
        assert!(matches!(err, OptimizeError::MissingDependency(Tool::Flac)));
        assert!(wav.exists());

        // crashes halfway through writing
        let fakes = FakeTools::new();
        fakes.install(Tool::Flac, "printf 'half' > \"$6\"; exit 1");
        let tools = fakes.table();
        let err = AudioProcessor::new(&tools, &features).optimize_wav(&wav).await.unwrap_err();
        assert!(matches!(err, OptimizeError::ToolFailed { .. }));
        assert!(wav.exists());
        assert!(!dir.path().join("take.flac").exists());
        assert!(!dir.path().join("take.flac.tmp").exists());
    }

    #[tokio::test]
    async fn test_wav_refuses_to_overwrite_existing_flac() {
        let fakes = FakeTools::new();
        fakes.install(Tool::Flac, "printf 'fLaC' > \"$6\"");
        let tools = fakes.table();
        let dir = TempDir::new().unwrap();
        let wav = dir.path().join("take.wav");
        let flac = dir.path().join("take.flac");
        std::fs::write(&wav, vec![0u8; 50]).unwrap();
        std::fs::write(&flac, b"another take").unwrap();

        let features = convert_wav();
        let err = AudioProcessor::new(&tools, &features).optimize_wav(&wav).await.unwrap_err();

        assert!(matches!(err, OptimizeError::WouldOverwrite(_)));
        assert!(wav.exists());
        assert_eq!(std::fs::read(&flac).unwrap(), b"another take");
    }

    #[tokio::test]
    async fn test_misnamed_flac_does_not_replace_sibling() {
        let fakes = FakeTools::new();
        fakes.install(Tool::Flac, "printf 'fLaC' > \"$6\"");
        let tools = fakes.table();
        let dir = TempDir::new().unwrap();
        let misnamed = dir.path().join("take.audio");
        let sibling = dir.path().join("take.flac");
        std::fs::write(&misnamed, vec![0u8; 50]).unwrap();
        std::fs::write(&sibling, b"another recording").unwrap();

        let defaults = Features::default();
        let err = AudioProcessor::new(&tools, &defaults)
            .optimize_flac(&misnamed)
            .await
            .unwrap_err();

        assert!(matches!(err, OptimizeError::WouldOverwrite(ref p) if p == &sibling));
        assert_eq!(std::fs::read(&sibling).unwrap(), b"another recording");
        assert_eq!(std::fs::read(&misnamed).unwrap(), vec![0u8; 50]);
        assert!(fakes.calls().is_empty());
    }
}
