//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `Features` con le ottimizzazioni opzionali (conversioni, strip)
//! - Definisce la struct `Config` passata esplicitamente al dispatcher
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Valida i percorsi dei tool indicati manualmente
//!
//! ## Ottimizzazioni opzionali:
//! - `convert_gzip`: Ricomprime i file gzip come archivi 7z
//! - `strip_jpeg`: Rimuove i metadati dai JPEG
//! - `convert_png`: Converte i PNG in WebP
//! - `convert_wav`: Converte i WAV in FLAC
//! - `delete_thumbnails`: Rimozione thumbnail dagli ODT (ancora inerte)
//!
//! ## Livelli di ottimizzazione (`-A`):
//! - Livello 1: `strip_jpeg` + `convert_wav`
//! - Livello 2: in più `convert_gzip`, `delete_thumbnails` e `convert_png`
//!
//! ## Esempio:
//! ```rust
//! use lossless_optimizer::Config;
//!
//! let mut config = Config::default();
//! config.features.enable_level(1);
//! assert!(config.features.strip_jpeg);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::OptimizeError;
use crate::tool_resolver::Tool;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory name used under the user configuration directory.
pub const CONFIG_DIR_NAME: &str = "lossless-optimizer";

/// Optional optimizations, all disabled by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Recompress gzipped files as 7zip
    pub convert_gzip: bool,
    /// Strip metadata from JPEGs
    pub strip_jpeg: bool,
    /// Convert PNG files to WebP
    pub convert_png: bool,
    /// Convert WAV files to FLAC
    pub convert_wav: bool,
    /// Delete embedded thumbnails from ODT files (does nothing yet)
    pub delete_thumbnails: bool,
}

impl Features {
    /// Apply the "enable more optimizations" shortcut. Flags are only ever
    /// turned on.
    pub fn enable_level(&mut self, level: u8) {
        if level >= 1 {
            self.strip_jpeg = true;
            self.convert_wav = true;
        }
        if level >= 2 {
            self.convert_gzip = true;
            self.delete_thumbnails = true;
            self.convert_png = true;
        }
    }

    /// Turn on every flag that is on in `other`.
    pub fn merge(&mut self, other: &Features) {
        self.convert_gzip |= other.convert_gzip;
        self.strip_jpeg |= other.strip_jpeg;
        self.convert_png |= other.convert_png;
        self.convert_wav |= other.convert_wav;
        self.delete_thumbnails |= other.delete_thumbnails;
    }
}

/// How file types are detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    /// Sniff file contents. The extension is only used when the file
    /// cannot be read
    #[default]
    Native,
    /// Ask the `file` command, then fall back to the extension
    FileCommand,
    /// Only look at the extension
    Extension,
}

/// Configuration for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional optimizations
    pub features: Features,
    /// Descend into directories
    pub recursive: bool,
    /// File type detection strategy
    pub detection: DetectionMethod,
    /// Explicit tool locations, checked before any lookup
    pub tool_paths: BTreeMap<Tool, PathBuf>,
    /// `file` utility used by [`DetectionMethod::FileCommand`], instead of
    /// the one found on `PATH`
    pub file_command: Option<PathBuf>,
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        for (tool, path) in &self.tool_paths {
            if !path.is_file() {
                return Err(OptimizeError::Validation(format!(
                    "configured path for {} does not exist: {}",
                    tool,
                    path.display()
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Default location of the configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid configuration file {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
