//! # Tool Path Resolver
//!
//! This module builds the table of external optimizer binaries used for the
//! whole run. Tools are looked up once at startup:
//! - Explicit per-tool paths from the configuration file
//! - A directory of bundled tools (`LOSSLESS_OPTIMIZER_TOOLS_DIR`)
//! - The platform lookup (`PATH`, plus registry and install dirs on Windows)
//!
//! A tool that cannot be found is not an error here. Only the files that need
//! it fail, with an installation hint.

use crate::error::OptimizeError;
use crate::platform::{self, SystemInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming a directory of bundled tools.
pub const TOOLS_DIR_ENV: &str = "LOSSLESS_OPTIMIZER_TOOLS_DIR";

/// External optimizer binaries this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[serde(rename = "7z")]
    SevenZip,
    #[serde(rename = "flac")]
    Flac,
    #[serde(rename = "jpegoptim")]
    Jpegoptim,
    #[serde(rename = "optipng")]
    Optipng,
    #[serde(rename = "advpng")]
    Advpng,
    #[serde(rename = "cwebp")]
    Cwebp,
    #[serde(rename = "advzip")]
    Advzip,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::SevenZip,
        Tool::Flac,
        Tool::Jpegoptim,
        Tool::Optipng,
        Tool::Advpng,
        Tool::Cwebp,
        Tool::Advzip,
    ];

    /// Name of the executable, without any platform extension.
    pub fn command_name(self) -> &'static str {
        match self {
            Tool::SevenZip => "7z",
            Tool::Flac => "flac",
            Tool::Jpegoptim => "jpegoptim",
            Tool::Optipng => "optipng",
            Tool::Advpng => "advpng",
            Tool::Cwebp => "cwebp",
            Tool::Advzip => "advzip",
        }
    }

    /// What the tool is used for, shown in the tools report.
    pub fn purpose(self) -> &'static str {
        match self {
            Tool::SevenZip => "gzip to 7z conversion",
            Tool::Flac => "FLAC re-encoding and WAV conversion",
            Tool::Jpegoptim => "JPEG optimization",
            Tool::Optipng => "PNG optimization (first pass)",
            Tool::Advpng => "PNG optimization (second pass)",
            Tool::Cwebp => "WebP encoding and PNG conversion",
            Tool::Advzip => "ZIP, EPUB and ODT recompression",
        }
    }

    /// Where to get the tool.
    pub fn install_hint(self) -> &'static str {
        match self {
            Tool::SevenZip => "Install 7-Zip (https://www.7-zip.org/) and try again.",
            Tool::Flac => "Install `flac` (https://xiph.org/flac/) to continue.",
            Tool::Jpegoptim => "Install jpegoptim (https://github.com/tjko/jpegoptim) and try again.",
            Tool::Optipng => {
                "Install OptiPNG to improve compression. (http://optipng.sourceforge.net/)"
            }
            Tool::Advpng | Tool::Advzip => {
                "Install the AdvanceCOMP utilities. (https://www.advancemame.it/comp-readme)"
            }
            Tool::Cwebp => {
                "Install `cwebp` (https://developers.google.com/speed/webp/docs/cwebp) and try again."
            }
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())
    }
}

/// Resolved location of every tool, built once and then only read.
#[derive(Debug, Clone, Default)]
pub struct ToolTable {
    paths: BTreeMap<Tool, PathBuf>,
}

impl ToolTable {
    /// Resolve every known tool for the current platform.
    ///
    /// `overrides` wins over everything else, even when the path does not
    /// exist (configuration validation reports that case earlier).
    pub fn resolve(overrides: &BTreeMap<Tool, PathBuf>) -> Self {
        let bundled_dir = env::var_os(TOOLS_DIR_ENV)
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir());
        if let Some(ref dir) = bundled_dir {
            debug!("Using bundled tools directory: {:?}", dir);
        }

        let mut paths = BTreeMap::new();
        for tool in Tool::ALL {
            let resolved = overrides
                .get(&tool)
                .cloned()
                .or_else(|| bundled_dir.as_deref().and_then(|dir| platform::find_in_dir(dir, tool)))
                .or_else(|| platform::locate(tool));

            match resolved {
                Some(path) => {
                    debug!("Resolved tool: {} -> {:?}", tool, path);
                    paths.insert(tool, path);
                }
                None => warn!("Tool not found: {} ({})", tool, tool.purpose()),
            }
        }

        Self { paths }
    }

    /// Build a table from known paths, leaving every other tool unresolved.
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = (Tool, PathBuf)>,
    {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Path of `tool`, or `MissingDependency` if it was not found.
    pub fn path(&self, tool: Tool) -> Result<&Path, OptimizeError> {
        self.paths
            .get(&tool)
            .map(PathBuf::as_path)
            .ok_or(OptimizeError::MissingDependency(tool))
    }

    /// Human readable availability report.
    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str("Tool availability\n");
        report.push_str(&format!("Platform: {}\n\n", SystemInfo::current()));

        for tool in Tool::ALL {
            match self.paths.get(&tool) {
                Some(path) => {
                    report.push_str(&format!("  [OK] {} -> {} ({})\n", tool, path.display(), tool.purpose()));
                }
                None => {
                    report.push_str(&format!("  [MISSING] {} ({})\n", tool, tool.purpose()));
                    report.push_str(&format!("            {}\n", tool.install_hint()));
                }
            }
        }

        report
    }
}
