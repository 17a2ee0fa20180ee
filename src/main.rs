//! # Lossless Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Caricamento della configurazione e merge con i flag CLI
//! - Risoluzione dei tool esterni e avvio dell'optimizer
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (file, feature, ricorsione, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica il file di configurazione e applica i flag sopra di esso
//! 4. Risolve i tool una sola volta
//! 5. Istanzia MediaOptimizer e processa i file uno alla volta
//!
//! ## Esempio di utilizzo:
//! ```bash
//! lossless-optimizer -r -A photos/ music/*.wav --verbose
//! ```

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lossless_optimizer::{Config, DetectionMethod, Features, MediaOptimizer, ToolTable};

#[derive(Parser, Debug)]
#[command(name = "lossless-optimizer", version)]
#[command(about = "Automate lossless optimization of many file types")]
struct Args {
    /// Files or directories to process
    files: Vec<PathBuf>,

    /// Search recursively through directories for files to process
    #[arg(short, long)]
    recursive: bool,

    /// Recompress gzipped files as 7zip
    #[arg(short = 'g', long)]
    convert_gzip: bool,

    /// Strip metadata from JPEGs. Otherwise metadata is left untouched
    #[arg(short = 'j', long, visible_alias = "strip-jpg")]
    strip_jpeg: bool,

    /// Convert PNG files to WebP
    #[arg(short = 'p', long)]
    convert_png: bool,

    /// Convert WAV files to FLAC
    #[arg(short = 'w', long)]
    convert_wav: bool,

    /// Delete unnecessary thumbnails embedded in ODT files (does nothing right now)
    #[arg(long, alias = "delete_thumbnails")]
    delete_thumbnails: bool,

    /// Enable common conversions (same as -jw). Use twice to also enable -g, -p and --delete-thumbnails
    #[arg(short = 'A', long, action = ArgAction::Count)]
    all_optimizations: u8,

    /// How file types are detected
    #[arg(long, value_enum)]
    detection: Option<DetectionMethod>,

    /// Configuration file (defaults to the user configuration directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration back to the configuration file
    #[arg(long)]
    save_config: bool,

    /// Show which external tools were found and exit
    #[arg(long)]
    list_tools: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Layer the command line on top of the loaded configuration.
    ///
    /// Flags can only turn features on.
    fn apply_to(&self, config: &mut Config) {
        config.recursive |= self.recursive;
        config.features.merge(&Features {
            convert_gzip: self.convert_gzip,
            strip_jpeg: self.strip_jpeg,
            convert_png: self.convert_png,
            convert_wav: self.convert_wav,
            delete_thumbnails: self.delete_thumbnails,
        });
        config.features.enable_level(self.all_optimizations);
        if let Some(detection) = self.detection {
            config.detection = detection;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match config_path {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    if args.save_config {
        match config_path {
            Some(ref path) => {
                config.save_to_file(path).await?;
                info!("Configuration saved to {}", path.display());
            }
            None => warn!("No configuration directory on this platform, nothing saved"),
        }
    }

    let tools = ToolTable::resolve(&config.tool_paths);

    if args.list_tools {
        print!("{}", tools.report());
        return Ok(());
    }

    if args.files.is_empty() {
        if !args.save_config {
            print_usage_tips();
        }
        return Ok(());
    }

    let optimizer = MediaOptimizer::new(config, tools);
    let report = optimizer.run(&args.files).await;

    info!("Optimizations completed.");
    info!("{}", report.stats.format_summary());
    for failure in report.failures() {
        if let Err(ref e) = failure.result {
            warn!("Not optimized: {}: {}", failure.path.display(), e);
        }
    }

    Ok(())
}

fn print_usage_tips() {
    println!("No files given. If you'd like to optimize all files in the current directory, use a wildcard.\n");
    if cfg!(windows) {
        println!(
            "In Powershell, use (get-item *) to pass multiple files at once with a wildcard. \
             (CMD does not support wildcard expansion.)\nExample: lossless-optimizer (get-item *.jpg)"
        );
        println!("You may also drag-and-drop multiple files onto the program at once.");
    } else {
        println!("In Bash, use the * character.");
    }
    println!("\n\tTip: Select all files with the same extension using *.png\n");
    println!("Use `-h` or `--help` to view the help.\n");
}
