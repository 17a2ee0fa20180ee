//! # Media Optimizer Main Orchestrator
//!
//! Dispatcher principale: rileva il tipo di ogni path, sceglie il processore
//! giusto e raccoglie un `FileReport` per ogni path visitato.
//!
//! ## Responsabilità:
//! - Elaborazione strettamente sequenziale, un file alla volta
//! - Un errore su un file viene loggato e la run continua
//! - Ricorsione nelle directory solo con `recursive`, con un set di
//!   directory già visitate (path canonici) contro i cicli di symlink

use crate::{
    archive_processor::ArchiveProcessor,
    audio_processor::AudioProcessor,
    config::Config,
    detector::Detector,
    error::OptimizeError,
    file_manager::FileManager,
    image_processor::ImageProcessor,
    media_type::MediaType,
    optimizer::outcome::{FileReport, Outcome},
    progress::OptimizationStats,
    tool_resolver::ToolTable,
};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Everything that happened during one run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per visited path, directories after their contents.
    pub files: Vec<FileReport>,
    pub stats: OptimizationStats,
}

impl RunReport {
    fn push(&mut self, report: FileReport) {
        self.stats.record(&report);
        self.files.push(report);
    }

    /// Reports that ended in an error.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|report| report.is_error())
    }
}

/// Mutable state threaded through the recursive walk.
#[derive(Default)]
struct RunState {
    report: RunReport,
    visited: HashSet<PathBuf>,
}

/// Orchestratore principale
pub struct MediaOptimizer {
    config: Config,
    tools: ToolTable,
    detector: Detector,
}

impl MediaOptimizer {
    /// Crea nuova istanza dell'ottimizzatore
    pub fn new(config: Config, tools: ToolTable) -> Self {
        let mut detector = Detector::new(config.detection);
        if let Some(ref program) = config.file_command {
            detector = detector.with_file_command(program);
        }
        Self {
            config,
            tools,
            detector,
        }
    }

    /// Optimize every path in order. Never stops early on a per-file failure.
    pub async fn run(&self, paths: &[PathBuf]) -> RunReport {
        let mut state = RunState::default();

        for path in paths {
            self.visit(path.clone(), &mut state).await;
        }

        state.report
    }

    fn visit<'a>(&'a self, path: PathBuf, state: &'a mut RunState) -> BoxFuture<'a, ()> {
        async move {
            info!("Current file is \"{}\".", path.display());

            let mime = match self.detector.detect(&path).await {
                Ok(mime) => mime,
                Err(e) => {
                    error!("{}", e);
                    state.report.push(FileReport {
                        path,
                        media_type: None,
                        result: Err(e),
                    });
                    return;
                }
            };
            debug!("Detected {:?} for {}", mime, path.display());

            let media_type = MediaType::from_mime(&mime);
            let result = self.dispatch(&path, &media_type, state).await;
            log_result(&path, &result);

            state.report.push(FileReport {
                path,
                media_type: Some(media_type),
                result,
            });
        }
        .boxed()
    }

    async fn dispatch(
        &self,
        path: &Path,
        media_type: &MediaType,
        state: &mut RunState,
    ) -> Result<Outcome, OptimizeError> {
        let features = &self.config.features;
        let images = ImageProcessor::new(&self.tools, features);
        let audio = AudioProcessor::new(&self.tools, features);
        let archives = ArchiveProcessor::new(&self.tools, features);

        if !matches!(
            media_type,
            MediaType::Directory | MediaType::Empty | MediaType::Unsupported(_)
        ) {
            info!("Optimizing {} file.", media_type.label());
        }

        match media_type {
            MediaType::Directory => self.visit_directory(path, state).await,
            MediaType::Empty => {
                info!("File \"{}\" is empty. Nothing to do.", path.display());
                Ok(Outcome::NothingToDo)
            }
            MediaType::Unsupported(mime) if mime.is_empty() => {
                error!("This file has no MIME type. This shouldn't be possible.");
                Ok(Outcome::Unsupported("no MIME type".to_string()))
            }
            MediaType::Unsupported(mime) => {
                warn!("No optimizer available for file type '{}'", mime);
                Ok(Outcome::Unsupported(mime.clone()))
            }
            MediaType::SevenZip => archives.optimize_seven_zip(path).await,
            MediaType::Gzip => archives.optimize_gzip(path).await,
            MediaType::Zip | MediaType::Epub => archives.optimize_zip(path).await,
            MediaType::OpenDocumentText => archives.optimize_odt(path).await,
            MediaType::Flac => audio.optimize_flac(path).await,
            MediaType::Wav => audio.optimize_wav(path).await,
            MediaType::Jpeg => images.optimize_jpeg(path).await,
            MediaType::Png => images.optimize_png(path).await,
            MediaType::Webp => images.optimize_webp(path).await,
        }
    }

    async fn visit_directory(&self, dir: &Path, state: &mut RunState) -> Result<Outcome, OptimizeError> {
        info!("{} is a directory.", dir.display());

        if !self.config.recursive {
            info!(
                "Skipping {}. Use `-r` to recursively optimize files inside directories.",
                dir.display()
            );
            return Ok(Outcome::Skipped("recursion is not enabled".to_string()));
        }

        let canonical = tokio::fs::canonicalize(dir).await?;
        if !state.visited.insert(canonical.clone()) {
            warn!(
                "Skipping {}: {} was already visited (symbolic link cycle?)",
                dir.display(),
                canonical.display()
            );
            return Ok(Outcome::Skipped("directory already visited".to_string()));
        }

        info!("Optimizing contents of {}", dir.display());
        let children = FileManager::list_children(dir)?;
        let entries = children.len();

        for child in children {
            self.visit(child, state).await;
        }

        Ok(Outcome::Directory { entries })
    }
}

fn log_result(path: &Path, result: &Result<Outcome, OptimizeError>) {
    match result {
        Ok(outcome @ (Outcome::Replaced { .. } | Outcome::KeptOriginal { .. } | Outcome::Rewritten { .. })) => {
            info!("{}: {}", path.display(), outcome)
        }
        Ok(outcome) => debug!("{}: {}", path.display(), outcome),
        Err(e) if e.is_missing_dependency() => warn!("{}: {}", path.display(), e),
        Err(e) => error!("{}: {}", path.display(), e),
    }
}
