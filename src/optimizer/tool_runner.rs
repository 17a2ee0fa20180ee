//! # Tool Runner
//!
//! Costruisce ed esegue le command line dei tool esterni.
//!
//! ## Responsabilità:
//! - Una funzione pura per ogni command line, così i flag fissi sono testabili
//! - Esecuzione del processo con `tokio::process::Command`, senza timeout
//! - Output del tool catturato e loggato a livello debug
//! - Traduzione di "tool assente" e "exit code != 0" in `OptimizeError`

use crate::args;
use crate::error::OptimizeError;
use crate::progress::tool_spinner;
use crate::tool_resolver::{Tool, ToolTable};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

/// Lines of stderr kept in a `ToolFailed` error.
const STDERR_TAIL_LINES: usize = 3;

/// One external command line, not yet bound to an executable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: Tool,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Pack `file` into a solid LZMA2 7z archive at maximum compression.
    pub fn seven_zip_archive(archive: &Path, file: &Path) -> Self {
        Self {
            tool: Tool::SevenZip,
            args: args!["a", "-t7z", "-m0=lzma2", "-mx=9", "-myx=9", "-mqs=on", "-ms=on", archive, file],
        }
    }

    /// Encode `input` (FLAC or WAV) at the highest level, verifying the result.
    pub fn flac_encode(input: &Path, output: &Path) -> Self {
        Self {
            tool: Tool::Flac,
            args: args![input, "-f", "-V", "--compression-level-8", "-o", output],
        }
    }

    /// Optimize a JPEG in place, optionally dropping all metadata.
    pub fn jpegoptim(file: &Path, strip_metadata: bool) -> Self {
        let args = if strip_metadata {
            args!["--strip-all", file]
        } else {
            args![file]
        };
        Self {
            tool: Tool::Jpegoptim,
            args,
        }
    }

    pub fn optipng(file: &Path) -> Self {
        Self {
            tool: Tool::Optipng,
            args: args!["-o7", "-fix", file],
        }
    }

    pub fn advpng(file: &Path) -> Self {
        Self {
            tool: Tool::Advpng,
            args: args!["-z4", file],
        }
    }

    /// Encode `input` to WebP with maximum effort.
    pub fn cwebp(input: &Path, output: &Path) -> Self {
        Self {
            tool: Tool::Cwebp,
            args: args!["-z", "9", input, "-o", output],
        }
    }

    pub fn advzip(file: &Path) -> Self {
        Self {
            tool: Tool::Advzip,
            args: args!["-z4", file],
        }
    }
}

/// Run `invocation` with the resolved path of its tool and wait for it.
pub async fn run(tools: &ToolTable, invocation: &Invocation) -> Result<(), OptimizeError> {
    let tool = invocation.tool;
    let program = tools.path(tool)?;

    debug!("Running {}: {:?} {:?}", tool, program, invocation.args);

    let spinner = tool_spinner(&format!("Running {}...", tool));
    let start_time = Instant::now();
    let result = Command::new(program).args(&invocation.args).output().await;
    spinner.finish_and_clear();
    let elapsed = start_time.elapsed();

    let output = match result {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(OptimizeError::MissingDependency(tool));
        }
        Err(e) => return Err(e.into()),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()).filter(|l| !l.trim().is_empty()) {
        debug!("[{}] {}", tool, line);
    }

    if output.status.success() {
        debug!("{} completed successfully in {:?}", tool, elapsed);
        Ok(())
    } else {
        debug!("{} failed after {:?}", tool, elapsed);
        Err(OptimizeError::ToolFailed {
            tool,
            status: output.status,
            stderr: stderr_tail(&stderr),
        })
    }
}

/// Last few non-empty lines of a tool's stderr, joined on one line.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::strings;
    use std::path::PathBuf;

    #[test]
    fn test_command_lines_are_fixed() {
        let file = Path::new("in.dat");
        let out = Path::new("out.dat");

        assert_eq!(
            strings(&Invocation::seven_zip_archive(out, file).args),
            ["a", "-t7z", "-m0=lzma2", "-mx=9", "-myx=9", "-mqs=on", "-ms=on", "out.dat", "in.dat"]
        );
        assert_eq!(
            strings(&Invocation::flac_encode(file, out).args),
            ["in.dat", "-f", "-V", "--compression-level-8", "-o", "out.dat"]
        );
        assert_eq!(strings(&Invocation::jpegoptim(file, false).args), ["in.dat"]);
        assert_eq!(
            strings(&Invocation::jpegoptim(file, true).args),
            ["--strip-all", "in.dat"]
        );
        assert_eq!(strings(&Invocation::optipng(file).args), ["-o7", "-fix", "in.dat"]);
        assert_eq!(strings(&Invocation::advpng(file).args), ["-z4", "in.dat"]);
        assert_eq!(
            strings(&Invocation::cwebp(file, out).args),
            ["-z", "9", "in.dat", "-o", "out.dat"]
        );
        assert_eq!(strings(&Invocation::advzip(file).args), ["-z4", "in.dat"]);
    }

    #[test]
    fn test_stderr_tail() {
        assert_eq!(stderr_tail(""), "");
        assert_eq!(stderr_tail("one\n\ntwo\nthree\nfour\n"), "two | three | four");
    }

    #[tokio::test]
    async fn test_unresolved_tool_is_missing_dependency() {
        let tools = ToolTable::default();
        let err = run(&tools, &Invocation::advzip(Path::new("a.zip"))).await.unwrap_err();
        assert!(matches!(err, OptimizeError::MissingDependency(Tool::Advzip)));
    }

    #[tokio::test]
    async fn test_spawn_not_found_is_missing_dependency() {
        let tools = ToolTable::from_paths([(Tool::Optipng, PathBuf::from("/nonexistent/bin/optipng"))]);
        let err = run(&tools, &Invocation::optipng(Path::new("a.png"))).await.unwrap_err();
        assert!(matches!(err, OptimizeError::MissingDependency(Tool::Optipng)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_and_stderr() {
        use crate::test_support::FakeTools;

        let fakes = FakeTools::new();
        fakes.install(Tool::Advpng, "echo 'advpng: bad chunk' >&2\nexit 3");
        fakes.install(Tool::Advzip, "exit 0");
        let tools = fakes.table();

        let err = run(&tools, &Invocation::advpng(Path::new("a.png"))).await.unwrap_err();
        match err {
            OptimizeError::ToolFailed { tool, status, stderr } => {
                assert_eq!(tool, Tool::Advpng);
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "advpng: bad chunk");
            }
            other => panic!("unexpected error: {other}"),
        }

        run(&tools, &Invocation::advzip(Path::new("a.zip"))).await.unwrap();
        assert_eq!(fakes.calls(), vec!["advpng -z4 a.png", "advzip -z4 a.zip"]);
    }
}
