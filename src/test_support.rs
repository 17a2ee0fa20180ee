//! Shell-script stand-ins for the external tools, used by unit tests.

use crate::tool_resolver::{Tool, ToolTable};
use std::ffi::OsString;
use std::path::PathBuf;
use tempfile::TempDir;

/// Arguments as plain strings, for assertions.
pub fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string_lossy().into_owned()).collect()
}

/// A directory of fake tools that log every call to a shared file.
pub struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }

    /// Install `tool` as a script that logs its arguments, then runs `body`.
    #[cfg(unix)]
    pub fn install(&self, tool: Tool, body: &str) {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join(tool.command_name());
        let script = format!(
            "#!/bin/sh\necho \"{} $*\" >> '{}'\n{}\n",
            tool.command_name(),
            self.log_path().display(),
            body
        );
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(script.as_bytes()).unwrap();
        file.sync_all().unwrap();
        drop(file);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Table pointing at every installed fake; other tools stay unresolved.
    pub fn table(&self) -> ToolTable {
        ToolTable::from_paths(Tool::ALL.into_iter().filter_map(|tool| {
            let path = self.dir.path().join(tool.command_name());
            path.is_file().then_some((tool, path))
        }))
    }

    /// Logged calls, one `"<tool> <args>"` line each.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
