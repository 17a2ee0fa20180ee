//! # Platform-specific utilities
//!
//! Questo modulo centralizza tutta la logica per trovare gli eseguibili
//! esterni sul sistema corrente. Su Linux/macOS basta cercare nel `PATH`;
//! su Windows si prova anche il registro ("App Paths") e le directory di
//! installazione di default.

use crate::tool_resolver::Tool;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const APP_PATHS_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\App Paths";

/// Locate `tool` using the lookup rules of the platform we are running on.
pub fn locate(tool: Tool) -> Option<PathBuf> {
    if cfg!(windows) {
        locate_windows(tool)
    } else {
        find_in_system_path(tool.command_name())
    }
}

/// Windows lookup: PATH first, then the registry, then default install dirs.
fn locate_windows(tool: Tool) -> Option<PathBuf> {
    if let Some(path) = find_in_system_path(tool.command_name()) {
        return Some(path);
    }

    if let Some(path) = query_app_path(tool) {
        debug!("Found {} through App Paths: {:?}", tool, path);
        if path.is_file() {
            return Some(path);
        }
    }

    windows_default_locations(tool, |name| env::var(name).ok())
        .into_iter()
        .find(|path| path.is_file())
}

/// Find a command in the directories listed by `PATH`.
pub fn find_in_system_path(command: &str) -> Option<PathBuf> {
    let file_name = executable_name(command);
    let paths = env::var_os("PATH")?;

    env::split_paths(&paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(&file_name))
        .find(|path| path.is_file())
}

/// Look for `tool` inside a directory of bundled tools.
pub fn find_in_dir(dir: &Path, tool: Tool) -> Option<PathBuf> {
    let file_name = executable_name(tool.command_name());
    [dir.join(&file_name), dir.join(tool.command_name()).join(&file_name)]
        .into_iter()
        .find(|path| path.is_file())
}

fn executable_name(command: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", command)
    } else {
        command.to_string()
    }
}

/// Registry key under "App Paths" that an installer registers for `tool`.
///
/// 7-Zip only registers its file manager, `7z.exe` sits next to it.
fn app_paths_entry(tool: Tool) -> &'static str {
    match tool {
        Tool::SevenZip => "7zFM.exe",
        Tool::Flac => "flac.exe",
        Tool::Jpegoptim => "jpegoptim.exe",
        Tool::Optipng => "optipng.exe",
        Tool::Advpng => "advpng.exe",
        Tool::Cwebp => "cwebp.exe",
        Tool::Advzip => "advzip.exe",
    }
}

fn query_app_path(tool: Tool) -> Option<PathBuf> {
    let entry = app_paths_entry(tool);
    let key = format!("{}\\{}", APP_PATHS_KEY, entry);
    let output = Command::new("reg")
        .args(["query", key.as_str(), "/ve"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let registered = parse_reg_default_value(&String::from_utf8_lossy(&output.stdout))?;
    let exe_name = format!("{}.exe", tool.command_name());
    Some(PathBuf::from(registered.replace(entry, &exe_name)))
}

/// Extract the `(Default)` string value from `reg query ... /ve` output.
pub fn parse_reg_default_value(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (_, value) = line.split_once("REG_SZ")?;
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Default install locations on Windows, in the order they are probed.
///
/// `env` resolves environment variables so the list can be built anywhere.
pub fn windows_default_locations<F>(tool: Tool, env: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let program_files = env("ProgramFiles");
    let local_app_data = env("LocalAppData");
    let program_files_x86 = env("ProgramFiles(x86)");

    let layout: [(&Option<String>, &str); 3] = match tool {
        Tool::SevenZip => [
            (&program_files, r"7-Zip\7z.exe"),
            (&local_app_data, r"7-Zip\7z.exe"),
            (&program_files_x86, r"7-Zip\7z.exe"),
        ],
        Tool::Flac => [
            (&program_files, r"flac\win64\flac.exe"),
            (&local_app_data, r"flac\win64\flac.exe"),
            (&program_files_x86, r"flac\win32\flac.exe"),
        ],
        Tool::Jpegoptim => [
            (&program_files, r"jpegoptim\jpegoptim.exe"),
            (&local_app_data, r"jpegoptim\jpegoptim.exe"),
            (&program_files_x86, r"jpegoptim\jpegoptim.exe"),
        ],
        Tool::Optipng => [
            (&program_files_x86, r"optipng\optipng.exe"),
            (&program_files, r"optipng\optipng.exe"),
            (&local_app_data, r"optipng\optipng.exe"),
        ],
        Tool::Advpng => [
            (&program_files, r"advancecomp\advpng.exe"),
            (&local_app_data, r"advancecomp\advpng.exe"),
            (&program_files_x86, r"advancecomp\advpng.exe"),
        ],
        Tool::Cwebp => [
            (&program_files, r"libwebp\bin\cwebp.exe"),
            (&local_app_data, r"libwebp\bin\cwebp.exe"),
            (&program_files_x86, r"libwebp\bin\cwebp.exe"),
        ],
        Tool::Advzip => [
            (&program_files, r"advancecomp\advzip.exe"),
            (&local_app_data, r"advancecomp\advzip.exe"),
            (&program_files_x86, r"advancecomp\advzip.exe"),
        ],
    };

    layout
        .into_iter()
        .filter_map(|(root, rest)| {
            // An unset or empty variable would turn into a relative path.
            let root = root.as_deref().filter(|root| !root.is_empty())?;
            Some(PathBuf::from(format!("{}\\{}", root, rest)))
        })
        .collect()
}

/// System information structure
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub family: &'static str,
}

impl SystemInfo {
    pub fn current() -> Self {
        Self {
            os: env::consts::OS,
            arch: env::consts::ARCH,
            family: env::consts::FAMILY,
        }
    }
}

impl std::fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.os, self.arch, self.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "ProgramFiles" => Some(r"C:\Program Files".to_string()),
            "LocalAppData" => Some(r"C:\Users\me\AppData\Local".to_string()),
            "ProgramFiles(x86)" => Some(r"C:\Program Files (x86)".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_windows_locations_order() {
        let locations = windows_default_locations(Tool::SevenZip, fake_env);
        assert_eq!(
            locations,
            vec![
                PathBuf::from(r"C:\Program Files\7-Zip\7z.exe"),
                PathBuf::from(r"C:\Users\me\AppData\Local\7-Zip\7z.exe"),
                PathBuf::from(r"C:\Program Files (x86)\7-Zip\7z.exe"),
            ]
        );

        // optipng historically installs into the 32-bit Program Files first
        let optipng = windows_default_locations(Tool::Optipng, fake_env);
        assert_eq!(optipng[0], PathBuf::from(r"C:\Program Files (x86)\optipng\optipng.exe"));
    }

    #[test]
    fn test_windows_locations_skip_unset_variables() {
        let locations = windows_default_locations(Tool::Cwebp, |name| {
            (name == "ProgramFiles").then(|| r"D:\Apps".to_string())
        });
        assert_eq!(locations, vec![PathBuf::from(r"D:\Apps\libwebp\bin\cwebp.exe")]);
    }

    #[test]
    fn test_parse_reg_default_value() {
        let output = "\r\nHKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\App Paths\\7zFM.exe\r\n    (Default)    REG_SZ    C:\\Program Files\\7-Zip\\7zFM.exe\r\n\r\n";
        assert_eq!(
            parse_reg_default_value(output).as_deref(),
            Some(r"C:\Program Files\7-Zip\7zFM.exe")
        );
        assert_eq!(parse_reg_default_value("ERROR: not found"), None);
        assert_eq!(parse_reg_default_value("    (Default)    REG_SZ    \r\n"), None);
    }

    #[test]
    fn test_find_in_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_in_dir(dir.path(), Tool::Advzip).is_none());

        let nested = dir.path().join("advzip");
        std::fs::create_dir(&nested).unwrap();
        let exe = nested.join(executable_name("advzip"));
        std::fs::write(&exe, b"").unwrap();
        assert_eq!(find_in_dir(dir.path(), Tool::Advzip), Some(exe));
    }

    #[test]
    fn test_system_info() {
        let info = SystemInfo::current();
        assert!(!info.os.is_empty());
        assert!(!info.arch.is_empty());
        assert!(!info.family.is_empty());
    }
}
