//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei nomi dei file candidati e dei
//! file convertiti. Evita duplicazione tra i processori.
//!
//! Un candidato è sempre un fratello dell'originale con suffisso `.tmp`
//! (`song.flac` -> `song.flac.tmp`, `photo.png` -> `photo.webp.tmp`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix marking a tentative replacement.
pub const TEMP_EXTENSION: &str = "tmp";

/// Utility per calcolare i path in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Candidate name for `original` re-encoded as `ext`.
    pub fn candidate_path(original: &Path, ext: &str) -> PathBuf {
        original.with_extension(format!("{}.{}", ext, TEMP_EXTENSION))
    }

    /// Name a candidate takes once it wins: the same path without `.tmp`.
    ///
    /// Returns `None` for candidates that carry no temporary suffix.
    pub fn strip_temp_suffix(candidate: &Path) -> Option<PathBuf> {
        match candidate.extension() {
            Some(ext) if ext == TEMP_EXTENSION => Some(candidate.with_extension("")),
            _ => None,
        }
    }

    /// Final name of `original` converted to `ext` (`a.wav` -> `a.flac`).
    pub fn converted_path(original: &Path, ext: &str) -> PathBuf {
        original.with_extension(ext)
    }

    /// `path` with `.ext` appended, keeping every existing extension.
    pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }

    /// Intermediate and final names for a gzip to 7z conversion.
    ///
    /// `logs.tar.gz` decompresses to `logs.tar` and becomes `logs.tar.7z`.
    /// A file without extension decompresses next to itself as
    /// `<name>.ungz` and becomes `<name>.7z`.
    pub fn gzip_conversion_paths(original: &Path) -> (PathBuf, PathBuf) {
        if original.extension().is_some() {
            let decompressed = original.with_extension("");
            let archive = Self::append_extension(&decompressed, "7z");
            (decompressed, archive)
        } else {
            (
                Self::append_extension(original, "ungz"),
                Self::append_extension(original, "7z"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_path() {
        assert_eq!(
            PathResolver::candidate_path(Path::new("dir/song.flac"), "flac"),
            PathBuf::from("dir/song.flac.tmp")
        );
        assert_eq!(
            PathResolver::candidate_path(Path::new("photo.png"), "webp"),
            PathBuf::from("photo.webp.tmp")
        );
        assert_eq!(
            PathResolver::candidate_path(Path::new("noext"), "flac"),
            PathBuf::from("noext.flac.tmp")
        );
    }

    #[test]
    fn test_strip_temp_suffix() {
        assert_eq!(
            PathResolver::strip_temp_suffix(Path::new("a.webp.tmp")),
            Some(PathBuf::from("a.webp"))
        );
        assert_eq!(PathResolver::strip_temp_suffix(Path::new("logs.tar.7z")), None);
        assert_eq!(PathResolver::strip_temp_suffix(Path::new("plain")), None);
    }

    #[test]
    fn test_candidate_round_trip_lands_on_converted_name() {
        let original = Path::new("music/take 1.wav");
        let candidate = PathResolver::candidate_path(original, "flac");
        assert_eq!(
            PathResolver::strip_temp_suffix(&candidate),
            Some(PathResolver::converted_path(original, "flac"))
        );
    }

    #[test]
    fn test_gzip_conversion_paths() {
        assert_eq!(
            PathResolver::gzip_conversion_paths(Path::new("logs.tar.gz")),
            (PathBuf::from("logs.tar"), PathBuf::from("logs.tar.7z"))
        );
        assert_eq!(
            PathResolver::gzip_conversion_paths(Path::new("data.gz")),
            (PathBuf::from("data"), PathBuf::from("data.7z"))
        );
        assert_eq!(
            PathResolver::gzip_conversion_paths(Path::new("blob")),
            (PathBuf::from("blob.ungz"), PathBuf::from("blob.7z"))
        );
    }
}
