//! Closed set of media types the optimizer knows how to handle.

use std::fmt;

/// MIME type reported for directories.
pub const MIME_DIRECTORY: &str = "inode/directory";
/// MIME type reported for zero-length files.
pub const MIME_EMPTY: &str = "inode/x-empty";
/// MIME type reported when nothing matched.
pub const MIME_UNKNOWN: &str = "application/octet-stream";

/// A detected media type, mapped to exactly one optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    SevenZip,
    Gzip,
    Flac,
    Jpeg,
    OpenDocumentText,
    Png,
    Wav,
    Webp,
    Zip,
    Epub,
    Empty,
    Directory,
    /// Anything else, carrying the MIME string as detected (may be empty).
    Unsupported(String),
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "application/x-7z-compressed" => Self::SevenZip,
            "application/gzip" | "application/x-gzip" => Self::Gzip,
            "audio/flac" | "audio/x-flac" => Self::Flac,
            "image/jpeg" => Self::Jpeg,
            "application/vnd.oasis.opendocument.text" => Self::OpenDocumentText,
            "image/png" => Self::Png,
            "audio/x-wav" | "audio/wav" | "audio/vnd.wave" => Self::Wav,
            "image/webp" => Self::Webp,
            "application/zip" => Self::Zip,
            "application/epub+zip" => Self::Epub,
            MIME_EMPTY => Self::Empty,
            MIME_DIRECTORY => Self::Directory,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Short human name used in log lines.
    pub fn label(&self) -> &str {
        match self {
            Self::SevenZip => "7zip",
            Self::Gzip => "gzipped",
            Self::Flac => "FLAC",
            Self::Jpeg => "JPEG image",
            Self::OpenDocumentText => "OpenDocument Text",
            Self::Png => "PNG image",
            Self::Wav => "WAV",
            Self::Webp => "WebP image",
            Self::Zip => "Zip container",
            Self::Epub => "EPUB",
            Self::Empty => "empty",
            Self::Directory => "directory",
            Self::Unsupported(mime) => mime,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mime_types() {
        assert_eq!(MediaType::from_mime("application/x-7z-compressed"), MediaType::SevenZip);
        assert_eq!(MediaType::from_mime("application/x-gzip"), MediaType::Gzip);
        assert_eq!(MediaType::from_mime("application/gzip"), MediaType::Gzip);
        assert_eq!(MediaType::from_mime("audio/x-flac"), MediaType::Flac);
        assert_eq!(MediaType::from_mime("image/jpeg"), MediaType::Jpeg);
        assert_eq!(
            MediaType::from_mime("application/vnd.oasis.opendocument.text"),
            MediaType::OpenDocumentText
        );
        assert_eq!(MediaType::from_mime("image/png"), MediaType::Png);
        assert_eq!(MediaType::from_mime("audio/x-wav"), MediaType::Wav);
        assert_eq!(MediaType::from_mime("image/webp"), MediaType::Webp);
        assert_eq!(MediaType::from_mime("application/zip"), MediaType::Zip);
        assert_eq!(MediaType::from_mime("application/epub+zip"), MediaType::Epub);
        assert_eq!(MediaType::from_mime(MIME_EMPTY), MediaType::Empty);
        assert_eq!(MediaType::from_mime(MIME_DIRECTORY), MediaType::Directory);
    }

    #[test]
    fn test_unknown_types_are_explicit() {
        assert_eq!(
            MediaType::from_mime("application/pdf"),
            MediaType::Unsupported("application/pdf".to_string())
        );
        assert_eq!(MediaType::from_mime(""), MediaType::Unsupported(String::new()));
        // ODT templates are zip containers too, but not handled as documents
        assert!(matches!(
            MediaType::from_mime("application/vnd.oasis.opendocument.text-template"),
            MediaType::Unsupported(_)
        ));
    }
}
