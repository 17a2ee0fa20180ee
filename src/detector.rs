//! # Type Detection Module
//!
//! Maps a path to a MIME type string. Directories and empty files are
//! recognized from metadata alone, everything else goes through a fallback
//! chain:
//!
//! 1. **Native** content sniffing on the first bytes of the file
//!    (or the `file` command when [`DetectionMethod::FileCommand`] is chosen)
//! 2. Guessing from the file extension, only when step 1 had no answer at all
//! 3. `application/octet-stream`
//!
//! Sniffing always answers once the header is readable: unrecognized content
//! is `text/plain` or `application/octet-stream`, never a guess from the name.
//!
//! ZIP containers whose first entry is a stored `mimetype` file (OpenDocument,
//! EPUB) report the type declared by that entry.

use crate::config::DetectionMethod;
use crate::error::OptimizeError;
use crate::media_type::{MIME_DIRECTORY, MIME_EMPTY, MIME_UNKNOWN};
use image::ImageFormat;
use std::ffi::OsString;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// Bytes read from the start of a file for sniffing.
const HEADER_LEN: u64 = 512;

/// Byte patterns that must all match for a signature to apply.
struct Signature {
    parts: &'static [(usize, &'static [u8])],
    mime: &'static str,
}

impl Signature {
    fn matches(&self, data: &[u8]) -> bool {
        self.parts.iter().all(|(offset, bytes)| {
            data.get(*offset..offset + bytes.len())
                .is_some_and(|window| window == *bytes)
        })
    }
}

const SIGNATURES: &[Signature] = &[
    Signature { parts: &[(0, b"7z\xBC\xAF\x27\x1C")], mime: "application/x-7z-compressed" },
    Signature { parts: &[(0, b"\x1F\x8B")], mime: "application/gzip" },
    Signature { parts: &[(0, b"fLaC")], mime: "audio/flac" },
    Signature { parts: &[(0, b"RIFF"), (8, b"WAVE")], mime: "audio/x-wav" },
    Signature { parts: &[(0, b"RIFF"), (8, b"WEBP")], mime: "image/webp" },
    Signature { parts: &[(0, b"PK\x05\x06")], mime: "application/zip" },
];

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";

const MIME_TEXT: &str = "text/plain";

/// Command name of the OS type-detection utility.
const FILE_COMMAND: &str = "file";

/// Detects the MIME type of files.
#[derive(Debug, Clone)]
pub struct Detector {
    method: DetectionMethod,
    file_command: OsString,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(DetectionMethod::default())
    }
}

impl Detector {
    pub fn new(method: DetectionMethod) -> Self {
        Self {
            method,
            file_command: OsString::from(FILE_COMMAND),
        }
    }

    /// Use `program` instead of the `file` found on `PATH`.
    pub fn with_file_command(mut self, program: impl Into<OsString>) -> Self {
        self.file_command = program.into();
        self
    }

    /// Detect the MIME type of `path`.
    ///
    /// An empty string is only returned when the `file` command itself
    /// answers with nothing; callers treat it as "no optimizer available".
    pub async fn detect(&self, path: &Path) -> Result<String, OptimizeError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| OptimizeError::Detection {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Sniffing a directory is an error, so it never gets that far.
        if metadata.is_dir() {
            return Ok(MIME_DIRECTORY.to_string());
        }
        if metadata.len() == 0 {
            return Ok(MIME_EMPTY.to_string());
        }

        let detected = match self.method {
            DetectionMethod::Native => match read_header(path).await {
                Ok(header) => Some(sniff(&header).unwrap_or_else(|| unrecognized_mime(&header).to_string())),
                Err(e) => {
                    debug!("Cannot read {}: {}", path.display(), e);
                    None
                }
            },
            DetectionMethod::FileCommand => file_command(&self.file_command, path).await,
            DetectionMethod::Extension => None,
        };

        if let Some(mime) = detected {
            return Ok(mime);
        }

        debug!("Falling back to extension-based guessing for {}", path.display());
        Ok(guess_from_extension(path).unwrap_or(MIME_UNKNOWN).to_string())
    }
}

async fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    file.take(HEADER_LEN).read_to_end(&mut header).await?;
    Ok(header)
}

/// Identify content from its first bytes.
pub fn sniff(header: &[u8]) -> Option<String> {
    // `guess_format` treats any RIFF container as WebP, so WebP is matched
    // against the signature table instead.
    match image::guess_format(header) {
        Ok(ImageFormat::Png) => return Some("image/png".to_string()),
        Ok(ImageFormat::Jpeg) => return Some("image/jpeg".to_string()),
        _ => {}
    }

    if header.starts_with(ZIP_LOCAL_HEADER) {
        return Some(zip_declared_mime(header).unwrap_or_else(|| "application/zip".to_string()));
    }

    SIGNATURES
        .iter()
        .find(|signature| signature.matches(header))
        .map(|signature| signature.mime.to_string())
}

/// Answer for content that matches no signature: text if it decodes as
/// UTF-8 without control characters, opaque bytes otherwise.
fn unrecognized_mime(header: &[u8]) -> &'static str {
    let text = match std::str::from_utf8(header) {
        Ok(text) => text,
        // A multi-byte character cut off by the header length is fine.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&header[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return MIME_UNKNOWN,
    };

    let printable = text
        .chars()
        .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t' | '\x0c'));
    if printable {
        MIME_TEXT
    } else {
        MIME_UNKNOWN
    }
}

/// MIME type declared by a leading, uncompressed `mimetype` entry.
fn zip_declared_mime(header: &[u8]) -> Option<String> {
    let le16 = |at: usize| Some(u16::from_le_bytes([*header.get(at)?, *header.get(at + 1)?]));
    let le32 = |at: usize| {
        let bytes = header.get(at..at + 4)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    };

    // Only a stored (method 0) entry has readable content here.
    if le16(8)? != 0 {
        return None;
    }
    let size = le32(18)? as usize;
    let name_len = usize::from(le16(26)?);
    let extra_len = usize::from(le16(28)?);

    if header.get(30..30 + name_len)? != b"mimetype" {
        return None;
    }

    let start = 30 + name_len + extra_len;
    let content = header.get(start..start + size)?;
    let mime = std::str::from_utf8(content).ok()?;
    let valid = !mime.is_empty() && mime.bytes().all(|b| b.is_ascii_graphic());
    valid.then(|| mime.to_string())
}

/// Ask the OS `file` utility.
async fn file_command(program: &OsString, path: &Path) -> Option<String> {
    let output = match Command::new(program).arg("-b").arg("--mime-type").arg(path).output().await {
        Ok(output) => output,
        Err(e) => {
            debug!("`file` command unavailable: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Guess a MIME type from the extension alone. Unreliable for misnamed files.
pub fn guess_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    match ImageFormat::from_extension(&ext) {
        Some(ImageFormat::Png) => return Some("image/png"),
        Some(ImageFormat::Jpeg) => return Some("image/jpeg"),
        Some(ImageFormat::WebP) => return Some("image/webp"),
        _ => {}
    }

    match ext.as_str() {
        "7z" => Some("application/x-7z-compressed"),
        "gz" | "tgz" => Some("application/gzip"),
        "flac" => Some("audio/flac"),
        "wav" => Some("audio/x-wav"),
        "odt" => Some("application/vnd.oasis.opendocument.text"),
        "zip" => Some("application/zip"),
        "epub" => Some("application/epub+zip"),
        _ => None,
    }
}
