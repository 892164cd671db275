use std::io;
use std::path::Path;

use thiserror::Error;

use crate::fs::entry::RemoteEntry;

/// Extensions rendered as plain text even when a more specific type could be
/// guessed, so they land in an editor instead of a browser or archive tool.
pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "log", "md", "csv", "ini", "cfg", "conf", "properties", "srt",
];

pub const CODE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "h", "hpp", "cs", "java", "kt", "py", "rb", "rs", "go", "js", "ts", "sh",
    "pl", "lua", "sql", "toml", "yml", "yaml", "json", "xml", "gradle",
];

pub fn forces_plain_text(extension: &str) -> bool {
    let extension = extension.to_ascii_lowercase();
    PLAIN_TEXT_EXTENSIONS.contains(&extension.as_str())
        || CODE_EXTENSIONS.contains(&extension.as_str())
}

/// Best-effort content type from a file extension alone.
pub fn infer_mime(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    Some(match extension.as_str() {
        "pdf" => "application/pdf",
        "epub" => "application/epub+zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",
        "html" | "htm" => "text/html",
        _ => return None,
    })
}

/// The categories offered when no content type can be inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Text,
    Image,
    Audio,
    Video,
    Any,
}

impl MimeCategory {
    pub const ALL: [MimeCategory; 5] = [
        MimeCategory::Text,
        MimeCategory::Image,
        MimeCategory::Audio,
        MimeCategory::Video,
        MimeCategory::Any,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MimeCategory::Text => "Text",
            MimeCategory::Image => "Image",
            MimeCategory::Audio => "Audio",
            MimeCategory::Video => "Video",
            MimeCategory::Any => "Other",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            MimeCategory::Text => "text/*",
            MimeCategory::Image => "image/*",
            MimeCategory::Audio => "audio/*",
            MimeCategory::Video => "video/*",
            MimeCategory::Any => "*/*",
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no application available for {mime}: {source}")]
    NoHandler {
        mime: String,
        #[source]
        source: io::Error,
    },
}

/// A resolved view request: the local file to show, the content type that
/// steered the flow, and, when the file came off the drive, the remote entry
/// it was fetched from so a viewer can offer to write changes back.
pub struct ViewRequest<'a> {
    pub file: &'a Path,
    pub mime: &'a str,
    pub remote_source: Option<&'a RemoteEntry>,
}

pub trait Launcher: Send + Sync {
    fn view(&self, request: ViewRequest<'_>) -> Result<(), ViewerError>;
}

/// Hands the file to the desktop's default opener.
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn view(&self, request: ViewRequest<'_>) -> Result<(), ViewerError> {
        open::that(request.file).map_err(|source| ViewerError::NoHandler {
            mime: request.mime.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_text_extensions_force_plain_text() {
        assert!(forces_plain_text("log"));
        assert!(forces_plain_text("rs"));
        assert!(forces_plain_text("JSON"));
        assert!(!forces_plain_text("png"));
        assert!(!forces_plain_text("bin"));
    }

    #[test]
    fn infers_common_types_and_gives_up_on_unknown() {
        assert_eq!(infer_mime("pdf"), Some("application/pdf"));
        assert_eq!(infer_mime("JPG"), Some("image/jpeg"));
        assert_eq!(infer_mime("bin"), None);
    }

    #[test]
    fn categories_map_to_wildcard_types() {
        assert_eq!(MimeCategory::Text.mime(), "text/*");
        assert_eq!(MimeCategory::Any.mime(), "*/*");
        assert_eq!(MimeCategory::ALL.len(), 5);
    }
}
