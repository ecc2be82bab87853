use std::fmt;

use serde::{Deserialize, Serialize};

/// Document types the model endpoint accepts as inline data.
/// Anything outside this list is rejected before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "text/plain")]
    PlainText,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Pdf,
        MediaType::PlainText,
        MediaType::Png,
        MediaType::Jpeg,
    ];

    /// Parses a declared content type. Case-insensitive; MIME parameters
    /// (`; charset=utf-8`) are ignored.
    pub fn parse(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        Self::ALL.into_iter().find(|t| t.as_str() == essence)
    }

    /// Resolves the media type of an upload. The declared content type wins;
    /// when it is missing or generic the file name extension is consulted.
    pub fn resolve(declared: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        match declared.map(str::trim) {
            Some(ct) if !ct.is_empty() && !is_generic(ct) => Self::parse(ct),
            _ => file_name
                .and_then(|name| mime_guess::from_path(name).first_raw())
                .and_then(Self::parse),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::PlainText => "text/plain",
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_generic(content_type: &str) -> bool {
    content_type
        .to_ascii_lowercase()
        .starts_with("application/octet-stream")
}

/// A resume ready for encoding: base64 payload plus its media type.
/// Lives only for the duration of one analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub payload: String,
    pub media_type: MediaType,
    pub byte_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_list() {
        assert_eq!(MediaType::parse("application/pdf"), Some(MediaType::Pdf));
        assert_eq!(MediaType::parse("text/plain"), Some(MediaType::PlainText));
        assert_eq!(MediaType::parse("image/png"), Some(MediaType::Png));
        assert_eq!(MediaType::parse("image/jpeg"), Some(MediaType::Jpeg));
    }

    #[test]
    fn test_parse_ignores_case_and_params() {
        assert_eq!(
            MediaType::parse("Text/Plain; charset=utf-8"),
            Some(MediaType::PlainText)
        );
        assert_eq!(MediaType::parse(" IMAGE/JPEG "), Some(MediaType::Jpeg));
    }

    #[test]
    fn test_parse_rejects_unsupported() {
        for ct in ["application/zip", "image/gif", "application/msword", "", "pdf"] {
            assert_eq!(MediaType::parse(ct), None, "{ct} should be rejected");
        }
    }

    #[test]
    fn test_resolve_prefers_declared_type() {
        assert_eq!(
            MediaType::resolve(Some("application/zip"), Some("resume.pdf")),
            None
        );
        assert_eq!(
            MediaType::resolve(Some("image/png"), Some("resume.pdf")),
            Some(MediaType::Png)
        );
    }

    #[test]
    fn test_resolve_falls_back_to_extension() {
        assert_eq!(
            MediaType::resolve(None, Some("resume.pdf")),
            Some(MediaType::Pdf)
        );
        assert_eq!(
            MediaType::resolve(Some("application/octet-stream"), Some("scan.JPG")),
            Some(MediaType::Jpeg)
        );
        assert_eq!(
            MediaType::resolve(Some(""), Some("notes.txt")),
            Some(MediaType::PlainText)
        );
        assert_eq!(MediaType::resolve(None, Some("archive.zip")), None);
        assert_eq!(MediaType::resolve(None, None), None);
    }

    #[test]
    fn test_serde_uses_mime_strings() {
        let json = serde_json::to_string(&MediaType::Jpeg).unwrap();
        assert_eq!(json, "\"image/jpeg\"");
    }
}
