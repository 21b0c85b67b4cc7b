//! Image attachment ingestion.
//!
//! Reads a file asynchronously and encodes it as a `data:` URI so the view
//! can show it without touching the filesystem again. The file picker only
//! offers image files, but nothing here re-checks that: anything readable
//! becomes a best-effort data URI.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::clock::Clock;
use super::message::ChatMessage;
use crate::util::blocking;
use crate::{elog_debug, Result};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Read `path` and build an image message stamped at completion time.
pub async fn ingest_file(path: &Path, clock: &dyn Clock, timestamp_format: &str) -> Result<ChatMessage> {
    elog_debug!("ingest_file path={}", path.display());
    let file = tokio::fs::File::open(path).await?;
    ingest_reader(file, media_type_for_path(path), clock, timestamp_format).await
}

/// Drain `reader` and build an image message stamped at completion time.
///
/// `media_type_hint` usually comes from the file extension; without it the
/// type is sniffed from the leading bytes.
pub async fn ingest_reader<R>(
    mut reader: R,
    media_type_hint: Option<&str>,
    clock: &dyn Clock,
    timestamp_format: &str,
) -> Result<ChatMessage>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;

    let media_type = media_type_hint
        .or_else(|| media_type_from_header(&bytes))
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string();
    let len = bytes.len();

    let data_uri = blocking(move || Ok(encode_data_uri(&media_type, &bytes))).await?;
    elog_debug!("ingest complete bytes={}", len);

    Ok(ChatMessage::image(data_uri, clock.timestamp(timestamp_format)))
}

pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// Image media type implied by a file extension (case-insensitive).
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        "avif" => Some("image/avif"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// The file picker's `image/*` filter.
pub fn is_image_path(path: &Path) -> bool {
    media_type_for_path(path).is_some()
}

fn media_type_from_header(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") && bytes.len() >= 14 {
        return Some("image/bmp");
    }
    None
}

/// A parsed `data:<media-type>;base64,<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub media_type: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let media_type = header.strip_suffix(";base64")?;
        Some(Self {
            media_type,
            payload,
        })
    }

    /// Byte length of the decoded payload, computed without decoding.
    pub fn decoded_len(&self) -> usize {
        let len = self.payload.len();
        let padding = self.payload.bytes().rev().take_while(|&b| b == b'=').count();
        ((len / 4) * 3).saturating_sub(padding.min(2))
    }

    pub fn decode(&self) -> Option<Vec<u8>> {
        STANDARD.decode(self.payload).ok()
    }
}
