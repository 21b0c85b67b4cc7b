//! Decoded image previews for inline display.
//!
//! A preview is built once per image message, off the logic thread, and
//! shared by `Arc` with every snapshot after that. It keeps two copies:
//! a capped-size image for terminals with a graphics protocol and a tiny
//! thumbnail sized in cells for half-block rendering.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use super::ingest::DataUri;
use super::message::ChatMessage;
use crate::util::blocking;

/// Longest edge kept for graphics-protocol rendering.
const MAX_PROTOCOL_EDGE: u32 = 1024;

static PREVIEW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct ImagePreview {
    /// Unique per decoded image; keys render-side protocol state.
    pub id: u64,
    pub image: Arc<DynamicImage>,
    /// One pixel per cell column and two pixel rows per cell row.
    pub thumbnail: Arc<RgbaImage>,
}

impl ImagePreview {
    /// Decode the payload of a `data:` URI. `None` when it is not a
    /// decodable image, which leaves the message on its metadata tile.
    pub fn from_data_uri(data_uri: &str, max_cells: u16) -> Option<Self> {
        let bytes = DataUri::parse(data_uri)?.decode()?;
        Self::from_bytes(&bytes, max_cells)
    }

    pub fn from_bytes(bytes: &[u8], max_cells: u16) -> Option<Self> {
        let decoded = image::load_from_memory(bytes).ok()?;
        let max_cells = u32::from(max_cells.max(1));

        let thumbnail = if decoded.width() > max_cells || decoded.height() > max_cells {
            decoded.thumbnail(max_cells, max_cells).to_rgba8()
        } else {
            decoded.to_rgba8()
        };
        let image = if decoded.width() > MAX_PROTOCOL_EDGE || decoded.height() > MAX_PROTOCOL_EDGE {
            decoded.resize(MAX_PROTOCOL_EDGE, MAX_PROTOCOL_EDGE, FilterType::Triangle)
        } else {
            decoded
        };

        Some(Self {
            id: PREVIEW_ID.fetch_add(1, Ordering::Relaxed),
            image: Arc::new(image),
            thumbnail: Arc::new(thumbnail),
        })
    }

    /// Footprint in terminal cells: (columns, rows).
    pub fn cell_size(&self) -> (u16, u16) {
        let (w, h) = self.thumbnail.dimensions();
        (w as u16, h.div_ceil(2) as u16)
    }
}

/// Decode the preview of an image message on the blocking pool.
pub async fn decode_preview(message: &ChatMessage, max_cells: u16) -> Option<ImagePreview> {
    let ChatMessage::Image { data_uri, .. } = message else {
        return None;
    };
    let data_uri = data_uri.clone();
    blocking(move || Ok(ImagePreview::from_data_uri(&data_uri, max_cells)))
        .await
        .ok()
        .flatten()
}

impl fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePreview")
            .field("id", &self.id)
            .field("image", &(self.image.width(), self.image.height()))
            .field("thumbnail", &self.thumbnail.dimensions())
            .finish()
    }
}

impl PartialEq for ImagePreview {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ImagePreview {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chat::ingest::encode_data_uri;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    /// PNG bytes of a `w`x`h` image filled with `color`.
    pub(crate) fn png_bytes(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_small_image_keeps_its_size() {
        let uri = encode_data_uri("image/png", &png_bytes(4, 6, [255, 0, 0, 255]));
        let preview = ImagePreview::from_data_uri(&uri, 32).unwrap();
        assert_eq!(preview.thumbnail.dimensions(), (4, 6));
        assert_eq!(preview.cell_size(), (4, 3));
        assert_eq!(preview.thumbnail.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_large_image_is_bounded_by_cells() {
        let preview = ImagePreview::from_bytes(&png_bytes(200, 100, [0, 0, 255, 255]), 20).unwrap();
        let (cols, rows) = preview.cell_size();
        assert_eq!(cols, 20);
        assert_eq!(rows, 5);
        assert_eq!(preview.image.width(), 200, "protocol copy keeps detail");
    }

    #[test]
    fn test_non_image_bytes_have_no_preview() {
        let uri = encode_data_uri("application/octet-stream", b"not an image");
        assert!(ImagePreview::from_data_uri(&uri, 32).is_none());
        assert!(ImagePreview::from_data_uri("data:image/png;base64,=", 32).is_none());
    }

    #[tokio::test]
    async fn test_decode_preview_only_for_images() {
        let uri = encode_data_uri("image/png", &png_bytes(2, 2, [9, 9, 9, 255]));
        assert!(decode_preview(&ChatMessage::image(uri, "t"), 8).await.is_some());
        assert!(decode_preview(&ChatMessage::text("hi", "t"), 8).await.is_none());
    }

    #[test]
    fn test_each_decode_gets_a_fresh_id() {
        let bytes = png_bytes(2, 2, [0, 0, 0, 255]);
        let a = ImagePreview::from_bytes(&bytes, 8).unwrap();
        let b = ImagePreview::from_bytes(&bytes, 8).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }
}
