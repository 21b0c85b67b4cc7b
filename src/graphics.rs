//! Inline image drawing for the render thread.
//!
//! Every preview is drawn as half-block rows (`▀` with separate fg and bg
//! colors), which scroll with the message list in any terminal. When the
//! terminal speaks a graphics protocol (Kitty, Sixel, iTerm2) a fully
//! visible image is also painted over those rows at full detail.

use std::collections::{HashMap, HashSet};

use image::imageops::FilterType;
use image::RgbaImage;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    Frame,
};
use ratatui_image::picker::{Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;
use ratatui_image::{Resize, StatefulImage};

use crate::chat::ImagePreview;
use crate::elog_debug;

/// Cell size assumed when the terminal cannot be queried.
const FALLBACK_FONT_SIZE: (u16, u16) = (8, 16);

/// Render-side image state. Protocols are built once per preview id and
/// kept until the message leaves the snapshot.
pub struct Graphics {
    picker: Option<Picker>,
    protocols: HashMap<u64, StatefulProtocol>,
}

impl Graphics {
    /// Query the terminal for a graphics protocol. Must run before the logic
    /// thread starts reading terminal events.
    pub fn detect() -> Self {
        let picker = Picker::from_query_stdio().unwrap_or_else(|e| {
            elog_debug!("Graphics query failed, using half-blocks: {:?}", e);
            Picker::from_fontsize(FALLBACK_FONT_SIZE)
        });
        elog_debug!("Graphics protocol={:?}", picker.protocol_type());
        match picker.protocol_type() {
            ProtocolType::Halfblocks => Self::text_only(),
            _ => Self {
                picker: Some(picker),
                protocols: HashMap::new(),
            },
        }
    }

    /// Half-block rows only.
    pub fn text_only() -> Self {
        Self {
            picker: None,
            protocols: HashMap::new(),
        }
    }

    pub fn has_protocol(&self) -> bool {
        self.picker.is_some()
    }

    /// Paint `preview` into `area` with the graphics protocol. Returns false
    /// when only half-blocks are available.
    pub fn render(&mut self, frame: &mut Frame, preview: &ImagePreview, area: Rect) -> bool {
        let Some(picker) = self.picker.as_ref() else {
            return false;
        };
        let protocol = self
            .protocols
            .entry(preview.id)
            .or_insert_with(|| picker.new_resize_protocol((*preview.image).clone()));
        frame.render_stateful_widget(StatefulImage::default().resize(Resize::Fit(None)), area, protocol);
        true
    }

    /// Drop protocol state for previews that are gone (cleared chat).
    pub fn retain(&mut self, live: &HashSet<u64>) {
        self.protocols.retain(|id, _| live.contains(id));
    }

    pub fn cached(&self) -> usize {
        self.protocols.len()
    }
}

/// Rows of `▀` cells: the fg color is the upper pixel, the bg the lower one.
/// The thumbnail is shrunk when it is wider than `max_width` cells.
pub fn halfblock_lines(thumbnail: &RgbaImage, max_width: usize) -> Vec<Line<'static>> {
    let max_width = max_width.max(1) as u32;
    let scaled;
    let img = if thumbnail.width() > max_width {
        let height = (thumbnail.height() * max_width / thumbnail.width()).max(1);
        scaled = image::imageops::resize(thumbnail, max_width, height, FilterType::Triangle);
        &scaled
    } else {
        thumbnail
    };

    let (w, h) = img.dimensions();
    (0..h)
        .step_by(2)
        .map(|y| {
            let spans: Vec<Span<'static>> = (0..w)
                .map(|x| {
                    let top = opaque(img.get_pixel(x, y).0);
                    let style = if y + 1 < h {
                        Style::default().fg(top).bg(opaque(img.get_pixel(x, y + 1).0))
                    } else {
                        Style::default().fg(top)
                    };
                    Span::styled("▀", style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Flatten alpha against black.
fn opaque([r, g, b, a]: [u8; 4]) -> Color {
    let blend = |c: u8| ((c as u16 * a as u16) / 255) as u8;
    Color::Rgb(blend(r), blend(g), blend(b))
}
