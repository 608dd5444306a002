//! In-memory sink that records drawing calls instead of rendering them.

use super::metrics::wrap_text;
use super::{Align, DocumentResult, DocumentSink, FontStyle, Rgb};

/// A single recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    FillColor(Rgb),
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    TextColor(Rgb),
    DrawColor(Rgb),
    Font(FontStyle),
    FontSize(f64),
    Text { x: f64, y: f64, text: String, align: Align },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    AddPage,
    Save(String),
}

/// Records every call; wraps text with the same Helvetica metrics as the PDF
/// writer so layouts match.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    pub ops: Vec<SinkOp>,
    font: FontStyle,
    font_size: f64,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            font: FontStyle::Normal,
            font_size: 16.0,
        }
    }

    /// Text drawn, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// File names passed to `save`.
    pub fn saved(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Save(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn page_count(&self) -> usize {
        1 + self.ops.iter().filter(|op| matches!(op, SinkOp::AddPage)).count()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

impl DocumentSink for RecordingSink {
    fn set_fill_color(&mut self, color: Rgb) {
        self.ops.push(SinkOp::FillColor(color));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(SinkOp::FillRect { x, y, width, height });
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.ops.push(SinkOp::TextColor(color));
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.ops.push(SinkOp::DrawColor(color));
    }

    fn set_font(&mut self, style: FontStyle) {
        self.font = style;
        self.ops.push(SinkOp::Font(style));
    }

    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
        self.ops.push(SinkOp::FontSize(size));
    }

    fn text(&mut self, x: f64, y: f64, text: &str, align: Align) {
        self.ops.push(SinkOp::Text {
            x,
            y,
            text: text.to_string(),
            align,
        });
    }

    fn split_text_to_size(&self, text: &str, max_width: f64) -> Vec<String> {
        wrap_text(text, self.font, self.font_size, max_width)
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(SinkOp::Line { x1, y1, x2, y2 });
    }

    fn add_page(&mut self) {
        self.ops.push(SinkOp::AddPage);
    }

    fn save(&mut self, file_name: &str) -> DocumentResult<()> {
        self.ops.push(SinkOp::Save(file_name.to_string()));
        Ok(())
    }
}
