//! Anamnese document generation.
//!
//! The composer draws onto a [`DocumentSink`]; [`PdfSink`] turns those calls
//! into a PDF file and hands the bytes to a [`PayloadTarget`].

mod composer;
mod metrics;
mod pdf;
mod recording;

pub use composer::*;
pub use metrics::{text_width, wrap_text};
pub use pdf::*;
pub use recording::*;

use thiserror::Error;

/// Document errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload target error: {0}")]
    Target(String),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// RGB colour, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// Horizontal anchoring of a text call's x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
}

/// Drawing surface for the composer.
///
/// Coordinates are millimetres from the top-left corner of an A4 page; text
/// `y` is the baseline. Font sizes are in points.
pub trait DocumentSink {
    fn set_fill_color(&mut self, color: Rgb);

    /// Filled rectangle in the current fill colour.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_text_color(&mut self, color: Rgb);

    /// Stroke colour used by [`DocumentSink::line`].
    fn set_draw_color(&mut self, color: Rgb);

    fn set_font(&mut self, style: FontStyle);

    fn set_font_size(&mut self, size: f64);

    fn text(&mut self, x: f64, y: f64, text: &str, align: Align);

    /// Word-wrap `text` to `max_width` millimetres using the current font.
    fn split_text_to_size(&self, text: &str, max_width: f64) -> Vec<String>;

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Start a new page; subsequent drawing lands on it.
    fn add_page(&mut self);

    /// Persist the finished document under `file_name`.
    fn save(&mut self, file_name: &str) -> DocumentResult<()>;
}
