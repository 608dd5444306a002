//! Minimal PDF 1.4 writer for the anamnese.
//!
//! Uses the standard Helvetica fonts with WinAnsiEncoding, so no font data is
//! embedded. Characters outside Latin-1 are written as `?`.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::composer::{PAGE_HEIGHT, PAGE_WIDTH};
use super::metrics::{text_width, wrap_text, PT_TO_MM};
use super::{Align, DocumentError, DocumentResult, DocumentSink, FontStyle, Rgb};

/// Object number of the first page; pages and their content streams alternate
/// after the catalog, page tree, two fonts and info dictionary.
const FIRST_PAGE_OBJ: usize = 6;

/// jsPDF's default stroke width, in millimetres.
const LINE_WIDTH_MM: f64 = 0.2;

const PRODUCER: &str = "anamnese-core";

/// Where a finished PDF goes.
pub trait PayloadTarget {
    fn persist(&mut self, file_name: &str, bytes: &[u8]) -> DocumentResult<()>;
}

/// Writes documents into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryTarget {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl PayloadTarget for DirectoryTarget {
    fn persist(&mut self, file_name: &str, bytes: &[u8]) -> DocumentResult<()> {
        // Names come from user input; keep them inside the target directory.
        let safe: String = file_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        if safe.is_empty() || safe == "." || safe == ".." {
            return Err(DocumentError::Target(format!(
                "invalid file name: {:?}",
                file_name
            )));
        }

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(safe);
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "anamnese written");
        self.written.push(path);
        Ok(())
    }
}

/// A document kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Keeps documents in memory (native hosts, tests).
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    pub saved: Vec<SavedPayload>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&SavedPayload> {
        self.saved.last()
    }
}

impl PayloadTarget for MemoryTarget {
    fn persist(&mut self, file_name: &str, bytes: &[u8]) -> DocumentResult<()> {
        self.saved.push(SavedPayload {
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Summary of the last document a [`PdfSink`] saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedDocument {
    pub file_name: String,
    /// SHA-256 of the page content, hex encoded. Also the PDF `/ID`.
    pub digest: String,
    pub page_count: usize,
    pub size: usize,
}

/// [`DocumentSink`] that renders to PDF.
pub struct PdfSink<T: PayloadTarget> {
    target: T,
    pages: Vec<String>,
    fill_color: Rgb,
    text_color: Rgb,
    draw_color: Rgb,
    font: FontStyle,
    font_size: f64,
    emitted: Option<EmittedDocument>,
}

impl<T: PayloadTarget> PdfSink<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            pages: vec![String::new()],
            fill_color: Rgb::BLACK,
            text_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            font: FontStyle::Normal,
            font_size: 16.0,
            emitted: None,
        }
    }

    pub fn emitted(&self) -> Option<&EmittedDocument> {
        self.emitted.as_ref()
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&mut self) -> &mut String {
        if self.pages.is_empty() {
            self.pages.push(String::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Hex digest over every page's content stream.
    fn content_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for page in &self.pages {
            hasher.update(page.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Serialize the whole file.
    pub fn render(&self, title: &str) -> Vec<u8> {
        let digest = self.content_digest();
        let file_id = &digest[..32];

        let mut writer = ObjectWriter::new();

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", FIRST_PAGE_OBJ + 2 * i))
            .collect();

        writer.object("<< /Type /Catalog /Pages 2 0 R >>");
        writer.object(&format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.pages.len()
        ));
        writer.object(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        writer.object(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );
        writer.object(&format!(
            "<< /Title ({}) /Producer ({}) >>",
            escape_pdf_string(title),
            PRODUCER
        ));

        for (i, content) in self.pages.iter().enumerate() {
            let contents_obj = FIRST_PAGE_OBJ + 2 * i + 1;
            writer.object(&format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                num(PAGE_WIDTH / PT_TO_MM),
                num(PAGE_HEIGHT / PT_TO_MM),
                contents_obj
            ));
            writer.object(&format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ));
        }

        writer.finish(file_id)
    }
}

impl<T: PayloadTarget> DocumentSink for PdfSink<T> {
    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let op = format!(
            "q {} rg {} {} {} {} re f Q\n",
            rgb(self.fill_color),
            num(x / PT_TO_MM),
            num((PAGE_HEIGHT - y - height) / PT_TO_MM),
            num(width / PT_TO_MM),
            num(height / PT_TO_MM)
        );
        self.page().push_str(&op);
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn set_font(&mut self, style: FontStyle) {
        self.font = style;
    }

    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    fn text(&mut self, x: f64, y: f64, text: &str, align: Align) {
        let width = text_width(text, self.font, self.font_size);
        let left = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let font = match self.font {
            FontStyle::Normal => "F1",
            FontStyle::Bold => "F2",
        };
        let op = format!(
            "BT {} rg /{} {} Tf {} {} Td ({}) Tj ET\n",
            rgb(self.text_color),
            font,
            num(self.font_size),
            num(left / PT_TO_MM),
            num((PAGE_HEIGHT - y) / PT_TO_MM),
            escape_pdf_string(text)
        );
        self.page().push_str(&op);
    }

    fn split_text_to_size(&self, text: &str, max_width: f64) -> Vec<String> {
        wrap_text(text, self.font, self.font_size, max_width)
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let op = format!(
            "q {} RG {} w {} {} m {} {} l S Q\n",
            rgb(self.draw_color),
            num(LINE_WIDTH_MM / PT_TO_MM),
            num(x1 / PT_TO_MM),
            num((PAGE_HEIGHT - y1) / PT_TO_MM),
            num(x2 / PT_TO_MM),
            num((PAGE_HEIGHT - y2) / PT_TO_MM)
        );
        self.page().push_str(&op);
    }

    fn add_page(&mut self) {
        self.pages.push(String::new());
    }

    fn save(&mut self, file_name: &str) -> DocumentResult<()> {
        let title = file_name.strip_suffix(".pdf").unwrap_or(file_name);
        let bytes = self.render(title);
        self.target.persist(file_name, &bytes)?;

        self.emitted = Some(EmittedDocument {
            file_name: file_name.to_string(),
            digest: self.content_digest(),
            page_count: self.pages.len(),
            size: bytes.len(),
        });
        Ok(())
    }
}

/// Numbers objects and records their byte offsets for the xref table.
struct ObjectWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            out,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &str) {
        self.offsets.push(self.out.len());
        let number = self.offsets.len();
        self.out
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", number, body).as_bytes());
    }

    fn finish(mut self, file_id: &str) -> Vec<u8> {
        let xref_offset = self.out.len();
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", size);
        for offset in &self.offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R /ID [<{}> <{}>] >>\nstartxref\n{}\n%%EOF\n",
            size, file_id, file_id, xref_offset
        ));

        self.out.extend_from_slice(xref.as_bytes());
        self.out
    }
}

fn num(value: f64) -> String {
    format!("{:.2}", value)
}

fn rgb(color: Rgb) -> String {
    let Rgb(r, g, b) = color;
    format!(
        "{} {} {}",
        num(f64::from(r) / 255.0),
        num(f64::from(g) / 255.0),
        num(f64::from(b) / 255.0)
    )
}

/// Escape for a PDF literal string. Non-ASCII Latin-1 characters become octal
/// escapes of their WinAnsi byte.
fn escape_pdf_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            '\u{a0}'..='\u{ff}' => escaped.push_str(&format!("\\{:03o}", c as u32)),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_sample() -> (PdfSink<MemoryTarget>, Vec<u8>) {
        let mut sink = PdfSink::new(MemoryTarget::new());
        sink.set_font_size(12.0);
        sink.text(20.0, 30.0, "Olá (teste)", Align::Left);
        sink.save("Anamnese_YedaLash_Ana.pdf").unwrap();
        let bytes = sink.target().last().unwrap().bytes.clone();
        (sink, bytes)
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_pdf_string("ã"), "\\343");
        assert_eq!(escape_pdf_string("💕"), "?");
    }

    #[test]
    fn test_rendered_file_structure() {
        let (_, bytes) = render_sample();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("(Ol\\341 \\(teste\\)) Tj"));
        assert!(text.contains("/Title (Anamnese_YedaLash_Ana)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let (_, bytes) = render_sample();

        // The header comment holds binary bytes; search the raw buffer.
        let xref_start = bytes
            .windows(6)
            .position(|w| w == b"\nxref\n")
            .unwrap()
            + 1;
        let tail = String::from_utf8(bytes[xref_start..].to_vec()).unwrap();
        let entries: Vec<usize> = tail
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();

        assert_eq!(entries.len(), FIRST_PAGE_OBJ + 1);
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }

        let startxref: usize = tail
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_start);
    }

    #[test]
    fn test_emitted_summary() {
        let (sink, bytes) = render_sample();
        let emitted = sink.emitted().unwrap();

        assert_eq!(emitted.file_name, "Anamnese_YedaLash_Ana.pdf");
        assert_eq!(emitted.page_count, 1);
        assert_eq!(emitted.size, bytes.len());
        assert_eq!(emitted.digest.len(), 64);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains(&format!("/ID [<{}>", &emitted.digest[..32])));
    }

    #[test]
    fn test_pages_are_listed() {
        let mut sink = PdfSink::new(MemoryTarget::new());
        sink.text(20.0, 30.0, "um", Align::Left);
        sink.add_page();
        sink.text(20.0, 30.0, "dois", Align::Left);
        sink.save("doc.pdf").unwrap();

        let bytes = &sink.target().last().unwrap().bytes;
        let text = String::from_utf8_lossy(bytes);
        assert!(text.contains("/Kids [6 0 R 8 0 R] /Count 2"));
        assert_eq!(sink.page_count(), 2);
    }

    #[test]
    fn test_centered_text_is_shifted_left() {
        let mut sink = PdfSink::new(MemoryTarget::new());
        sink.set_font_size(10.0);
        sink.text(105.0, 50.0, "Centro", Align::Center);
        let width = text_width("Centro", FontStyle::Normal, 10.0);
        let expected_x = num((105.0 - width / 2.0) / PT_TO_MM);
        assert!(sink.pages[0].contains(&format!("Tf {} ", expected_x)));
    }

    #[test]
    fn test_directory_target_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("anamneses");
        let mut target = DirectoryTarget::new(&dir);
        target.persist("a/b.pdf", b"%PDF").unwrap();

        let written = target.written()[0].clone();
        assert_eq!(written, dir.join("a_b.pdf"));
        assert_eq!(std::fs::read(&written).unwrap(), b"%PDF");
    }

    #[test]
    fn test_directory_target_rejects_dot_names() {
        let tmp = tempfile::tempdir().unwrap();
        let mut target = DirectoryTarget::new(tmp.path());
        assert!(matches!(
            target.persist("..", b""),
            Err(DocumentError::Target(_))
        ));
        assert!(matches!(
            target.persist(".", b""),
            Err(DocumentError::Target(_))
        ));
        assert!(target.written().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
