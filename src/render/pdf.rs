//! PDF 1.4 writer using the standard Type1 fonts.
//!
//! Text is encoded as Windows-1252 (`/WinAnsiEncoding`), so only the
//! standard Helvetica and Courier faces are needed and nothing is
//! embedded. Pages are buffered in memory and serialized in `finish`
//! with a fixed object order, which keeps the output byte-identical for
//! identical input.

use std::collections::BTreeSet;
use std::io::Write;

use encoding_rs::WINDOWS_1252;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::style::{Color, FontFamily, FontStyle, TextStyle};
use super::writer::{DocumentInfo, PaginatedWriter, WriterMark};
use crate::error::{Error, RenderFault, Result};
use crate::model::{Point, Rect};

/// Points per millimetre.
const K: f32 = 72.0 / 25.4;

const PDF_HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const INFO_ID: usize = 3;
const FIRST_FREE_ID: usize = 4;

/// A standard font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PdfFont {
    family: FontFamily,
    style: FontStyle,
}

impl PdfFont {
    fn of(style: &TextStyle) -> Self {
        Self {
            family: style.family,
            style: style.style,
        }
    }

    fn base_name(&self) -> &'static str {
        match (self.family, self.style) {
            (FontFamily::Helvetica, FontStyle::Regular) => "Helvetica",
            (FontFamily::Helvetica, FontStyle::Bold) => "Helvetica-Bold",
            (FontFamily::Helvetica, FontStyle::Italic) => "Helvetica-Oblique",
            (FontFamily::Courier, FontStyle::Regular) => "Courier",
            (FontFamily::Courier, FontStyle::Bold) => "Courier-Bold",
            (FontFamily::Courier, FontStyle::Italic) => "Courier-Oblique",
        }
    }

    /// Resource key, fixed per face.
    fn key(&self) -> &'static str {
        match (self.family, self.style) {
            (FontFamily::Helvetica, FontStyle::Regular) => "F1",
            (FontFamily::Helvetica, FontStyle::Bold) => "F2",
            (FontFamily::Helvetica, FontStyle::Italic) => "F3",
            (FontFamily::Courier, FontStyle::Regular) => "F4",
            (FontFamily::Courier, FontStyle::Bold) => "F5",
            (FontFamily::Courier, FontStyle::Italic) => "F6",
        }
    }
}

#[derive(Debug, Default)]
struct PdfPage {
    width: f32,
    height: f32,
    content: String,
    links: Vec<(Rect, String)>,
}

/// Paginated writer producing a PDF document.
#[derive(Debug)]
pub struct PdfWriter {
    compress: bool,
    info: Option<DocumentInfo>,
    pages: Vec<PdfPage>,
    fonts: BTreeSet<PdfFont>,
}

impl PdfWriter {
    /// Create a writer. `compress` enables flate content streams.
    pub fn new(compress: bool) -> Self {
        Self {
            compress,
            info: None,
            pages: Vec::new(),
            fonts: BTreeSet::new(),
        }
    }

    fn current(&mut self) -> std::result::Result<&mut PdfPage, RenderFault> {
        self.pages
            .last_mut()
            .ok_or_else(|| RenderFault::Device("no page has been started".to_string()))
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PaginatedWriter for PdfWriter {
    fn set_document_info(&mut self, info: &DocumentInfo) {
        self.info = Some(info.clone());
    }

    fn begin_page(&mut self, width: f32, height: f32) -> std::result::Result<(), RenderFault> {
        self.pages.push(PdfPage {
            width,
            height,
            ..PdfPage::default()
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        x: f32,
        baseline: f32,
        text: &str,
        style: &TextStyle,
    ) -> std::result::Result<(), RenderFault> {
        let encoded = encode_text(text)?;
        let font = PdfFont::of(style);
        let page = self.current()?;
        let op = format!(
            "BT /{} {} Tf {} rg {} {} Td ({}) Tj ET\n",
            font.key(),
            num(style.size),
            rgb(style.color),
            num(x * K),
            num((page.height - baseline) * K),
            escape_pdf_bytes(&encoded)
        );
        page.content.push_str(&op);
        self.fonts.insert(font);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> std::result::Result<(), RenderFault> {
        let page = self.current()?;
        let op = format!(
            "{} rg {} {} {} {} re f\n",
            rgb(color),
            num(rect.x * K),
            num((page.height - rect.bottom()) * K),
            num(rect.width * K),
            num(rect.height * K)
        );
        page.content.push_str(&op);
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    ) -> std::result::Result<(), RenderFault> {
        let page = self.current()?;
        let op = format!(
            "{} w {} RG {} {} m {} {} l S\n",
            num(width * K),
            rgb(color),
            num(from.x * K),
            num((page.height - from.y) * K),
            num(to.x * K),
            num((page.height - to.y) * K)
        );
        page.content.push_str(&op);
        Ok(())
    }

    fn link(&mut self, rect: Rect, url: &str) -> std::result::Result<(), RenderFault> {
        self.current()?.links.push((rect, url.to_string()));
        Ok(())
    }

    fn mark(&self) -> WriterMark {
        match self.pages.last() {
            Some(page) => WriterMark {
                pages: self.pages.len(),
                offset: page.content.len(),
                links: page.links.len(),
            },
            None => WriterMark::default(),
        }
    }

    fn rewind(&mut self, mark: WriterMark) {
        self.pages.truncate(mark.pages);
        if let Some(page) = self.pages.last_mut() {
            page.content.truncate(mark.offset);
            page.links.truncate(mark.links);
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(Error::Render("document has no pages".to_string()));
        }

        let mut out = PdfOutput::new();
        let fonts: Vec<PdfFont> = self.fonts.iter().copied().collect();
        let mut next_id = FIRST_FREE_ID;

        let font_ids: Vec<usize> = fonts
            .iter()
            .map(|_| {
                next_id += 1;
                next_id - 1
            })
            .collect();

        // Page object, content stream, then one object per link.
        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let page_id = next_id;
            next_id += 2 + page.links.len();
            page_ids.push(page_id);
        }

        out.write_object(
            CATALOG_ID,
            &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID),
        );

        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        out.write_object(
            PAGES_ID,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids,
                page_ids.len()
            ),
        );

        out.write_object(INFO_ID, &info_dictionary(self.info.as_ref()));

        for (font, id) in fonts.iter().zip(&font_ids) {
            out.write_object(
                *id,
                &format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_name()
                ),
            );
        }

        let font_resources = fonts
            .iter()
            .zip(&font_ids)
            .map(|(font, id)| format!("/{} {} 0 R", font.key(), id))
            .collect::<Vec<_>>()
            .join(" ");

        for (page, &page_id) in self.pages.iter().zip(&page_ids) {
            let content_id = page_id + 1;
            let annot_ids: Vec<usize> = (0..page.links.len()).map(|i| page_id + 2 + i).collect();

            let mut dict = format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources << /Font << {} >> >> /Contents {} 0 R",
                PAGES_ID,
                num(page.width * K),
                num(page.height * K),
                font_resources,
                content_id
            );
            if !annot_ids.is_empty() {
                let refs = annot_ids
                    .iter()
                    .map(|id| format!("{} 0 R", id))
                    .collect::<Vec<_>>()
                    .join(" ");
                dict.push_str(&format!(" /Annots [{}]", refs));
            }
            dict.push_str(" >>");
            out.write_object(page_id, &dict);

            let data = if self.compress {
                flate_compress(page.content.as_bytes())?
            } else {
                page.content.as_bytes().to_vec()
            };
            let filter = if self.compress {
                " /Filter /FlateDecode"
            } else {
                ""
            };
            out.write_stream(content_id, filter, &data);

            for ((rect, url), id) in page.links.iter().zip(annot_ids) {
                out.write_object(id, &link_annotation(page.height, rect, url));
            }
        }

        Ok(out.finish(next_id - 1))
    }
}

/// Serialized bytes plus object offsets for the cross-reference table.
struct PdfOutput {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfOutput {
    fn new() -> Self {
        Self {
            bytes: PDF_HEADER.to_vec(),
            offsets: Vec::new(),
        }
    }

    fn record_offset(&mut self, id: usize) {
        if self.offsets.len() <= id {
            self.offsets.resize(id + 1, 0);
        }
        self.offsets[id] = self.bytes.len();
    }

    fn write_object(&mut self, id: usize, body: &str) {
        self.record_offset(id);
        self.bytes
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn write_stream(&mut self, id: usize, extra: &str, data: &[u8]) {
        self.record_offset(id);
        self.bytes.extend_from_slice(
            format!("{} 0 obj\n<< /Length {}{} >>\nstream\n", id, data.len(), extra).as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, total_objects: usize) -> Vec<u8> {
        let xref_start = self.bytes.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", total_objects + 1);
        for id in 1..=total_objects {
            let offset = self.offsets.get(id).copied().unwrap_or(0);
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            total_objects + 1,
            CATALOG_ID,
            INFO_ID,
            xref_start
        ));
        self.bytes.extend_from_slice(xref.as_bytes());
        self.bytes
    }
}

fn info_dictionary(info: Option<&DocumentInfo>) -> String {
    match info {
        Some(info) => format!(
            "<< /Title ({}) /Producer ({}) /CreationDate (D:{}000000Z) >>",
            escape_pdf_bytes(&encode_lossy(&info.title)),
            escape_pdf_bytes(&encode_lossy(&info.producer)),
            info.created.format("%Y%m%d")
        ),
        None => "<< >>".to_string(),
    }
}

fn link_annotation(page_height: f32, rect: &Rect, url: &str) -> String {
    format!(
        "<< /Type /Annot /Subtype /Link /Rect [{} {} {} {}] /Border [0 0 0] /A << /Type /Action /S /URI /URI ({}) >> >>",
        num(rect.x * K),
        num((page_height - rect.bottom()) * K),
        num((rect.x + rect.width) * K),
        num((page_height - rect.y) * K),
        escape_pdf_bytes(&encode_lossy(url))
    )
}

/// Encode text as Windows-1252, failing on the first unmappable character.
fn encode_text(text: &str) -> std::result::Result<Vec<u8>, RenderFault> {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        let ch = text
            .chars()
            .find(|c| {
                let mut buf = [0u8; 4];
                WINDOWS_1252.encode(c.encode_utf8(&mut buf)).2
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(RenderFault::Unencodable { ch });
    }
    Ok(bytes.into_owned())
}

/// Encode text as Windows-1252, replacing unmappable characters with `?`.
fn encode_lossy(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let (bytes, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        if had_errors {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// Escape bytes for a PDF literal string; non-printable bytes become octal.
fn escape_pdf_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03o}", b)),
        }
    }
    out
}

fn flate_compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn rgb(color: Color) -> String {
    let (r, g, b) = color.unit();
    format!("{} {} {}", num(r), num(g), num(b))
}

/// Format a number with at most two decimals and no trailing zeros.
fn num(value: f32) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn info() -> DocumentInfo {
        DocumentInfo::new("Report (draft)", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    fn one_page(compress: bool) -> PdfWriter {
        let mut writer = PdfWriter::new(compress);
        writer.set_document_info(&info());
        writer.begin_page(210.0, 297.0).unwrap();
        writer
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_num() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(0.333), "0.33");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(10.0), "10");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_pdf_bytes(b"a(b)\\c"), "a\\(b\\)\\\\c");
        assert_eq!(escape_pdf_bytes(&[0xe7, b'\t']), "\\347\\011");
    }

    #[test]
    fn test_structure() {
        let mut writer = one_page(false);
        writer
            .draw_text(10.0, 20.0, "Hello", &TextStyle::helvetica(12.0).bold())
            .unwrap();
        let text = as_text(&writer.finish().unwrap());

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding"));
        assert!(!text.contains("/BaseFont /Courier"));
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("/Title (Report \\(draft\\))"));
        assert!(text.contains("/CreationDate (D:20240501000000Z)"));
    }

    #[test]
    fn test_startxref_points_at_xref() {
        let mut writer = one_page(true);
        writer
            .draw_text(10.0, 20.0, "x", &TextStyle::courier(8.0))
            .unwrap();
        let bytes = writer.finish().unwrap();
        let text = as_text(&bytes);

        let tail = text.rsplit("startxref\n").next().unwrap();
        let offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(bytes[offset..].starts_with(b"xref\n"));
    }

    #[test]
    fn test_compressed_stream() {
        let mut writer = one_page(true);
        writer
            .draw_text(10.0, 20.0, "Compressed", &TextStyle::helvetica(9.0))
            .unwrap();
        let text = as_text(&writer.finish().unwrap());
        assert!(text.contains("/Filter /FlateDecode"));
        assert!(!text.contains("(Compressed) Tj"));
    }

    #[test]
    fn test_accented_text_encoded() {
        let mut writer = one_page(false);
        writer
            .draw_text(10.0, 20.0, "Ação", &TextStyle::helvetica(9.0))
            .unwrap();
        let text = as_text(&writer.finish().unwrap());
        assert!(text.contains("(A\\347\\343o) Tj"));
    }

    #[test]
    fn test_unencodable_text() {
        let mut writer = one_page(false);
        let err = writer
            .draw_text(10.0, 20.0, "ok 中", &TextStyle::helvetica(9.0))
            .unwrap_err();
        assert_eq!(err, RenderFault::Unencodable { ch: '中' });
    }

    #[test]
    fn test_link_annotation() {
        let mut writer = one_page(false);
        writer
            .link(Rect::new(10.0, 10.0, 20.0, 5.0), "https://example.com")
            .unwrap();
        let text = as_text(&writer.finish().unwrap());
        assert!(text.contains("/Subtype /Link"));
        assert!(text.contains("/URI (https://example.com)"));
        assert!(text.contains("/Annots ["));
    }

    #[test]
    fn test_draw_without_page() {
        let mut writer = PdfWriter::new(false);
        let err = writer
            .fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK)
            .unwrap_err();
        assert!(matches!(err, RenderFault::Device(_)));
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_deterministic() {
        let render = || {
            let mut writer = one_page(true);
            writer
                .draw_text(10.0, 20.0, "same", &TextStyle::helvetica(9.0))
                .unwrap();
            writer.finish().unwrap()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_rewind_across_pages() {
        let mut writer = one_page(false);
        let style = TextStyle::helvetica(9.0);
        writer.draw_text(10.0, 20.0, "kept", &style).unwrap();
        let mark = writer.mark();
        writer.draw_text(10.0, 30.0, "dropped", &style).unwrap();
        writer
            .link(Rect::new(10.0, 25.0, 20.0, 5.0), "https://a.io")
            .unwrap();
        writer.begin_page(210.0, 297.0).unwrap();
        writer.draw_text(10.0, 20.0, "next page", &style).unwrap();

        writer.rewind(mark);
        assert_eq!(writer.mark(), mark);

        let text = as_text(&writer.finish().unwrap());
        assert!(text.contains("(kept) Tj"));
        assert!(!text.contains("(dropped) Tj"));
        assert!(!text.contains("(next page) Tj"));
        assert!(!text.contains("/Subtype /Link"));
        assert!(text.contains("/Count 1"));
    }
}
