// SVG-based Canvas implementation
// Lays pages out top to bottom in a single SVG document

use crate::canvas::{Align, Canvas, Cell, CellBreak, LinkId};
use crate::error::{Error, Result};
use crate::theme::{Color, FontStyle};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageError, ImageReader};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

/// Vertical gap between pages in the composed SVG.
const PAGE_GAP: f64 = 20.0;
/// Horizontal padding between a cell edge and its text.
const CELL_PADDING: f64 = 1.0;
/// Box used for images in formats the decoder does not know.
const DEFAULT_IMAGE_SIZE: (f64, f64) = (160.0, 120.0);

/// Footer text size and its distance from the bottom edge.
const FOOTER_FONT_SIZE: f64 = 8.0;
const FOOTER_OFFSET: f64 = 15.0;
const FOOTER_HEIGHT: f64 = 10.0;
const FOOTER_COLOR: Color = Color::rgb(128, 128, 128);

/// Points per millimetre.
pub const MM_TO_PT: f64 = 2.83465;

/// Page size and margins in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
}

impl PageGeometry {
    fn with_size(width: f64, height: f64) -> Self {
        let margin = 35.0 * MM_TO_PT;
        PageGeometry {
            width,
            height,
            margin_left: margin,
            margin_top: margin,
            margin_right: margin,
            margin_bottom: margin,
        }
    }

    pub fn a3() -> Self {
        Self::with_size(841.89, 1190.55)
    }

    pub fn a4() -> Self {
        Self::with_size(595.28, 841.89)
    }

    pub fn a5() -> Self {
        Self::with_size(419.53, 595.28)
    }

    /// Look up a paper size by name (`A3`, `A4`, `A5`).
    pub fn named(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "A3" => Some(Self::a3()),
            "A4" => Some(Self::a4()),
            "A5" => Some(Self::a5()),
            _ => None,
        }
    }

    pub fn landscape(mut self) -> Self {
        std::mem::swap(&mut self.width, &mut self.height);
        self
    }

    pub fn with_margins(mut self, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        self.margin_left = left;
        self.margin_top = top;
        self.margin_right = right;
        self.margin_bottom = bottom;
        self
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Per-page footer: author on the left, title in the middle, page number on
/// the right.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Footer {
    pub author: String,
    pub title: String,
}

/// SVG drawing canvas that records every page as SVG markup
pub struct SvgCanvas {
    geometry: PageGeometry,
    background: Color,
    pages: Vec<String>,
    title: Option<String>,
    footer: Option<Footer>,

    x: f64,
    y: f64,
    left_margin: f64,

    font_family: String,
    font_style: FontStyle,
    font_size: f64,
    text_color: Color,
    fill_color: Color,
    line_width: f64,
    last_cell_height: f64,

    link_count: usize,
    missing_glyphs: HashSet<char>,
}

impl SvgCanvas {
    /// Create a new canvas with one empty page
    pub fn new(geometry: PageGeometry) -> Self {
        SvgCanvas {
            geometry,
            background: Color::WHITE,
            pages: vec![String::new()],
            title: None,
            footer: None,
            x: geometry.margin_left,
            y: geometry.margin_top,
            left_margin: geometry.margin_left,
            font_family: "serif".to_string(),
            font_style: FontStyle::REGULAR,
            font_size: 11.0,
            text_color: Color::BLACK,
            fill_color: Color::WHITE,
            line_width: 1.0,
            last_cell_height: 0.0,
            link_count: 0,
            missing_glyphs: HashSet::new(),
        }
    }

    /// Page background colour
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Document title, written as the SVG `<title>`
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.is_empty());
        self
    }

    pub fn with_footer(mut self, footer: Footer) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Treat the given characters as absent from every font
    pub fn with_missing_glyphs(mut self, glyphs: impl IntoIterator<Item = char>) -> Self {
        self.missing_glyphs.extend(glyphs);
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Markup recorded for one page
    pub fn page(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(String::as_str)
    }

    /// Compose all pages into one SVG document
    pub fn finish(mut self) -> String {
        self.close_page();
        let page_stride = self.geometry.height + PAGE_GAP;
        let total_height = page_stride * self.pages.len() as f64 - PAGE_GAP;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(self.geometry.width),
            h = fmt_num(total_height.max(0.0)),
        );
        svg.push('\n');
        if let Some(title) = &self.title {
            svg.push_str(&format!("  <title>{}</title>\n", escape_xml(title)));
        }
        for (index, page) in self.pages.iter().enumerate() {
            svg.push_str(&format!(
                "  <g class=\"page\" transform=\"translate(0 {})\">\n",
                fmt_num(page_stride * index as f64)
            ));
            svg.push_str(&format!(
                "    <rect width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
                fmt_num(self.geometry.width),
                fmt_num(self.geometry.height),
                self.background
            ));
            svg.push_str(page);
            svg.push_str("  </g>\n");
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Draw the footer of the current page, if one is configured
    fn close_page(&mut self) {
        let Some(footer) = self.footer.clone() else {
            return;
        };
        let page_number = self.pages.len();
        let top = self.geometry.height - FOOTER_OFFSET;
        let middle = self.geometry.width / 2.0;
        let title_width = footer.title.chars().count() as f64 * FOOTER_FONT_SIZE * 0.5;
        let parts = [
            (4.0, footer.author),
            (middle - title_width / 2.0, footer.title),
            (self.geometry.width - 40.0, format!("Page {page_number}")),
        ];
        for (x, text) in parts {
            if text.is_empty() {
                continue;
            }
            self.emit(format!(
                r#"<text class="footer" x="{}" y="{}" fill="{}" font-family="sans-serif" font-size="{}" font-style="italic" xml:space="preserve">{}</text>"#,
                fmt_num(x),
                fmt_num(top + (FOOTER_HEIGHT + FOOTER_FONT_SIZE) / 2.0),
                FOOTER_COLOR,
                fmt_num(FOOTER_FONT_SIZE),
                escape_xml(&text)
            ));
        }
    }

    fn is_monospace(&self) -> bool {
        let family = self.font_family.to_ascii_lowercase();
        family.contains("mono") || family.contains("courier")
    }

    /// Advance of one character, or None when no glyph covers it
    fn advance(&self, ch: char) -> Option<f64> {
        if (ch as u32) > 0xFFFF || self.missing_glyphs.contains(&ch) {
            return None;
        }
        if ch.is_control() {
            return Some(0.0);
        }
        let factor = if self.is_monospace() {
            0.6
        } else if ch == ' ' {
            0.25
        } else if is_wide(ch) {
            1.0
        } else {
            0.5
        };
        let weight = if self.font_style.bold { 1.05 } else { 1.0 };
        Some(factor * weight * self.font_size)
    }

    /// Width used for layout: unknown glyphs still occupy half an em
    fn layout_width(&self, text: &str) -> f64 {
        text.chars()
            .map(|ch| self.advance(ch).unwrap_or(0.5 * self.font_size))
            .sum()
    }

    fn bottom_limit(&self) -> f64 {
        self.geometry.height - self.geometry.margin_bottom
    }

    fn right_limit(&self) -> f64 {
        self.geometry.width - self.geometry.margin_right
    }

    /// Break the page when `height` does not fit below the cursor
    fn ensure_room(&mut self, height: f64) {
        if self.y + height > self.bottom_limit() && self.y > self.geometry.margin_top {
            self.add_page();
        }
    }

    fn current_page(&mut self) -> &mut String {
        if self.pages.is_empty() {
            self.pages.push(String::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text_element(&self, x: f64, y: f64, text: &str) -> String {
        let mut decoration = Vec::new();
        if self.font_style.underline {
            decoration.push("underline");
        }
        if self.font_style.strikeout {
            decoration.push("line-through");
        }
        let decoration_attr = if decoration.is_empty() {
            String::new()
        } else {
            format!(r#" text-decoration="{}""#, decoration.join(" "))
        };
        format!(
            r#"<text x="{}" y="{}" fill="{}" font-family="{}" font-size="{}" font-weight="{}" font-style="{}"{} xml:space="preserve">{}</text>"#,
            fmt_num(x),
            fmt_num(y + self.font_size),
            self.text_color,
            escape_xml(&self.font_family),
            fmt_num(self.font_size),
            if self.font_style.bold { "bold" } else { "normal" },
            if self.font_style.italic { "italic" } else { "normal" },
            decoration_attr,
            escape_xml(text)
        )
    }

    fn emit(&mut self, element: String) {
        let page = self.current_page();
        page.push_str("    ");
        page.push_str(&element);
        page.push('\n');
    }

    fn emit_text(&mut self, x: f64, text: &str, href: Option<&str>) {
        if text.is_empty() {
            return;
        }
        let element = self.text_element(x, self.y, text);
        match href {
            Some(href) => self.emit(format!(r#"<a href="{}">{}</a>"#, escape_xml(href), element)),
            None => self.emit(element),
        }
    }

    fn newline(&mut self, line_height: f64) {
        self.x = self.left_margin;
        self.y += line_height;
        self.ensure_room(line_height);
    }

    /// Flow one line of text from the cursor, wrapping at the right margin
    fn flow_line(&mut self, line_height: f64, line: &str, href: Option<&str>) {
        self.ensure_room(line_height);
        let mut run = String::new();
        let mut run_x = self.x;
        let mut cursor = self.x;

        for word in line.split_inclusive(' ') {
            let width = self.layout_width(word);
            let overflows = cursor + width > self.right_limit() + 0.01;
            if overflows && cursor > self.left_margin + 0.01 && !word.trim().is_empty() {
                self.emit_text(run_x, &run, href);
                run.clear();
                self.newline(line_height);
                run_x = self.x;
                cursor = self.x;
            }
            run.push_str(word);
            cursor += width;
        }
        self.emit_text(run_x, &run, href);
        self.x = cursor;
    }

    fn write_with(&mut self, line_height: f64, text: &str, href: Option<&str>) {
        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            if !line.is_empty() {
                self.flow_line(line_height, line, href);
            }
            if lines.peek().is_some() {
                self.newline(line_height);
            }
        }
    }

    fn wrap_to_width(&self, text: &str, width: f64) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0;
            for word in paragraph.split_inclusive(' ') {
                let w = self.layout_width(word);
                if current_width + w > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push_str(word);
                current_width += w;
            }
            lines.push(current);
        }
        lines
    }
}

impl Canvas for SvgCanvas {
    fn left_margin(&self) -> f64 {
        self.left_margin
    }

    fn set_left_margin(&mut self, margin: f64) {
        self.left_margin = margin;
        if self.x < margin {
            self.x = margin;
        }
    }

    fn right_margin(&self) -> f64 {
        self.geometry.margin_right
    }

    fn page_width(&self) -> f64 {
        self.geometry.width
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    fn set_y(&mut self, y: f64) {
        self.y = y;
        self.x = self.left_margin;
    }

    fn set_font(&mut self, family: &str, style: FontStyle, size: f64) {
        self.font_family = family.to_string();
        self.font_style = style;
        self.font_size = size;
    }

    fn font_size(&self) -> f64 {
        self.font_size
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn string_width(&mut self, text: &str) -> f64 {
        let mut total = 0.0;
        for ch in text.chars() {
            match self.advance(ch) {
                Some(advance) => total += advance,
                None => return 0.0,
            }
        }
        total
    }

    fn write(&mut self, line_height: f64, text: &str) {
        self.write_with(line_height, text, None);
    }

    fn write_link(&mut self, line_height: f64, text: &str, url: &str) {
        self.write_with(line_height, text, Some(url));
    }

    fn write_link_id(&mut self, line_height: f64, text: &str, link: LinkId) {
        let href = format!("#link-{link}");
        self.write_with(line_height, text, Some(&href));
    }

    fn add_link(&mut self) -> LinkId {
        self.link_count += 1;
        self.link_count
    }

    fn set_link(&mut self, link: LinkId) {
        let element = format!(
            r#"<g id="link-{}" transform="translate({} {})"/>"#,
            link,
            fmt_num(self.x),
            fmt_num(self.y)
        );
        self.emit(element);
    }

    fn cell(&mut self, cell: &Cell<'_>) {
        let width = if cell.width > 0.0 {
            cell.width
        } else {
            (self.right_limit() - self.x).max(0.0)
        };
        self.ensure_room(cell.height);
        let (x, y) = (self.x, self.y);

        if cell.fill {
            self.emit(format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                fmt_num(x),
                fmt_num(y),
                fmt_num(width),
                fmt_num(cell.height),
                self.fill_color
            ));
        }

        let edges = [
            (cell.border.top, (x, y, x + width, y)),
            (cell.border.bottom, (x, y + cell.height, x + width, y + cell.height)),
            (cell.border.left, (x, y, x, y + cell.height)),
            (cell.border.right, (x + width, y, x + width, y + cell.height)),
        ];
        for (enabled, (x1, y1, x2, y2)) in edges {
            if enabled {
                self.line(x1, y1, x2, y2);
            }
        }

        if !cell.text.is_empty() {
            let text_width = self.layout_width(cell.text);
            let text_x = match cell.align {
                Align::Left => x + CELL_PADDING,
                Align::Center => x + (width - text_width) / 2.0,
                Align::Right => x + width - text_width - CELL_PADDING,
            };
            let element = self.text_element(text_x, y + (cell.height - self.font_size) / 2.0, cell.text);
            self.emit(element);
        }

        self.last_cell_height = cell.height;
        match cell.after {
            CellBreak::Right => self.x = x + width,
            CellBreak::NextLine => {
                self.x = self.left_margin;
                self.y = y + cell.height;
            }
        }
    }

    fn multi_cell(&mut self, width: f64, line_height: f64, text: &str, fill: bool) {
        let width = if width > 0.0 {
            width
        } else {
            (self.right_limit() - self.x).max(0.0)
        };
        let start_x = self.x;
        for line in self.wrap_to_width(text, width - 2.0 * CELL_PADDING) {
            self.x = start_x;
            self.cell(
                &Cell::new(width, line_height, &line)
                    .fill(fill)
                    .then(CellBreak::NextLine),
            );
        }
        self.x = self.left_margin;
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let element = format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2),
            self.text_color,
            fmt_num(self.line_width)
        );
        self.emit(element);
    }

    fn image(&mut self, path: &Path) -> Result<()> {
        let bytes = read_image(path)?;
        let (mut width, mut height) = image_size(&bytes)?;
        let available = self.right_limit() - self.left_margin;
        if width > available && width > 0.0 {
            height *= available / width;
            width = available;
        }
        self.ensure_room(height);
        let element = format!(
            r#"<image href="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
            data_uri(path, &bytes),
            fmt_num(self.left_margin),
            fmt_num(self.y),
            fmt_num(width),
            fmt_num(height)
        );
        self.emit(element);
        self.y += height;
        self.x = self.left_margin;
        Ok(())
    }

    fn inline_image(&mut self, path: &Path, height: f64) -> Result<()> {
        let bytes = read_image(path)?;
        if self.x + height > self.right_limit() && self.x > self.left_margin {
            self.newline(height);
        }
        let element = format!(
            r#"<image href="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
            data_uri(path, &bytes),
            fmt_num(self.x),
            fmt_num(self.y),
            fmt_num(height),
            fmt_num(height)
        );
        self.emit(element);
        self.x += height;
        Ok(())
    }

    fn ln(&mut self, height: Option<f64>) {
        let height = height.unwrap_or(self.last_cell_height);
        self.x = self.left_margin;
        self.y += height;
        self.ensure_room(height);
    }

    fn add_page(&mut self) {
        self.close_page();
        self.pages.push(String::new());
        self.x = self.left_margin;
        self.y = self.geometry.margin_top;
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::ResourceNotFound(path.display().to_string()),
        _ => Error::Io(err),
    })
}

/// Pixel size read from the image header
///
/// Formats the decoder does not know (SVG among them) get a default box.
fn image_size(bytes: &[u8]) -> Result<(f64, f64)> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    match reader.into_dimensions() {
        Ok((width, height)) => Ok((width as f64, height as f64)),
        Err(ImageError::IoError(err)) => Err(Error::Io(err)),
        Err(ImageError::Unsupported(err)) => {
            log::debug!("Unknown image format: {err}");
            Ok(DEFAULT_IMAGE_SIZE)
        }
        Err(err) => Err(Error::Io(io::Error::new(io::ErrorKind::InvalidData, err))),
    }
}

/// Image bytes as a `data:` URI so the SVG carries its own images
fn data_uri(path: &Path, bytes: &[u8]) -> String {
    let mime = match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg")) => {
            "image/svg+xml"
        }
        Err(_) => "application/octet-stream",
    };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60)
}

fn fmt_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Escape XML text
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> SvgCanvas {
        SvgCanvas::new(PageGeometry::a4().with_margins(50.0, 50.0, 50.0, 50.0))
    }

    #[test]
    fn test_svg_document_dimensions() {
        let svg = canvas().finish();
        assert!(svg.contains(r#"width="595.28""#));
        assert!(svg.contains(r#"height="841.89""#));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_string_width_reports_missing_glyphs() {
        let mut ctx = canvas().with_missing_glyphs(['☐']);
        ctx.set_font("serif", FontStyle::REGULAR, 10.0);
        assert_eq!(ctx.string_width("ab"), 10.0);
        assert_eq!(ctx.string_width("☐"), 0.0);
        assert_eq!(ctx.string_width("a\u{1F680}"), 0.0);
    }

    #[test]
    fn test_write_newline_returns_to_left_margin() {
        let mut ctx = canvas();
        ctx.set_left_margin(80.0);
        ctx.write(12.0, "hello\n");
        assert_eq!(ctx.x(), 80.0);
        assert_eq!(ctx.y(), 62.0);
    }

    #[test]
    fn test_write_wraps_at_right_margin() {
        let mut ctx = canvas();
        ctx.set_font("serif", FontStyle::REGULAR, 10.0);
        let long = "word ".repeat(60);
        ctx.write(12.0, &long);
        assert!(ctx.y() > 50.0);
        assert!(ctx.x() <= 545.0);
    }

    #[test]
    fn test_cell_moves_right_or_down() {
        let mut ctx = canvas();
        ctx.cell(&Cell::new(40.0, 10.0, "a"));
        assert_eq!(ctx.x(), 90.0);
        ctx.cell(&Cell::new(40.0, 10.0, "b").then(CellBreak::NextLine));
        assert_eq!(ctx.x(), 50.0);
        assert_eq!(ctx.y(), 60.0);
        ctx.ln(None);
        assert_eq!(ctx.y(), 70.0);
    }

    #[test]
    fn test_page_break_when_full() {
        let mut ctx = canvas();
        for _ in 0..100 {
            ctx.write(12.0, "line\n");
        }
        assert!(ctx.page_count() > 1);
        assert!(ctx.y() < 841.89 - 50.0);
    }

    #[test]
    fn test_xml_escaping() {
        let mut ctx = canvas();
        ctx.write(12.0, "<test> & \"quote\"");
        let svg = ctx.finish();
        assert!(svg.contains("&lt;test&gt; &amp; &quot;quote&quot;"));
    }

    #[test]
    fn test_missing_image_is_resource_not_found() {
        let mut ctx = canvas();
        let err = ctx.image(Path::new("/nonexistent/picture.png")).unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_image_size_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let gif = dir.path().join("tall.gif");
        image::RgbaImage::new(10, 20).save(&gif).unwrap();
        let jpeg = dir.path().join("wide.jpg");
        image::RgbImage::new(30, 15).save(&jpeg).unwrap();

        assert_eq!(image_size(&fs::read(&gif).unwrap()).unwrap(), (10.0, 20.0));
        assert_eq!(image_size(&fs::read(&jpeg).unwrap()).unwrap(), (30.0, 15.0));
    }

    #[test]
    fn test_image_size_of_unknown_format() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        assert_eq!(image_size(svg).unwrap(), DEFAULT_IMAGE_SIZE);
        assert_eq!(data_uri(Path::new("logo.svg"), svg).split(',').next(), Some("data:image/svg+xml;base64"));

        let broken = b"\x89PNG\r\n\x1a\nnot a header";
        assert!(matches!(image_size(broken), Err(Error::Io(_))));
    }

    #[test]
    fn test_image_is_embedded_and_scaled_to_the_text_width() {
        let dir = tempfile::tempdir().unwrap();
        let wide = dir.path().join("wide.png");
        image::RgbImage::new(990, 99).save(&wide).unwrap();

        let mut ctx = canvas();
        ctx.image(&wide).unwrap();
        let svg = ctx.finish();
        assert!(svg.contains(r#"<image href="data:image/png;base64,iVBORw0KGgo"#), "{svg}");
        assert!(svg.contains(r#"width="495.28" height="49.53""#), "{svg}");
    }

    #[test]
    fn test_footer_on_every_page() {
        let mut ctx = canvas()
            .with_title(Some("Guide & Notes".into()))
            .with_footer(Footer {
                author: "Kim".into(),
                title: "Guide & Notes".into(),
            });
        ctx.add_page();
        assert_eq!(ctx.page(0).unwrap().matches(r#"class="footer""#).count(), 3);
        assert!(ctx.page(0).unwrap().contains(">Page 1</text>"));

        let svg = ctx.finish();
        assert!(svg.contains("<title>Guide &amp; Notes</title>"));
        assert!(svg.contains(">Page 2</text>"));
        assert!(svg.contains(">Kim</text>"));
        assert!(svg.contains(r#"y="835.89""#));
    }

    #[test]
    fn test_no_footer_by_default() {
        let mut ctx = canvas().with_title(Some(String::new()));
        ctx.add_page();
        let svg = ctx.finish();
        assert!(!svg.contains("footer"));
        assert!(!svg.contains("<title>"));
    }

    #[test]
    fn test_named_geometry() {
        assert_eq!(PageGeometry::named("a5"), Some(PageGeometry::a5()));
        assert!(PageGeometry::named("letter").is_none());
        let landscape = PageGeometry::a4().landscape();
        assert!(landscape.width > landscape.height);
    }
}
