// Drawing backend trait - abstracts over the page description the renderer
// writes into. All lengths are in points.

use crate::error::Result;
use crate::theme::{Color, FontStyle, Styler};
use std::path::Path;

/// Identifier of an internal link target created with [`Canvas::add_link`].
pub type LinkId = usize;

/// Which edges of a cell get a border line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Border {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Border {
    pub const NONE: Border = Border {
        top: false,
        bottom: false,
        left: false,
        right: false,
    };
    pub const TOP: Border = Border {
        top: true,
        ..Border::NONE
    };
    pub const BOTTOM: Border = Border {
        bottom: true,
        ..Border::NONE
    };

    pub fn is_none(&self) -> bool {
        *self == Border::NONE
    }
}

/// Horizontal alignment of text inside a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Where the cursor goes after a cell has been drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellBreak {
    /// Continue to the right of the cell.
    #[default]
    Right,
    /// Move to the start of the next line.
    NextLine,
}

/// A single formatted cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell<'a> {
    /// Width of the cell; 0 extends it to the right margin.
    pub width: f64,
    pub height: f64,
    pub text: &'a str,
    pub border: Border,
    pub after: CellBreak,
    pub align: Align,
    pub fill: bool,
}

impl<'a> Cell<'a> {
    pub fn new(width: f64, height: f64, text: &'a str) -> Self {
        Cell {
            width,
            height,
            text,
            border: Border::NONE,
            after: CellBreak::Right,
            align: Align::Left,
            fill: false,
        }
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn then(mut self, after: CellBreak) -> Self {
        self.after = after;
        self
    }
}

/// The output surface the renderer draws on.
///
/// Text written with [`Canvas::write`] flows from the cursor and wraps at the
/// margins; a `'\n'` moves the cursor to the left margin of the next line.
/// Pagination is the canvas' business.
pub trait Canvas {
    fn left_margin(&self) -> f64;
    fn set_left_margin(&mut self, margin: f64);
    fn right_margin(&self) -> f64;
    fn page_width(&self) -> f64;

    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn set_x(&mut self, x: f64);
    fn set_y(&mut self, y: f64);

    fn set_font(&mut self, family: &str, style: FontStyle, size: f64);
    fn font_size(&self) -> f64;
    fn set_text_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);

    /// Width of `text` in the current font, or 0 when the font lacks a glyph.
    fn string_width(&mut self, text: &str) -> f64;

    fn write(&mut self, line_height: f64, text: &str);
    fn write_link(&mut self, line_height: f64, text: &str, url: &str);
    fn write_link_id(&mut self, line_height: f64, text: &str, link: LinkId);

    fn add_link(&mut self) -> LinkId;
    /// Point `link` at the current position.
    fn set_link(&mut self, link: LinkId);

    fn cell(&mut self, cell: &Cell<'_>);
    /// Draw `text` wrapped into consecutive cells of the given width.
    fn multi_cell(&mut self, width: f64, line_height: f64, text: &str, fill: bool);
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Place an image from a resolved file path at the cursor, full width of
    /// its own size, and move below it.
    fn image(&mut self, path: &Path) -> Result<()>;
    /// Place an image inline with the text, scaled to `height`.
    fn inline_image(&mut self, path: &Path, height: f64) -> Result<()>;

    /// Line feed; `None` repeats the height of the last cell.
    fn ln(&mut self, height: Option<f64>);
    fn add_page(&mut self);

    /// Apply every attribute of a style.
    fn set_styler(&mut self, style: &Styler) {
        self.set_font(&style.font, style.style, style.size);
        self.set_text_color(style.text_color);
        self.set_fill_color(style.fill_color);
    }
}
