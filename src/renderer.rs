// Document renderer
// Walks the document arena in pre-order and turns enter/leave events into
// canvas calls. Layout context lives in the container stack; per-element
// failures become diagnostics and the walk continues.

use crate::canvas::{Align, Border, Canvas, Cell, CellBreak};
use crate::config::RenderOptions;
use crate::container::{ContainerStack, ContainerState};
use crate::error::{Error, Result};
use crate::highlight::{self, Span, SyntaxRegistry, WRAP_COLUMN};
use crate::icons::{self, IconMode, TextSegment};
use crate::list_layout;
use crate::markdown_ast::{Document, LIST_TRANSITION_ATTR, ListKind, NodeId, NodeType, WalkEvent, Walker};
use crate::markers::{self, substitute_checkboxes};
use crate::resources::{self, FsResolver, ResourceResolver, absolutize_link};
use crate::table_layout::{ColumnWidths, TableLayout};
use crate::theme::{FontStyle, Styler, Theme};
use crate::toc::TableOfContents;
use std::fmt;

const TRACE_TARGET: &str = "mdpaint::trace";

/// A per-element failure that degraded the output.
#[derive(Debug)]
pub struct Diagnostic {
    pub node: NodeId,
    pub element: String,
    pub error: Error,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (node {}): {}", self.element, self.node, self.error)
    }
}

/// Outcome of a completed render.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Enter and leave events dispatched.
    pub events: usize,
    /// Deepest container stack seen, root included.
    pub max_depth: usize,
}

/// Renders documents onto a canvas it owns.
pub struct Renderer<C: Canvas> {
    canvas: C,
    options: RenderOptions,
    theme: Theme,
    resolver: Box<dyn ResourceResolver>,
    syntax: SyntaxRegistry,

    stack: ContainerStack,
    em: f64,
    indent: f64,
    column_widths: ColumnWidths,
    table: Option<TableLayout>,
    toc: Option<TableOfContents>,
    /// Stack depth recorded when each open node was entered.
    entered_at: Vec<usize>,
    /// Last number of a top-level ordered list, for continuous numbering.
    carried_counter: u64,
    /// Font flags in effect before each open emphasis, strong or strike node.
    saved_font_styles: Vec<FontStyle>,
    diagnostics: Vec<Diagnostic>,
}

impl<C: Canvas> Renderer<C> {
    /// Create a renderer using the theme and resources named in `options`.
    ///
    /// Remote images are downloaded when `fetch_remote` is set.
    pub fn new(canvas: C, options: RenderOptions) -> Result<Self> {
        let theme = options.resolve_theme()?;
        let resolver = resources::resolver_for(&options)?;
        Ok(Self::with_theme(canvas, options, theme).with_resolver(resolver))
    }

    /// Images resolve from the filesystem only; see [`Renderer::with_resolver`].
    pub fn with_theme(canvas: C, options: RenderOptions, theme: Theme) -> Self {
        let resolver = FsResolver::new(options.base_dir.clone(), options.base_url.clone());
        let syntax = SyntaxRegistry::new(options.syntax_dir.clone());
        let root = ContainerState::new(theme.normal.clone(), canvas.left_margin());
        Renderer {
            canvas,
            options,
            theme,
            resolver: Box::new(resolver),
            syntax,
            stack: ContainerStack::new(root),
            em: 0.0,
            indent: 0.0,
            column_widths: ColumnWidths::default(),
            table: None,
            toc: None,
            entered_at: Vec::new(),
            carried_counter: 0,
            saved_font_styles: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Replace the resolver used for images.
    pub fn with_resolver(mut self, resolver: Box<dyn ResourceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    /// Current container stack depth, root included.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Base font metric in use.
    pub fn em(&self) -> f64 {
        self.em
    }

    /// Render a whole document.
    ///
    /// Recoverable failures are collected in the report; a broken stack
    /// protocol aborts with an error.
    pub fn render(&mut self, doc: &mut Document) -> Result<RenderReport> {
        self.prepare(doc);

        let mut report = RenderReport {
            max_depth: self.stack.depth(),
            ..RenderReport::default()
        };
        let mut walker = Walker::new(doc.root());
        while let Some(event) = walker.next(doc) {
            self.dispatch(doc, event)?;
            report.events += 1;
            report.max_depth = report.max_depth.max(self.stack.depth());
        }

        if self.stack.depth() != 1 {
            return Err(Error::Unbalanced {
                node: "Document".to_string(),
                entered: 1,
                left: self.stack.depth(),
            });
        }
        report.diagnostics = std::mem::take(&mut self.diagnostics);
        Ok(report)
    }

    fn prepare(&mut self, doc: &Document) {
        let normal = self.theme.normal.clone();
        self.canvas.set_styler(&normal);
        self.em = match self.options.em {
            Some(em) => em,
            None => match self.canvas.string_width("m") {
                w if w > 0.0 => w,
                _ => normal.size / 2.0,
            },
        };
        self.indent = self.options.indent.unwrap_or(3.0 * self.em);

        let root = ContainerState::new(normal, self.canvas.left_margin());
        self.stack = ContainerStack::new(root);
        self.table = None;
        self.entered_at.clear();
        self.carried_counter = 0;
        self.saved_font_styles.clear();
        self.diagnostics.clear();

        self.column_widths = ColumnWidths::compute(
            doc,
            &mut self.canvas,
            &self.theme.table_header,
            self.em,
            self.options.icon_mode,
        );

        self.toc = if self.options.generate_toc {
            let mut toc = TableOfContents::collect(doc, self.options.icon_mode);
            toc.render(&mut self.canvas, &self.theme);
            Some(toc)
        } else {
            None
        };
    }

    fn dispatch(&mut self, doc: &mut Document, event: WalkEvent) -> Result<()> {
        let id = event.node;
        let name = doc.kind(id).name().to_string();
        let indent = " ".repeat(self.entered_at.len().saturating_sub(1));

        let result = if event.entering {
            log::trace!(target: TRACE_TARGET, "{indent}{name} (entering) depth={}", self.stack.depth());
            self.entered_at.push(self.stack.depth());
            self.enter(doc, id)
        } else {
            self.leave(doc, id)
        };

        match result {
            Ok(()) => {}
            Err(error) if error.is_recoverable() => self.record(id, &name, error),
            Err(error) => return Err(error),
        }

        if !event.entering {
            let entered = self.entered_at.pop().unwrap_or(1);
            let left = self.stack.depth();
            log::trace!(target: TRACE_TARGET, "{indent}{name} (leaving) depth={left}");
            if entered != left {
                return Err(Error::Unbalanced {
                    node: name,
                    entered,
                    left,
                });
            }
        }
        Ok(())
    }

    fn record(&mut self, node: NodeId, element: &str, error: Error) {
        log::warn!("{element}: {error}");
        self.diagnostics.push(Diagnostic {
            node,
            element: element.to_string(),
            error,
        });
    }

    fn enter(&mut self, doc: &mut Document, id: NodeId) -> Result<()> {
        if matches!(doc.kind(id), NodeType::ListItem) {
            return self.enter_item(doc, id);
        }
        let doc: &Document = doc;
        match doc.kind(id) {
            NodeType::Document | NodeType::Other(_) => Ok(()),
            NodeType::Paragraph => {
                self.enter_paragraph(doc, id);
                Ok(())
            }
            NodeType::Heading { level } => self.enter_heading(id, *level),
            NodeType::BlockQuote => self.enter_blockquote(),
            NodeType::List { kind, start } => self.enter_list(doc, id, *kind, *start),
            NodeType::ListItem => Ok(()),
            NodeType::CodeBlock { info, literal } => self.code_block(info, literal),
            NodeType::HtmlBlock { literal } => {
                self.html_block(literal);
                Ok(())
            }
            NodeType::HorizontalRule => {
                self.horizontal_rule();
                Ok(())
            }
            NodeType::Table => self.enter_table(id),
            NodeType::TableHead => self.push_table_frame(&self.theme.table_header.clone(), true),
            NodeType::TableBody => self.push_table_frame(&self.theme.table_body.clone(), false),
            NodeType::TableRow => self.enter_row(),
            NodeType::TableCell { is_header } => self.enter_cell(*is_header),
            NodeType::Text { literal } => {
                self.text(id, literal);
                Ok(())
            }
            NodeType::Emphasis => {
                self.push_font_style(|style| style.italic = true);
                Ok(())
            }
            NodeType::Strong => {
                self.push_font_style(|style| style.bold = true);
                Ok(())
            }
            NodeType::Strikethrough => {
                self.push_font_style(|style| style.strikeout = true);
                Ok(())
            }
            NodeType::Link { destination, .. } => self.enter_link(destination),
            NodeType::Image {
                destination, alt, ..
            } => self.image(destination, alt),
            NodeType::Code { literal } => {
                self.inline_code(literal);
                Ok(())
            }
            NodeType::HardBreak => {
                if let Some(frame) = self.stack.cell_frame_mut() {
                    frame.cell_buffer.get_or_insert_with(String::new).push(' ');
                } else {
                    self.cr();
                }
                Ok(())
            }
        }
    }

    fn leave(&mut self, doc: &Document, id: NodeId) -> Result<()> {
        match doc.kind(id) {
            NodeType::Paragraph => {
                self.leave_paragraph(doc, id);
                Ok(())
            }
            NodeType::Heading { .. } => {
                self.cr();
                self.stack.pop(&mut self.canvas)?;
                Ok(())
            }
            NodeType::BlockQuote => {
                self.stack.pop(&mut self.canvas)?;
                self.cr();
                Ok(())
            }
            NodeType::List { kind, .. } => self.leave_list(*kind),
            NodeType::ListItem => {
                self.stack.pop(&mut self.canvas)?;
                Ok(())
            }
            NodeType::Table => self.leave_table(),
            NodeType::TableHead | NodeType::TableRow => {
                self.stack.pop(&mut self.canvas)?;
                Ok(())
            }
            NodeType::TableBody => {
                self.stack.pop(&mut self.canvas)?;
                self.canvas.ln(None);
                Ok(())
            }
            NodeType::TableCell { .. } => self.leave_cell(),
            NodeType::Emphasis | NodeType::Strong | NodeType::Strikethrough => {
                if let Some(previous) = self.saved_font_styles.pop() {
                    self.stack.peek_mut().style.style = previous;
                }
                Ok(())
            }
            NodeType::Link { .. } => {
                self.stack.pop(&mut self.canvas)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Remember the current font flags, then change them for an inline span.
    fn push_font_style(&mut self, change: impl FnOnce(&mut FontStyle)) {
        let style = &mut self.stack.peek_mut().style.style;
        self.saved_font_styles.push(*style);
        change(style);
    }

    /// Line feed at the line height of the current style.
    fn cr(&mut self) {
        let line_height = self.stack.peek().style.line_height();
        self.canvas.write(line_height, "\n");
    }

    /// Outside of lists, forget the numbering of the previous list unless
    /// numbering is continuous.
    fn reset_list_counter(&mut self) {
        if !self.options.keep_numbering && !self.stack.in_list() {
            self.carried_counter = 0;
            self.stack.set_ordered_counter(0);
        }
    }

    fn in_list_item(doc: &Document, id: NodeId) -> bool {
        doc.parent(id)
            .is_some_and(|parent| matches!(doc.kind(parent), NodeType::ListItem))
    }

    fn enter_paragraph(&mut self, doc: &Document, id: NodeId) {
        let normal = self.theme.normal.clone();
        self.canvas.set_styler(&normal);
        if Self::in_list_item(doc, id) {
            if self.stack.peek().list_kind.is_some() && !self.stack.peek().first_paragraph {
                self.cr();
            }
            return;
        }
        self.reset_list_counter();
        self.cr();
    }

    fn leave_paragraph(&mut self, doc: &Document, id: NodeId) {
        if Self::in_list_item(doc, id) {
            let top = self.stack.peek_mut();
            if top.list_kind.is_some() {
                if top.first_paragraph {
                    top.first_paragraph = false;
                } else {
                    self.cr();
                }
            }
            return;
        }
        self.cr();
    }

    fn enter_heading(&mut self, id: NodeId, level: u8) -> Result<()> {
        self.reset_list_counter();
        self.cr();
        let style = self.theme.heading(level).clone();
        let frame = ContainerState::child_of(self.stack.peek(), style);
        self.stack.push(frame, &self.canvas)?;
        if let Some(link) = self.toc.as_ref().and_then(|toc| toc.link_for(id)) {
            self.canvas.set_link(link);
        }
        Ok(())
    }

    fn enter_blockquote(&mut self) -> Result<()> {
        self.reset_list_counter();
        let base = self.canvas.left_margin().max(self.stack.peek().left_margin);
        let margin = base + self.indent;
        let frame = ContainerState::new(self.theme.blockquote.clone(), margin);
        self.stack.push(frame, &self.canvas)?;
        self.canvas.set_left_margin(margin);
        Ok(())
    }

    fn enter_list(&mut self, doc: &Document, id: NodeId, kind: ListKind, start: u64) -> Result<()> {
        let normal = self.theme.normal.clone();
        self.canvas.set_styler(&normal);

        if doc.node(id).has_attribute(LIST_TRANSITION_ATTR) {
            log::debug!("List kind transition before node {id}");
            self.cr();
        }

        let parent = self.stack.peek();
        let nested = parent.list_kind.is_some() && self.stack.depth() >= 2;
        if nested {
            let spacing = list_layout::nested_list_spacing(&parent.style);
            self.canvas.write(spacing, "\n");
        }

        let top_level = !self.stack.in_list();
        let parent = self.stack.peek();
        let margin = list_layout::list_left_margin(parent, self.indent);
        let mut frame = ContainerState::new(normal, margin).with_list_kind(kind);

        let seed = (kind == ListKind::Ordered).then(|| {
            let start = start.max(1);
            if self.options.keep_numbering && top_level && start == 1 {
                self.carried_counter
            } else {
                start - 1
            }
        });
        if let Some(seed) = seed {
            frame.item_number = seed;
        }

        self.stack.push(frame, &self.canvas)?;
        if let Some(seed) = seed {
            self.stack.set_ordered_counter(seed);
        }
        self.canvas.set_left_margin(margin);
        log::debug!("List {kind:?} left margin {margin}");
        Ok(())
    }

    fn leave_list(&mut self, kind: ListKind) -> Result<()> {
        let last_number = self.stack.ordered_counter();
        self.stack.pop(&mut self.canvas)?;
        if kind == ListKind::Ordered && !self.stack.in_list() {
            self.carried_counter = last_number;
        }
        if self.stack.depth() < 2 {
            self.cr();
        }
        Ok(())
    }

    fn enter_item(&mut self, doc: &mut Document, id: NodeId) -> Result<()> {
        let kind = self.stack.peek().list_kind;
        let number = if kind == Some(ListKind::Ordered) {
            let n = self.stack.next_ordered();
            self.stack.peek_mut().item_number = n;
            n
        } else {
            let parent = self.stack.peek_mut();
            parent.item_number += 1;
            parent.item_number
        };

        let style = list_layout::item_style(&self.theme.normal);
        self.canvas
            .write(list_layout::item_break_height(&style), "\n");

        let mut frame = ContainerState::new(style.clone(), self.stack.peek().left_margin);
        frame.list_kind = kind;
        frame.item_number = number;
        frame.first_paragraph = true;
        let left = frame.left_margin;
        self.stack.push(frame, &self.canvas)?;

        self.canvas.set_styler(&style);
        self.canvas.set_x(left);

        let checkbox = if kind == Some(ListKind::Unordered) {
            markers::strip_checkbox_marker(doc, id)
        } else {
            None
        };
        let label = list_layout::bullet_label(kind, number, checkbox);
        let bullet = list_layout::resolve_bullet(&mut self.canvas, label, checkbox);
        let desired = list_layout::item_indent(bullet.width, self.em);
        log::debug!("{kind:?} item #{number}: label {:?} width {}", bullet.label, bullet.width);

        self.canvas.write(style.line_height(), &bullet.label);
        let mut content_left = left + desired;
        if self.canvas.x() < content_left {
            self.canvas.set_x(content_left);
        } else {
            content_left = self.canvas.x();
        }
        self.stack.peek_mut().content_left_margin = content_left;
        self.canvas.set_left_margin(content_left);
        self.canvas.set_x(content_left);
        Ok(())
    }

    fn enter_link(&mut self, destination: &str) -> Result<()> {
        let top = self.stack.peek();
        let frame = if destination.starts_with('#') && !self.options.anchor_links {
            log::debug!("Anchor link {destination} rendered as text");
            ContainerState::child_of(top, top.style.clone())
        } else {
            let target = absolutize_link(destination, self.options.base_url.as_deref());
            ContainerState::child_of(top, self.theme.link.clone()).with_destination(Some(target))
        };
        self.stack.push(frame, &self.canvas)
    }

    fn text(&mut self, id: NodeId, literal: &str) {
        let style = self.stack.peek().style.clone();
        self.canvas.set_styler(&style);
        let text = substitute_checkboxes(&literal.replace('\n', " "));

        if let Some(frame) = self.stack.cell_frame_mut() {
            frame.cell_buffer.get_or_insert_with(String::new).push_str(&text);
            frame.cell_style = Some(style);
            return;
        }

        let destination = self.stack.peek().destination.clone();
        self.write_segmented(id, &style, &text, destination.as_deref());
    }

    /// Write a text run, handling each icon segment per the icon mode.
    fn write_segmented(&mut self, id: NodeId, style: &Styler, text: &str, link: Option<&str>) {
        let mode = self.options.icon_mode;
        let line_height = style.line_height();
        for segment in icons::segment(text) {
            let segment = segment.with_mode(mode);
            if segment.is_icon && mode == IconMode::Embed {
                self.embed_icon(id, style, &segment, link);
            } else {
                let content = icons::sanitize(&segment.content, mode);
                self.write_text(line_height, &content, link);
            }
        }
    }

    fn write_text(&mut self, line_height: f64, text: &str, link: Option<&str>) {
        if text.is_empty() {
            return;
        }
        match link {
            Some(url) => self.canvas.write_link(line_height, text, url),
            None => self.canvas.write(line_height, text),
        }
    }

    fn embed_icon(&mut self, id: NodeId, style: &Styler, segment: &TextSegment, link: Option<&str>) {
        let line_height = style.line_height();
        let drawn = match segment.asset_name() {
            Some(name) => {
                let path = self.options.emoji_dir.join(name);
                self.canvas.inline_image(&path, style.size)
            }
            None => Err(Error::ResourceNotFound(segment.content.clone())),
        };

        match drawn {
            Ok(()) => {
                if segment.has_badge_variation() {
                    self.write_text(line_height, " ", link);
                }
            }
            Err(error) => {
                let replacement = if self.options.remove_unknown_icons {
                    " ".to_string()
                } else {
                    icons::sanitize_bmp(&segment.clone().with_mode(IconMode::Text).content)
                };
                if error.is_recoverable() {
                    self.record(id, "Emoji", error);
                }
                self.write_text(line_height, &replacement, link);
            }
        }
    }

    fn inline_code(&mut self, literal: &str) {
        let text = icons::flatten_icons(literal, self.options.icon_mode);

        if let Some(frame) = self.stack.cell_frame_mut() {
            frame.cell_buffer.get_or_insert_with(String::new).push_str(&text);
            return;
        }

        if self.options.code_box {
            let style = self.theme.code.clone();
            self.canvas.set_styler(&style);
            let width = self.canvas.string_width(&text) + self.em;
            self.canvas.cell(
                &Cell::new(width, style.size, &text)
                    .align(Align::Center)
                    .fill(true),
            );
        } else {
            let style = self.theme.backtick.clone();
            self.canvas.set_styler(&style);
            self.canvas.write(style.line_height(), &text);
        }
    }

    fn code_block(&mut self, info: &str, literal: &str) -> Result<()> {
        self.reset_list_counter();
        let style = self.stack.peek().style.clone();
        self.canvas.set_styler(&style);

        let code = icons::flatten_icons(literal, self.options.icon_mode);
        let code = code.strip_suffix('\n').unwrap_or(&code);
        let language = highlight::effective_language(info, literal);
        let wrapped = highlight::wrap_code(code, WRAP_COLUMN);

        let highlighted = self
            .syntax
            .get(language)
            .map(|h| h.map(|h| h.highlight(&wrapped)));

        match highlighted {
            Ok(Some(lines)) => {
                self.highlighted_code(&lines);
                Ok(())
            }
            Ok(None) => {
                self.unhighlighted_code(code);
                Ok(())
            }
            Err(error) => {
                self.unhighlighted_code(code);
                Err(error)
            }
        }
    }

    fn unhighlighted_code(&mut self, code: &str) {
        self.cr();
        let style = self.theme.backtick.clone();
        self.canvas.set_styler(&style);
        self.canvas.multi_cell(0.0, style.line_height(), code, true);
    }

    fn highlighted_code(&mut self, lines: &[Vec<Span>]) {
        let style = self.theme.backtick.clone();
        let line_height = style.line_height();
        self.cr();
        for line in lines {
            for span in line {
                self.canvas.set_styler(&style);
                if let Some(color) = span.group.color() {
                    self.canvas.set_text_color(color);
                }
                self.canvas.write(line_height, &span.text);
            }
            self.canvas.write(line_height, "\n");
        }
    }

    fn html_block(&mut self, literal: &str) {
        self.cr();
        let style = self.theme.backtick.clone();
        self.canvas.set_styler(&style);
        let text = icons::flatten_icons(literal.trim_end_matches('\n'), self.options.icon_mode);
        for line in text.split('\n') {
            self.canvas.cell(
                &Cell::new(0.0, style.size, line)
                    .fill(true)
                    .then(CellBreak::NextLine),
            );
        }
        self.cr();
    }

    fn horizontal_rule(&mut self) {
        self.reset_list_counter();
        if self.options.hr_page_break {
            self.canvas.add_page();
            return;
        }
        self.cr();
        let (x, y) = (self.canvas.x(), self.canvas.y());
        let end = self.canvas.page_width() - self.canvas.left_margin();
        self.canvas.set_line_width(1.0);
        self.canvas.line(x, y, end, y);
        self.cr();
    }

    fn image(&mut self, destination: &str, alt: &str) -> Result<()> {
        if let Some(frame) = self.stack.cell_frame_mut() {
            frame.cell_buffer.get_or_insert_with(String::new).push_str(alt);
            return Ok(());
        }
        self.cr();
        let path = self.resolver.resolve(destination)?;
        log::debug!("Image {destination} resolved to {}", path.display());
        self.canvas.image(&path)
    }

    fn enter_table(&mut self, id: NodeId) -> Result<()> {
        self.cr();
        let frame = ContainerState::child_of(self.stack.peek(), self.theme.table_header.clone());
        self.stack.push(frame, &self.canvas)?;

        let widths = self.column_widths.get(id).map(<[f64]>::to_vec).unwrap_or_default();
        if let Some(previous) = self.table.replace(TableLayout::new(id, widths)) {
            log::warn!("Table {id} started while table {} was active", previous.table);
        }
        self.canvas.set_line_width(1.0);
        Ok(())
    }

    fn leave_table(&mut self) -> Result<()> {
        let layout = self.table.take().ok_or(Error::NoActiveTable)?;
        self.canvas
            .cell(&Cell::new(layout.total_width(), 0.0, "").border(Border::TOP));
        self.stack.pop(&mut self.canvas)?;
        self.cr();
        Ok(())
    }

    fn push_table_frame(&mut self, style: &Styler, is_header: bool) -> Result<()> {
        let frame = ContainerState::child_of(self.stack.peek(), style.clone()).with_header(is_header);
        self.stack.push(frame, &self.canvas)
    }

    fn enter_row(&mut self) -> Result<()> {
        let table = self.table.as_mut().ok_or(Error::NoActiveTable)?;
        table.start_row();
        self.canvas.ln(None);
        let is_header = self.stack.peek().is_header;
        let style = if is_header {
            self.theme.table_header.clone()
        } else {
            self.theme.table_body.clone()
        };
        self.push_table_frame(&style, is_header)
    }

    fn enter_cell(&mut self, is_header: bool) -> Result<()> {
        if self.table.is_none() {
            return Err(Error::NoActiveTable);
        }
        let style = if is_header {
            self.theme.table_header.clone()
        } else {
            self.theme.table_body.clone()
        };
        self.canvas.set_styler(&style);
        let frame = ContainerState::child_of(self.stack.peek(), style)
            .with_header(is_header)
            .buffering();
        self.stack.push(frame, &self.canvas)
    }

    fn leave_cell(&mut self) -> Result<()> {
        let frame = self.stack.pop(&mut self.canvas)?;
        let width = self.table.as_mut().ok_or(Error::NoActiveTable)?.next_width();
        let style = frame.cell_style.unwrap_or(frame.style);
        let text = icons::flatten_icons(
            frame.cell_buffer.as_deref().unwrap_or(""),
            self.options.icon_mode,
        );

        self.canvas.set_styler(&style);
        let cell = if frame.is_header {
            let height = self.canvas.font_size() + style.spacing;
            Cell::new(width, height, &text).border(Border::BOTTOM)
        } else {
            Cell::new(width, style.size + style.spacing, &text)
        };
        log::debug!("Table cell width {width}, height {}", cell.height);
        self.canvas.cell(&cell.align(Align::Left));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown_parser::parse_source;
    use crate::svg_canvas::{PageGeometry, SvgCanvas};

    fn render_with(source: &str, options: RenderOptions) -> (Renderer<SvgCanvas>, RenderReport) {
        let mut doc = parse_source(source);
        let canvas = SvgCanvas::new(PageGeometry::a4());
        let mut renderer = Renderer::with_theme(canvas, options, Theme::light());
        let report = renderer.render(&mut doc).unwrap();
        (renderer, report)
    }

    fn render(source: &str) -> (Renderer<SvgCanvas>, RenderReport) {
        render_with(source, RenderOptions::default())
    }

    #[test]
    fn test_stack_returns_to_root() {
        let (renderer, report) = render(
            "# Title\n\n> quote with *em*\n\n- a\n  1. b\n     - c\n\n| A | B |\n|---|---|\n| [x](y) | **z** |\n",
        );
        assert_eq!(renderer.depth(), 1);
        assert!(report.max_depth > 3);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_em_defaults_to_measured_m() {
        let (mut renderer, _) = render("text");
        let measured = {
            let canvas = &mut renderer.canvas;
            canvas.set_styler(&Theme::light().normal);
            canvas.string_width("m")
        };
        assert_eq!(renderer.em(), measured);
    }

    #[test]
    fn test_missing_image_is_a_diagnostic() {
        let (renderer, report) = render("before\n\n![alt](does-not-exist.png)\n\nafter\n");
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(
            report.diagnostics[0].error,
            Error::ResourceNotFound(_)
        ));
        assert_eq!(report.diagnostics[0].element, "Image");
        let svg = renderer.into_canvas().finish();
        assert!(svg.contains("after"));
    }

    #[test]
    fn test_missing_syntax_definition_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            syntax_dir: Some(dir.path().to_path_buf()),
            ..RenderOptions::default()
        };
        let (renderer, report) = render_with("```cobol\nDISPLAY 'HI'.\n```\n", options);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(renderer.into_canvas().finish().contains("DISPLAY"));
    }

    #[test]
    fn test_unknown_emoji_without_asset() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            emoji_dir: dir.path().to_path_buf(),
            remove_unknown_icons: false,
            ..RenderOptions::default()
        };
        let (renderer, report) = render_with("Go 🚀\n", options);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(renderer.into_canvas().finish().contains("[launch]"));
    }

    #[test]
    fn test_emoji_asset_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1f680.png"), b"png").unwrap();
        let options = RenderOptions {
            emoji_dir: dir.path().to_path_buf(),
            ..RenderOptions::default()
        };
        let (renderer, report) = render_with("Go 🚀\n", options);
        assert!(report.diagnostics.is_empty());
        // Asset bytes are embedded: "png" in base64
        assert!(renderer.into_canvas().finish().contains(";base64,cG5n\""));
    }

    #[test]
    fn test_horizontal_rule_modes() {
        let (renderer, _) = render("a\n\n---\n\nb\n");
        assert_eq!(renderer.canvas().page_count(), 2);

        let options = RenderOptions {
            hr_page_break: false,
            ..RenderOptions::default()
        };
        let (renderer, _) = render_with("a\n\n---\n\nb\n", options);
        assert_eq!(renderer.canvas().page_count(), 1);
        assert!(renderer.canvas().page(0).unwrap().contains("<line"));
    }

    #[test]
    fn test_anchor_links_are_plain_text_by_default() {
        let (renderer, _) = render("[top](#top) and [site](https://example.com)\n");
        let page = renderer.canvas().page(0).unwrap();
        assert!(!page.contains("href=\"#top\""));
        assert!(page.contains("href=\"https://example.com\""));

        let options = RenderOptions {
            anchor_links: true,
            ..RenderOptions::default()
        };
        let (renderer, _) = render_with("[top](#top)\n", options);
        assert!(renderer.canvas().page(0).unwrap().contains("href=\"#top\""));
    }

    #[test]
    fn test_relative_links_use_base_url() {
        let options = RenderOptions {
            base_url: Some("https://example.com/docs".into()),
            ..RenderOptions::default()
        };
        let (renderer, _) = render_with("[next](./next.md)\n", options);
        assert!(
            renderer
                .canvas()
                .page(0)
                .unwrap()
                .contains("href=\"https://example.com/docs/next.md\"")
        );
    }

    #[test]
    fn test_keep_numbering_continues_across_headings() {
        let source = "1. a\n2. b\n\n# Next\n\n1. c\n";
        let (renderer, _) = render_with(
            source,
            RenderOptions {
                keep_numbering: true,
                ..RenderOptions::default()
            },
        );
        assert!(renderer.canvas().page(0).unwrap().contains(">3.<"));

        let (renderer, _) = render(source);
        let page = renderer.canvas().page(0).unwrap();
        assert!(!page.contains(">3.<"));
        assert_eq!(page.matches(">1.<").count(), 2);
    }

    #[test]
    fn test_generated_toc_links_headings() {
        let options = RenderOptions {
            generate_toc: true,
            ..RenderOptions::default()
        };
        let (renderer, _) = render_with("# Intro\n\ntext\n", options);
        let canvas = renderer.canvas();
        assert!(canvas.page(0).unwrap().contains("href=\"#link-1\""));
        assert!(canvas.page(1).unwrap().contains("id=\"link-1\""));
    }
}
