// Table of contents page

use crate::canvas::{Canvas, Cell, LinkId};
use crate::icons::{IconMode, flatten_icons};
use crate::markdown_ast::{Document, NodeId, NodeType};
use crate::theme::{Color, FontStyle, Theme};
use std::collections::HashMap;

const TITLE: &str = "Table of Contents";
const TITLE_SIZE: f64 = 24.0;
const ENTRY_SIZE: f64 = 12.0;
const ENTRY_COLOR: Color = Color::rgb(100, 149, 237);

#[derive(Clone, Debug, PartialEq)]
pub struct TocEntry {
    pub heading: NodeId,
    pub level: u8,
    pub title: String,
}

/// Headings of a document and the link targets pointing at them.
#[derive(Clone, Debug, Default)]
pub struct TableOfContents {
    entries: Vec<TocEntry>,
    links: HashMap<NodeId, LinkId>,
}

impl TableOfContents {
    pub fn collect(doc: &Document, mode: IconMode) -> Self {
        let entries = doc
            .descendants(doc.root())
            .into_iter()
            .filter_map(|id| match doc.kind(id) {
                NodeType::Heading { level } => Some(TocEntry {
                    heading: id,
                    level: *level,
                    title: flatten_icons(&doc.flatten_text(id).replace('\n', " "), mode),
                }),
                _ => None,
            })
            .collect();
        TableOfContents {
            entries,
            links: HashMap::new(),
        }
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Link target reserved for a heading by [`TableOfContents::render`].
    pub fn link_for(&self, heading: NodeId) -> Option<LinkId> {
        self.links.get(&heading).copied()
    }

    /// Draw the contents page and start a new page after it.
    pub fn render(&mut self, canvas: &mut dyn Canvas, theme: &Theme) {
        canvas.set_font(&theme.normal.font, FontStyle::bold(), TITLE_SIZE);
        canvas.set_text_color(theme.normal.text_color);
        canvas.cell(&Cell::new(40.0, 10.0, TITLE));
        canvas.ln(Some(30.0));

        canvas.set_font(&theme.normal.font, FontStyle::REGULAR, ENTRY_SIZE);
        canvas.set_text_color(ENTRY_COLOR);
        for entry in &self.entries {
            let link = canvas.add_link();
            self.links.insert(entry.heading, link);
            let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
            let line = format!("{indent} • {}", entry.title);
            canvas.write_link_id(8.0, &line, link);
            canvas.ln(Some(15.0));
        }
        log::debug!("Table of contents with {} entries", self.entries.len());
        canvas.add_page();
    }
}
