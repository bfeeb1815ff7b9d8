// Table column widths and the per-table cell cursor

use crate::canvas::Canvas;
use crate::icons::{IconMode, flatten_icons};
use crate::markdown_ast::{Document, NodeId, NodeType};
use crate::markers::substitute_checkboxes;
use crate::theme::Styler;
use std::collections::HashMap;

/// Text of a table cell as it will be drawn.
pub fn cell_text(raw: &str, mode: IconMode) -> String {
    flatten_icons(&substitute_checkboxes(&raw.replace('\n', " ")), mode)
}

/// Column widths of every table in a document, keyed by table node.
///
/// Widths come from the header row: each column is as wide as its header
/// text in the header style plus one em.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnWidths {
    tables: HashMap<NodeId, Vec<f64>>,
}

impl ColumnWidths {
    pub fn compute(
        doc: &Document,
        canvas: &mut dyn Canvas,
        header_style: &Styler,
        em: f64,
        mode: IconMode,
    ) -> Self {
        let mut tables = HashMap::new();
        canvas.set_styler(header_style);

        for table in doc.descendants(doc.root()) {
            if !matches!(doc.kind(table), NodeType::Table) {
                continue;
            }
            let widths = header_cells(doc, table)
                .into_iter()
                .map(|cell| {
                    let text = cell_text(&doc.flatten_text(cell), mode);
                    canvas.string_width(&text) + em
                })
                .collect::<Vec<f64>>();
            log::debug!("Table {table}: column widths {widths:?}");
            tables.insert(table, widths);
        }
        ColumnWidths { tables }
    }

    pub fn get(&self, table: NodeId) -> Option<&[f64]> {
        self.tables.get(&table).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn header_cells(doc: &Document, table: NodeId) -> Vec<NodeId> {
    let Some(head) = doc
        .children(table)
        .iter()
        .copied()
        .find(|&c| matches!(doc.kind(c), NodeType::TableHead))
    else {
        return Vec::new();
    };
    doc.descendants(head)
        .into_iter()
        .filter(|&id| matches!(doc.kind(id), NodeType::TableCell { .. }))
        .collect()
}

/// Layout of the table currently being drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct TableLayout {
    pub table: NodeId,
    pub widths: Vec<f64>,
    pub cell_index: usize,
}

impl TableLayout {
    pub fn new(table: NodeId, widths: Vec<f64>) -> Self {
        TableLayout {
            table,
            widths,
            cell_index: 0,
        }
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
    }

    /// Width of the next cell in the row; columns past the header row get 0,
    /// which extends the cell to the right margin.
    pub fn next_width(&mut self) -> f64 {
        let width = self.widths.get(self.cell_index).copied().unwrap_or(0.0);
        self.cell_index += 1;
        width
    }

    pub fn total_width(&self) -> f64 {
        self.widths.iter().sum()
    }
}
