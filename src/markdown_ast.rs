// Markdown Abstract Syntax Tree
// Represents the parsed structure of a Markdown document as an arena of
// nodes with parent, child and sibling links

use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for AST nodes (index into the document arena)
pub type NodeId = usize;

/// Attribute set on a list whose previous sibling is a list of another kind
pub const LIST_TRANSITION_ATTR: &str = "data-list-transition";

/// Kind of list a `List` node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
    Definition,
}

/// Types of Markdown nodes
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// Root document node
    Document,

    /// Block-level elements
    Paragraph,
    Heading {
        level: u8,
    }, // 1-6
    CodeBlock {
        info: String,
        literal: String,
    },
    BlockQuote,
    List {
        kind: ListKind,
        start: u64,
    },
    ListItem,
    HorizontalRule,
    HtmlBlock {
        literal: String,
    },
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell {
        is_header: bool,
    },

    /// Inline elements
    Text {
        literal: String,
    },
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        destination: String,
        title: Option<String>,
    },
    Image {
        destination: String,
        title: Option<String>,
        alt: String,
    },
    Code {
        literal: String,
    },
    HardBreak,

    /// Anything the renderer has no handler for (footnotes, math, inline HTML)
    Other(String),
}

impl NodeType {
    /// Short name used in traces and diagnostics
    pub fn name(&self) -> &str {
        match self {
            NodeType::Document => "Document",
            NodeType::Paragraph => "Paragraph",
            NodeType::Heading { .. } => "Heading",
            NodeType::CodeBlock { .. } => "CodeBlock",
            NodeType::BlockQuote => "BlockQuote",
            NodeType::List { .. } => "List",
            NodeType::ListItem => "ListItem",
            NodeType::HorizontalRule => "HorizontalRule",
            NodeType::HtmlBlock { .. } => "HTMLBlock",
            NodeType::Table => "Table",
            NodeType::TableHead => "TableHead",
            NodeType::TableBody => "TableBody",
            NodeType::TableRow => "TableRow",
            NodeType::TableCell { .. } => "TableCell",
            NodeType::Text { .. } => "Text",
            NodeType::Emphasis => "Emph",
            NodeType::Strong => "Strong",
            NodeType::Strikethrough => "Del",
            NodeType::Link { .. } => "Link",
            NodeType::Image { .. } => "Image",
            NodeType::Code { .. } => "Code",
            NodeType::HardBreak => "Hardbreak",
            NodeType::Other(name) => name,
        }
    }

    /// Returns true if this node can have children
    pub fn can_have_children(&self) -> bool {
        !matches!(
            self,
            NodeType::Text { .. }
                | NodeType::Code { .. }
                | NodeType::CodeBlock { .. }
                | NodeType::HtmlBlock { .. }
                | NodeType::HorizontalRule
                | NodeType::HardBreak
                | NodeType::Image { .. }
        )
    }
}

/// An AST node representing an element in the document tree
#[derive(Debug, Clone)]
pub struct ASTNode {
    /// Unique identifier for this node
    pub id: NodeId,

    /// The type and data of this node
    pub node_type: NodeType,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// Child node IDs in document order
    pub children: Vec<NodeId>,

    /// Out-of-band hints for the renderer
    pub attributes: BTreeMap<String, String>,
}

impl ASTNode {
    fn new(id: NodeId, node_type: NodeType, parent: Option<NodeId>) -> Self {
        ASTNode {
            id,
            node_type,
            parent,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// The complete document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<ASTNode>,
}

impl Document {
    /// Create a new document holding only the root node
    pub fn new() -> Self {
        Document {
            nodes: vec![ASTNode::new(0, NodeType::Document, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Append a new node as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ASTNode::new(id, node_type, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &ASTNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ASTNode {
        &mut self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&ASTNode> {
        self.nodes.get(id)
    }

    pub fn kind(&self, id: NodeId) -> &NodeType {
        &self.nodes[id].node_type
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].children.last().copied()
    }

    fn sibling_index(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_index(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Nearest ancestor (excluding `id`) matching the predicate
    pub fn ancestor(&self, id: NodeId, pred: impl Fn(&NodeType) -> bool) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if pred(self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Pre-order enter/leave events starting at the root
    pub fn events(&self) -> Events<'_> {
        Events {
            doc: self,
            walker: Walker::new(self.root()),
        }
    }

    /// Get all text content below `id` (flattened)
    pub fn flatten_text(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.flatten_text_recursive(id, &mut result);
        result
    }

    fn flatten_text_recursive(&self, id: NodeId, buffer: &mut String) {
        match self.kind(id) {
            NodeType::Text { literal } | NodeType::Code { literal } => buffer.push_str(literal),
            NodeType::HardBreak => buffer.push('\n'),
            NodeType::Image { alt, .. } => buffer.push_str(alt),
            _ => {
                for &child in self.children(id) {
                    self.flatten_text_recursive(child, buffer);
                }
            }
        }
    }

    /// All node IDs in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.children(next).iter().rev());
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of a traversal: a node being entered or left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkEvent {
    pub node: NodeId,
    pub entering: bool,
}

impl WalkEvent {
    pub fn enter(node: NodeId) -> Self {
        WalkEvent {
            node,
            entering: true,
        }
    }

    pub fn leave(node: NodeId) -> Self {
        WalkEvent {
            node,
            entering: false,
        }
    }
}

/// Explicit-stack pre-order walker.
///
/// Children are looked up when their parent is entered, so the walker holds
/// no borrow of the document between steps and handlers may edit node data.
#[derive(Debug, Clone)]
pub struct Walker {
    pending: Vec<WalkEvent>,
}

impl Walker {
    pub fn new(root: NodeId) -> Self {
        Walker {
            pending: vec![WalkEvent::enter(root)],
        }
    }

    pub fn next(&mut self, doc: &Document) -> Option<WalkEvent> {
        let event = self.pending.pop()?;
        if event.entering {
            self.pending.push(WalkEvent::leave(event.node));
            for &child in doc.children(event.node).iter().rev() {
                self.pending.push(WalkEvent::enter(child));
            }
        }
        Some(event)
    }
}

/// Borrowing iterator over walk events
pub struct Events<'a> {
    doc: &'a Document,
    walker: Walker,
}

impl Iterator for Events<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        self.walker.next(self.doc)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_recursive(f, self.root(), 0)
    }
}

impl Document {
    fn fmt_recursive(&self, f: &mut fmt::Formatter<'_>, id: NodeId, indent: usize) -> fmt::Result {
        write!(f, "{}", "  ".repeat(indent))?;
        match self.kind(id) {
            NodeType::Heading { level } => writeln!(f, "Heading(h{level})")?,
            NodeType::Text { literal } => writeln!(f, "Text: {literal:?}")?,
            NodeType::Code { literal } => writeln!(f, "Code: {literal:?}")?,
            NodeType::Link { destination, .. } => writeln!(f, "Link -> {destination:?}")?,
            NodeType::Image { destination, .. } => writeln!(f, "Image -> {destination:?}")?,
            NodeType::CodeBlock { info, .. } => writeln!(f, "CodeBlock({info:?})")?,
            NodeType::List { kind, start } => writeln!(f, "List({kind:?}, start={start})")?,
            NodeType::TableCell { is_header } => {
                writeln!(f, "TableCell{}", if *is_header { "(header)" } else { "" })?
            }
            other => writeln!(f, "{}", other.name())?,
        }
        for &child in self.children(id) {
            self.fmt_recursive(f, child, indent + 1)?;
        }
        Ok(())
    }
}
