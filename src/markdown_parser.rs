// Markdown Parser - converts pulldown-cmark events into the document arena
use crate::markdown_ast::*;
use crate::markers::ensure_list_spacing;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Parse raw Markdown source, applying the list spacing fixup first
pub fn parse_source(source: &str) -> Document {
    parse_markdown(&ensure_list_spacing(source))
}

/// Parse markdown text into an AST
pub fn parse_markdown(text: &str) -> Document {
    let mut doc = Document::new();

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    let parser = Parser::new_ext(text, options);

    // Open container nodes; the root is never popped
    let mut stack: Vec<NodeId> = vec![doc.root()];

    for event in parser {
        let top = *stack.last().unwrap_or(&0);
        match event {
            Event::Start(tag) => open_tag(&mut doc, &mut stack, top, tag),

            Event::End(tag_end) => close_tag(&doc, &mut stack, tag_end),

            Event::Text(content) => append_text(&mut doc, top, &content),

            Event::SoftBreak => append_text(&mut doc, top, "\n"),

            Event::Html(html) => match &mut doc.node_mut(top).node_type {
                NodeType::HtmlBlock { literal } => literal.push_str(&html),
                _ => {
                    doc.append(top, NodeType::Other("RawHTML".to_string()));
                }
            },

            Event::InlineHtml(_) => {
                doc.append(top, NodeType::Other("RawHTML".to_string()));
            }

            Event::Code(content) if matches!(doc.kind(top), NodeType::Image { .. }) => {
                append_text(&mut doc, top, &content)
            }

            Event::Code(content) => {
                doc.append(
                    top,
                    NodeType::Code {
                        literal: content.to_string(),
                    },
                );
            }

            Event::HardBreak => {
                doc.append(top, NodeType::HardBreak);
            }

            Event::Rule => {
                doc.append(top, NodeType::HorizontalRule);
            }

            Event::FootnoteReference(label) => {
                doc.append(top, NodeType::Other(format!("FootnoteReference({label})")));
            }

            // Task lists and math are not enabled
            Event::TaskListMarker(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    mark_list_transitions(&mut doc);
    doc
}

fn open_tag(doc: &mut Document, stack: &mut Vec<NodeId>, top: NodeId, tag: Tag) {
    // Markup inside alt text only contributes its text
    if matches!(doc.kind(top), NodeType::Image { .. }) {
        stack.push(top);
        return;
    }
    match tag {
        Tag::TableHead => {
            // Header cells get an explicit row so head and body rows look alike
            let head = doc.append(top, NodeType::TableHead);
            let row = doc.append(head, NodeType::TableRow);
            stack.push(head);
            stack.push(row);
        }
        Tag::TableRow if matches!(doc.kind(top), NodeType::Table) => {
            let body = doc.append(top, NodeType::TableBody);
            let row = doc.append(body, NodeType::TableRow);
            stack.push(body);
            stack.push(row);
        }
        Tag::TableCell => {
            let is_header = doc
                .ancestor(top, |k| matches!(k, NodeType::TableHead))
                .is_some()
                || matches!(doc.kind(top), NodeType::TableHead);
            let cell = doc.append(top, NodeType::TableCell { is_header });
            stack.push(cell);
        }
        other => {
            let node_type = node_type_for(other);
            let id = doc.append(top, node_type);
            stack.push(id);
        }
    }
}

fn close_tag(doc: &Document, stack: &mut Vec<NodeId>, tag_end: TagEnd) {
    let pops = match tag_end {
        TagEnd::TableHead => 2,
        TagEnd::Table => {
            let top = *stack.last().unwrap_or(&0);
            if matches!(doc.kind(top), NodeType::TableBody) { 2 } else { 1 }
        }
        _ => 1,
    };
    for _ in 0..pops {
        if stack.len() > 1 {
            stack.pop();
        }
    }
}

/// Map an opening tag to the node it creates
fn node_type_for(tag: Tag) -> NodeType {
    match tag {
        Tag::Paragraph => NodeType::Paragraph,

        Tag::Heading { level, .. } => NodeType::Heading {
            level: level as u8,
        },

        Tag::BlockQuote(_) => NodeType::BlockQuote,

        Tag::CodeBlock(kind) => NodeType::CodeBlock {
            info: match kind {
                CodeBlockKind::Indented => String::new(),
                CodeBlockKind::Fenced(info) => info.trim().to_string(),
            },
            literal: String::new(),
        },

        Tag::HtmlBlock => NodeType::HtmlBlock {
            literal: String::new(),
        },

        Tag::List(start_number) => match start_number {
            Some(start) => NodeType::List {
                kind: ListKind::Ordered,
                start,
            },
            None => NodeType::List {
                kind: ListKind::Unordered,
                start: 1,
            },
        },

        Tag::Item | Tag::DefinitionListTitle | Tag::DefinitionListDefinition => {
            NodeType::ListItem
        }

        Tag::DefinitionList => NodeType::List {
            kind: ListKind::Definition,
            start: 1,
        },

        Tag::Table(_) => NodeType::Table,
        Tag::TableHead => NodeType::TableHead,
        Tag::TableRow => NodeType::TableRow,
        Tag::TableCell => NodeType::TableCell { is_header: false },

        Tag::Emphasis => NodeType::Emphasis,
        Tag::Strong => NodeType::Strong,
        Tag::Strikethrough => NodeType::Strikethrough,

        Tag::Link { dest_url, title, .. } => NodeType::Link {
            destination: dest_url.to_string(),
            title: non_empty(title),
        },

        Tag::Image { dest_url, title, .. } => NodeType::Image {
            destination: dest_url.to_string(),
            title: non_empty(title),
            alt: String::new(),
        },

        Tag::FootnoteDefinition(_) => NodeType::Other("FootnoteDefinition".to_string()),
        Tag::MetadataBlock(_) => NodeType::Other("MetadataBlock".to_string()),
        Tag::Superscript => NodeType::Other("Superscript".to_string()),
        Tag::Subscript => NodeType::Other("Subscript".to_string()),
    }
}

fn non_empty(s: CowStr) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Add text below `parent`, merging into a preceding text sibling.
///
/// Text inside an image becomes its alt text, text inside a code block its
/// literal.
fn append_text(doc: &mut Document, parent: NodeId, content: &str) {
    match &mut doc.node_mut(parent).node_type {
        NodeType::Image { alt, .. } => {
            alt.push_str(content);
            return;
        }
        NodeType::CodeBlock { literal, .. } | NodeType::HtmlBlock { literal } => {
            literal.push_str(content);
            return;
        }
        _ => {}
    }

    if let Some(last) = doc.last_child(parent)
        && let NodeType::Text { literal } = &mut doc.node_mut(last).node_type
    {
        literal.push_str(content);
        return;
    }

    doc.append(
        parent,
        NodeType::Text {
            literal: content.to_string(),
        },
    );
}

/// Flag lists that directly follow a list of a different kind
fn mark_list_transitions(doc: &mut Document) {
    let lists: Vec<NodeId> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|&id| matches!(doc.kind(id), NodeType::List { .. }))
        .collect();

    for id in lists {
        let NodeType::List { kind, .. } = *doc.kind(id) else {
            continue;
        };
        let Some(prev) = doc.prev_sibling(id) else {
            continue;
        };
        if let NodeType::List { kind: prev_kind, .. } = *doc.kind(prev)
            && prev_kind != kind
        {
            doc.node_mut(id)
                .attributes
                .insert(LIST_TRANSITION_ATTR.to_string(), "true".to_string());
        }
    }
}
