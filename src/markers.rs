// Checkbox and list marker normalisation
// Inline checkbox substitution and the source fixup that keeps lists from
// being swallowed by a preceding forced line break

use crate::markdown_ast::{Document, NodeId, NodeType};
use regex::Regex;
use std::sync::LazyLock;

pub const UNCHECKED_BOX: &str = "☐";
pub const CHECKED_BOX: &str = "☑";

/// ASCII spellings used when the canvas font has no checkbox glyphs
pub const UNCHECKED_ASCII: &str = "[ ]";
pub const CHECKED_ASCII: &str = "[x]";

/// A list marker line that starts in column 0: bullet, ordered number or a
/// bare checkbox.
static MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+][ \t]|\d{1,9}[.)](?:[ \t]|$)|\[[ xX]\][ \t])").expect("valid regex")
});

/// Replace literal `[ ]`, `[x]` and `[X]` with checkbox symbols.
pub fn substitute_checkboxes(text: &str) -> String {
    text.replace("[ ]", UNCHECKED_BOX)
        .replace("[x]", CHECKED_BOX)
        .replace("[X]", CHECKED_BOX)
}

/// Insert a blank line between a line ending in a forced break and a list
/// marker line that follows it directly.
///
/// Indented marker lines are nested items and are never touched, and
/// neither is anything inside a fenced code block.
pub fn ensure_list_spacing(source: &str) -> String {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut out = String::with_capacity(source.len() + 8);
    let mut fence: Option<Fence> = None;

    for (i, line) in lines.iter().enumerate() {
        out.push_str(line);
        match (fence, Fence::open(line)) {
            (None, Some(opened)) => {
                fence = Some(opened);
                continue;
            }
            (Some(open), _) => {
                if open.is_closed_by(line) {
                    fence = None;
                }
                continue;
            }
            (None, None) => {}
        }
        let Some(next) = lines.get(i + 1) else {
            continue;
        };
        if ends_with_forced_break(line) && MARKER_LINE.is_match(next) {
            out.push('\n');
        }
    }
    out
}

/// An open ``` or ~~~ code fence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Fence opened by `line`, allowing up to three spaces of indentation.
    fn open(line: &str) -> Option<Fence> {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return None;
        }
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        if len < 3 {
            return None;
        }
        // A backtick fence's info string may not contain backticks
        if marker == '`' && trimmed[len..].contains('`') {
            return None;
        }
        Some(Fence { marker, len })
    }

    fn is_closed_by(self, line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return false;
        }
        let run = trimmed.chars().take_while(|&c| c == self.marker).count();
        run >= self.len && trimmed[run..].trim().is_empty()
    }
}

fn ends_with_forced_break(line: &str) -> bool {
    let Some(content) = line.strip_suffix('\n') else {
        return false;
    };
    let content = content.strip_suffix('\r').unwrap_or(content);
    content.ends_with("  ") && !content.trim().is_empty()
}

/// Which checkbox a list item started with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkbox {
    Unchecked,
    Checked,
}

impl Checkbox {
    pub fn symbol(self) -> &'static str {
        match self {
            Checkbox::Unchecked => UNCHECKED_BOX,
            Checkbox::Checked => CHECKED_BOX,
        }
    }

    pub fn ascii(self) -> &'static str {
        match self {
            Checkbox::Unchecked => UNCHECKED_ASCII,
            Checkbox::Checked => CHECKED_ASCII,
        }
    }
}

/// Remove a leading checkbox marker from the first text of a list item.
///
/// Leading whitespace before the marker is kept, whitespace after it is
/// dropped. Returns the marker that was found.
pub fn strip_checkbox_marker(doc: &mut Document, item: NodeId) -> Option<Checkbox> {
    let text_node = doc
        .descendants(item)
        .into_iter()
        .find(|&id| matches!(doc.kind(id), NodeType::Text { .. }))?;

    let NodeType::Text { literal } = &mut doc.node_mut(text_node).node_type else {
        return None;
    };

    let trimmed = literal.trim_start_matches([' ', '\t']);
    let leading = literal.len() - trimmed.len();
    let checkbox = match trimmed.get(..3)? {
        "[ ]" => Checkbox::Unchecked,
        "[x]" | "[X]" => Checkbox::Checked,
        _ => return None,
    };
    let remainder = trimmed[3..].trim_start_matches([' ', '\t']);
    *literal = format!("{}{}", &literal[..leading], remainder);
    Some(checkbox)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown_parser::parse_markdown;

    #[test]
    fn test_substitute_checkboxes() {
        assert_eq!(substitute_checkboxes("[ ] todo"), "☐ todo");
        assert_eq!(substitute_checkboxes("a [x] b [X] c"), "a ☑ b ☑ c");
        assert_eq!(substitute_checkboxes("[y] [] plain"), "[y] [] plain");
    }

    #[test]
    fn test_substitution_is_idempotent() {
        for input in ["[ ] [x] [X]", "no markers", "[[ ]]", "x [x]x"] {
            let once = substitute_checkboxes(input);
            assert_eq!(substitute_checkboxes(&once), once);
        }
    }

    #[test]
    fn test_list_spacing_after_forced_break() {
        assert_eq!(
            ensure_list_spacing("**Bold**  \n- one\n- two\n"),
            "**Bold**  \n\n- one\n- two\n"
        );
        assert_eq!(
            ensure_list_spacing("**Block**  \n- [ ] one\n- [ ] two\n"),
            "**Block**  \n\n- [ ] one\n- [ ] two\n"
        );
        assert_eq!(
            ensure_list_spacing("Intro line  \n1. First\n2. Second\n"),
            "Intro line  \n\n1. First\n2. Second\n"
        );
    }

    #[test]
    fn test_list_spacing_noop_cases() {
        let already = "**Bold**  \n\n- one\n";
        assert_eq!(ensure_list_spacing(already), already);

        let nested = "1. Parent  \n   - Child\n";
        assert_eq!(ensure_list_spacing(nested), nested);

        let no_break = "Text\n- one\n";
        assert_eq!(ensure_list_spacing(no_break), no_break);

        let not_marker = "Line  \nNext line\n";
        assert_eq!(ensure_list_spacing(not_marker), not_marker);
    }

    #[test]
    fn test_list_spacing_skips_fenced_code() {
        let fenced = "```\nfoo  \n- bar\n```\n";
        assert_eq!(ensure_list_spacing(fenced), fenced);

        let tilde = "~~~~ text\nfoo  \n1. bar\n~~~\n~~~~\n";
        assert_eq!(ensure_list_spacing(tilde), tilde);

        // Spacing resumes after the closing fence
        assert_eq!(
            ensure_list_spacing("```\ncode\n```\nText  \n- one\n"),
            "```\ncode\n```\nText  \n\n- one\n"
        );
    }

    #[test]
    fn test_list_spacing_is_idempotent() {
        let once = ensure_list_spacing("A  \n- b\nC  \n3. d\n");
        assert_eq!(ensure_list_spacing(&once), once);
    }

    fn first_item(doc: &Document) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&id| matches!(doc.kind(id), NodeType::ListItem))
            .expect("list item")
    }

    #[test]
    fn test_strip_checkbox_marker() {
        let cases = [
            ("- [ ] Task\n", Some(Checkbox::Unchecked), "Task"),
            ("- [x] Done\n", Some(Checkbox::Checked), "Done"),
            ("- [X] Done\n", Some(Checkbox::Checked), "Done"),
            ("- Plain item\n", None, "Plain item"),
        ];
        for (markdown, expected, text) in cases {
            let mut doc = parse_markdown(markdown);
            let item = first_item(&doc);
            assert_eq!(strip_checkbox_marker(&mut doc, item), expected, "{markdown:?}");
            assert_eq!(doc.flatten_text(item), text, "{markdown:?}");
        }
    }
}
