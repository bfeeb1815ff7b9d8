// Bullet and indentation geometry for list items

use crate::canvas::Canvas;
use crate::container::ContainerState;
use crate::markdown_ast::ListKind;
use crate::markers::Checkbox;
use crate::theme::Styler;

pub const BULLET: &str = "•";
/// Last resort when the font has neither the bullet nor checkbox glyphs.
pub const FALLBACK_BULLET: &str = "-";

/// Space between the label and the item text, in em.
const LABEL_GAP_EM: f64 = 0.35;
/// Narrowest label box, in em.
const LABEL_MIN_WIDTH_EM: f64 = 1.2;
/// Share of a line advanced before a list nested in an item.
const NESTED_SPACING_FACTOR: f64 = 0.4;
/// Line spacing of text inside list items.
const ITEM_SPACING: f64 = 1.2;

/// Text drawn in front of an item before any fallback.
pub fn bullet_label(kind: Option<ListKind>, number: u64, checkbox: Option<Checkbox>) -> String {
    match (kind, checkbox) {
        (Some(ListKind::Ordered), _) => format!("{number}."),
        (Some(ListKind::Unordered), Some(checkbox)) => checkbox.symbol().to_string(),
        _ => BULLET.to_string(),
    }
}

/// A label the canvas can measure, with its width.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedBullet {
    pub label: String,
    pub width: f64,
}

/// Measure a label, falling back to ASCII checkboxes and then a dash when
/// the current font cannot draw it.
pub fn resolve_bullet(
    canvas: &mut dyn Canvas,
    label: String,
    checkbox: Option<Checkbox>,
) -> ResolvedBullet {
    let mut label = label;
    let mut width = canvas.string_width(&label);

    if width == 0.0
        && let Some(checkbox) = checkbox
    {
        log::debug!(
            "Checkbox glyph {:?} unavailable, using {:?}",
            label,
            checkbox.ascii()
        );
        label = checkbox.ascii().to_string();
        width = canvas.string_width(&label);
    }
    if width == 0.0 {
        log::debug!("Bullet glyph {label:?} unavailable, using {FALLBACK_BULLET:?}");
        label = FALLBACK_BULLET.to_string();
        width = canvas.string_width(&label);
    }
    ResolvedBullet { label, width }
}

/// Distance from the item's left margin to its content.
pub fn item_indent(label_width: f64, em: f64) -> f64 {
    (label_width + LABEL_GAP_EM * em).max(LABEL_MIN_WIDTH_EM * em)
}

/// Left margin of a list opened inside `parent`.
pub fn list_left_margin(parent: &ContainerState, indent: f64) -> f64 {
    let base = if parent.content_left_margin == 0.0 {
        parent.left_margin
    } else {
        parent.content_left_margin
    };
    base + indent
}

/// Advance before a list nested inside another list.
pub fn nested_list_spacing(style: &Styler) -> f64 {
    style.line_height() * NESTED_SPACING_FACTOR
}

/// Style for text inside list items: normal text, tighter lines.
pub fn item_style(normal: &Styler) -> Styler {
    Styler {
        spacing: ITEM_SPACING,
        ..normal.clone()
    }
}

/// Line height of the break written before each item.
pub fn item_break_height(item_style: &Styler) -> f64 {
    item_style.size - 2.0
}
