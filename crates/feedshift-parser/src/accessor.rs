use crate::sanitize::clean;
use crate::tree::Element;

/// Cleaned text of the first `tag` child of `parent`.
///
/// Returns `""` when the child is missing or carries no text.
pub fn child_text(parent: &Element, tag: &str) -> String {
    parent
        .first_child(tag)
        .and_then(|child| child.text.as_deref())
        .filter(|text| !text.is_empty())
        .map(clean)
        .unwrap_or_default()
}
