//! Plain-text cleanup for vendor field values.

use once_cell::sync::Lazy;
use regex::Regex;

static CDATA_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("CDATA pattern is valid"));
static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<.*?>").expect("markup pattern is valid"));

/// Unwraps CDATA sections, drops any `<...>` span and trims the result.
///
/// Applying it to its own output is a no-op.
pub fn clean(raw: &str) -> String {
    let unwrapped = CDATA_SECTION.replace_all(raw, "$1");
    let stripped = MARKUP_TAG.replace_all(&unwrapped, "");
    stripped.trim().to_string()
}

/// [`clean`] for values that may be missing; a missing value becomes `""`.
pub fn clean_text(raw: Option<&str>) -> String {
    raw.map(clean).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_value_is_empty() {
        assert_eq!(clean_text(None), "");
        assert_eq!(clean_text(Some("   ")), "");
    }

    #[test]
    fn unwraps_cdata_across_lines() {
        assert_eq!(clean("<![CDATA[first\nsecond]]>"), "first\nsecond");
        assert_eq!(clean("<![CDATA[a]]> and <![CDATA[b]]>"), "a and b");
    }

    #[test]
    fn strips_markup_spanning_lines() {
        assert_eq!(
            clean("  <p class=\"x\">Cotton <b>blend</b></p>\n<br\n/> "),
            "Cotton blend"
        );
    }

    #[test]
    fn markup_inside_cdata_is_removed() {
        assert_eq!(
            clean("<![CDATA[<ul><li>Soft</li><li>Warm</li></ul>]]>"),
            "SoftWarm"
        );
    }

    #[test]
    fn lone_angle_brackets_survive() {
        assert_eq!(clean("size < 40"), "size < 40");
        assert_eq!(clean("a > b"), "a > b");
    }

    proptest! {
        #[test]
        fn cleaning_is_idempotent(raw in r"[ a-z<>!\[\]CDAT/\n]{0,40}") {
            let once = clean(&raw);
            prop_assert_eq!(clean(&once), once.clone());
        }
    }
}
