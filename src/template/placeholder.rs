//! `{{name}}` placeholder tokens.

use super::layout::PositionedLine;
use super::model::{ElementKind, TemplateElement};
use regex::Regex;
use std::sync::LazyLock;

/// A token is `{{`, one or more ASCII word characters, `}}`.
pub const PLACEHOLDER_PATTERN: &str = r"\{\{([A-Za-z0-9_]+)\}\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

static WHOLE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{([A-Za-z0-9_]+)\}\}$").expect("valid regex"));

pub(crate) fn placeholder_regex() -> &'static Regex {
    &PLACEHOLDER_RE
}

pub fn has_placeholder(text: &str) -> bool {
    PLACEHOLDER_RE.is_match(text)
}

/// Field name when `text` is exactly one token and nothing else.
pub fn whole_line_field(text: &str) -> Option<&str> {
    WHOLE_LINE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str())
}

/// Every token name in `text`, in order, duplicates included.
pub fn placeholder_names(text: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
}

/// Classifies a line. Lines with a token anywhere become placeholder elements,
/// but only a line that is a single bare token carries a `field_name`.
pub fn recognize(line: &PositionedLine) -> TemplateElement {
    let content = line.text.trim();
    let kind = if has_placeholder(content) {
        ElementKind::Placeholder
    } else {
        ElementKind::Text
    };
    TemplateElement {
        kind,
        content: content.to_string(),
        field_name: whole_line_field(content).map(str::to_string),
        x: line.x,
        y: line.y,
        font: None,
        color: None,
    }
}
