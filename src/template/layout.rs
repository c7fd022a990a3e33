/// Left edge of every extracted line.
pub const LEFT_MARGIN: f64 = 40.0;
/// Distance from the top edge to the first line.
pub const TOP_MARGIN: f64 = 40.0;
pub const LINE_HEIGHT: f64 = 14.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Stacks the non-empty, trimmed lines of `page_text` from the top of a page
/// of height `page_height`. No wrapping, no horizontal layout.
pub fn layout_lines(page_text: &str, page_height: f64) -> Vec<PositionedLine> {
    page_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| PositionedLine {
            text: line.to_string(),
            x: LEFT_MARGIN,
            y: page_height - TOP_MARGIN - LINE_HEIGHT * index as f64,
        })
        .collect()
}
