use crate::engine::EngineError;

/// Failures of template extraction, validation and generation.
///
/// Structural variants are reported in validator order; the first violated
/// rule wins.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template is required and must be a JSON object")]
    Missing,
    #[error("unsupported template version: {0} (expected \"1.0\")")]
    UnsupportedVersion(String),
    #[error("template must have at least one page")]
    NoPages,
    #[error("template metadata is required")]
    MissingMetadata,
    #[error("metadata.sourcePageCount must be a number >= 1")]
    InvalidSourcePageCount,
    #[error("template fields must be an array")]
    InvalidFields,
    #[error("pages[{page}]: {rule}")]
    InvalidPage { page: usize, rule: &'static str },
    #[error("pages[{page}].elements[{element}]: invalid element type {found}")]
    InvalidElementType {
        page: usize,
        element: usize,
        found: String,
    },
    #[error("pages[{page}].elements[{element}]: {rule}")]
    InvalidElement {
        page: usize,
        element: usize,
        rule: &'static str,
    },
    #[error("malformed template: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
