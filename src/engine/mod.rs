//! Boundary with the document engine: loading source documents (geometry and
//! text) and building new documents from draw instructions.

pub mod pdf;

pub use pdf::PdfEngine;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("source document unreadable: {0}")]
    Load(String),
    #[error("source document has no pages")]
    NoPages,
    #[error("text extraction failed: {0}")]
    Text(String),
    #[error("page index {0} out of range")]
    PageOutOfRange(usize),
    #[error("document build failed: {0}")]
    Build(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// One text run placed at an absolute position, origin bottom-left.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawText {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub face: FontFace,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageDraw {
    pub size: PageSize,
    pub commands: Vec<DrawText>,
}

/// A parsed source document.
pub trait SourceDocument {
    fn page_sizes(&self) -> &[PageSize];

    fn page_count(&self) -> usize {
        self.page_sizes().len()
    }

    /// Best-effort text of the whole document.
    fn full_text(&self) -> Result<String, EngineError>;

    /// Text of a single page, by 0-based index.
    fn page_text(&self, index: usize) -> Result<String, EngineError>;
}

pub trait DocumentEngine: Send + Sync {
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn SourceDocument>, EngineError>;

    /// Builds a document with one page per entry, in order.
    fn build(&self, pages: &[PageDraw]) -> Result<Vec<u8>, EngineError>;
}
