//! Per-page text for extraction.
//!
//! The default strategy only knows the whole-document text and gives each page
//! an equal share of its characters. That is an approximation: tokens near a
//! share boundary can be split across pages.

use crate::engine::SourceDocument;
use tracing::warn;

/// Text for each page of a source document, plus fail-soft warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTexts {
    pub texts: Vec<String>,
    pub warnings: Vec<String>,
}

pub trait PageTextSource {
    /// Never fails: unavailable text degrades to empty pages.
    fn page_texts(&self, document: &dyn SourceDocument) -> PageTexts;
}

/// Splits the full-document text proportionally by character count.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProportionalText;

/// Asks the engine for each page's own text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerPageText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSourceKind {
    #[default]
    Proportional,
    PerPage,
}

impl TextSourceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "proportional" => Some(TextSourceKind::Proportional),
            "per_page" => Some(TextSourceKind::PerPage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextSourceKind::Proportional => "proportional",
            TextSourceKind::PerPage => "per_page",
        }
    }

    pub fn strategy(&self) -> &'static dyn PageTextSource {
        match self {
            TextSourceKind::Proportional => &ProportionalText,
            TextSourceKind::PerPage => &PerPageText,
        }
    }
}

impl PageTextSource for ProportionalText {
    fn page_texts(&self, document: &dyn SourceDocument) -> PageTexts {
        let page_count = document.page_count();
        match document.full_text() {
            Ok(text) => PageTexts {
                texts: apportion(&text, page_count),
                warnings: Vec::new(),
            },
            Err(err) => {
                warn!(error = %err, "text extraction unavailable; pages left empty");
                PageTexts {
                    texts: vec![String::new(); page_count],
                    warnings: vec![format!("text extraction unavailable: {err}")],
                }
            }
        }
    }
}

impl PageTextSource for PerPageText {
    fn page_texts(&self, document: &dyn SourceDocument) -> PageTexts {
        let mut out = PageTexts::default();
        for index in 0..document.page_count() {
            match document.page_text(index) {
                Ok(text) => out.texts.push(text.trim().to_string()),
                Err(err) => {
                    warn!(page = index + 1, error = %err, "page text unavailable");
                    out.warnings
                        .push(format!("page {}: text extraction unavailable: {err}", index + 1));
                    out.texts.push(String::new());
                }
            }
        }
        out
    }
}

/// Page `i` of `page_count` gets characters `[i*L/N, (i+1)*L/N)`, trimmed.
pub fn apportion(full_text: &str, page_count: usize) -> Vec<String> {
    if page_count == 0 {
        return Vec::new();
    }

    // Byte offset of every char boundary, so shares never split a character.
    let boundaries: Vec<usize> = full_text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(full_text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    (0..page_count)
        .map(|index| {
            let start = boundaries[index * char_count / page_count];
            let end = boundaries[(index + 1) * char_count / page_count];
            full_text[start..end].trim().to_string()
        })
        .collect()
}
