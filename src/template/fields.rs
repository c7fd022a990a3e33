use super::model::TemplateField;
use super::placeholder::placeholder_names;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Collects every placeholder occurrence across pages, keyed by field name in
/// order of first appearance.
#[derive(Debug, Default)]
pub struct FieldAggregator {
    pages: IndexMap<String, BTreeSet<u32>>,
}

impl FieldAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records all tokens of `line` as occurring on 1-based `page_number`.
    pub fn scan_line(&mut self, page_number: u32, line: &str) {
        for name in placeholder_names(line) {
            self.pages
                .entry(name.to_string())
                .or_default()
                .insert(page_number);
        }
    }

    pub fn finish(self) -> Vec<TemplateField> {
        self.pages
            .into_iter()
            .map(|(name, pages)| TemplateField {
                name,
                default_value: String::new(),
                pages: pages.into_iter().collect(),
            })
            .collect()
    }
}
