use crate::input::load_template;
use crate::template::placeholder::placeholder_names;
use crate::template::{ElementKind, Template, TemplateElement};
use crate::tools::error_result;
use serde_json::{Value, json};
use std::collections::BTreeSet;

pub fn call(args: &Value) -> Value {
    let template = match load_template(args) {
        Ok(template) => template,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let structured = describe(&template);
    let summary = format!(
        "version: {}, pages: {}, fields: {}",
        template.version.as_str(),
        template.pages.len(),
        template.fields.len()
    );

    json!({
        "content": [{"type": "text", "text": summary}],
        "structuredContent": structured,
        "isError": false
    })
}

fn describe(template: &Template) -> Value {
    let mut referenced = BTreeSet::new();

    let pages: Vec<Value> = template
        .pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let placeholders = page
                .elements
                .iter()
                .filter(|element| element.kind == ElementKind::Placeholder)
                .count();
            for element in &page.elements {
                referenced.extend(element_tokens(element));
            }
            json!({
                "index": index + 1,
                "width": page.width,
                "height": page.height,
                "elements": page.elements.len(),
                "placeholders": placeholders
            })
        })
        .collect();

    let declared: BTreeSet<&str> = template
        .fields
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    let undeclared: Vec<&str> = referenced
        .iter()
        .map(String::as_str)
        .filter(|name| !declared.contains(name))
        .collect();
    let unused: Vec<&str> = template
        .fields
        .iter()
        .map(|field| field.name.as_str())
        .filter(|name| !referenced.contains(*name))
        .collect();

    let fields: Vec<Value> = template
        .fields
        .iter()
        .map(|field| {
            json!({
                "name": field.name,
                "default_value": field.default_value,
                "pages": field.pages
            })
        })
        .collect();

    json!({
        "version": template.version.as_str(),
        "name": template.metadata.name,
        "description": template.metadata.description,
        "created_at": template.metadata.created_at.to_rfc3339(),
        "source_page_count": template.metadata.source_page_count,
        "page_count": template.pages.len(),
        "pages": pages,
        "fields": fields,
        "undeclared_fields": undeclared,
        "unused_fields": unused,
        "missing_field_behavior": template
            .defaults
            .as_ref()
            .and_then(|defaults| defaults.missing_field_behavior)
            .map(|policy| policy.as_str())
    })
}

/// Token names in an element. Text elements are rendered verbatim, so only
/// placeholder elements count.
fn element_tokens(element: &TemplateElement) -> Vec<String> {
    match element.kind {
        ElementKind::Placeholder => placeholder_names(&element.content)
            .map(str::to_string)
            .collect(),
        ElementKind::Text => Vec::new(),
    }
}
