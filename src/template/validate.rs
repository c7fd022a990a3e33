//! Structural checks run before generation.
//!
//! Both entry points are pure and fail fast on the first violated rule, in
//! this order: template present, version, pages, metadata, source page count,
//! fields, page geometry, element shape. Field/token consistency and
//! `sourcePageCount == pages.len()` are deliberately not checked.

use super::error::TemplateError;
use super::model::{Template, TemplateVersion};
use serde_json::{Map, Value};

/// Checks raw template JSON before it is deserialized.
pub fn validate_value(value: &Value) -> Result<(), TemplateError> {
    let Some(template) = value.as_object() else {
        return Err(TemplateError::Missing);
    };

    match template.get("version") {
        Some(Value::String(version)) if version == TemplateVersion::CURRENT.as_str() => {}
        Some(Value::String(version)) => {
            return Err(TemplateError::UnsupportedVersion(format!("{version:?}")));
        }
        Some(other) => return Err(TemplateError::UnsupportedVersion(other.to_string())),
        None => return Err(TemplateError::UnsupportedVersion("missing".to_string())),
    }

    let pages = match template.get("pages").and_then(Value::as_array) {
        Some(pages) if !pages.is_empty() => pages,
        _ => return Err(TemplateError::NoPages),
    };

    let Some(metadata) = template.get("metadata").and_then(Value::as_object) else {
        return Err(TemplateError::MissingMetadata);
    };
    match metadata.get("sourcePageCount").and_then(Value::as_f64) {
        Some(count) if count >= 1.0 => {}
        _ => return Err(TemplateError::InvalidSourcePageCount),
    }

    if !template.get("fields").is_some_and(Value::is_array) {
        return Err(TemplateError::InvalidFields);
    }

    for (page_index, page) in pages.iter().enumerate() {
        validate_page_value(page_index, page)?;
    }
    Ok(())
}

fn validate_page_value(page_index: usize, page: &Value) -> Result<(), TemplateError> {
    let invalid = |rule| TemplateError::InvalidPage {
        page: page_index,
        rule,
    };
    let Some(page) = page.as_object() else {
        return Err(invalid("page must be an object"));
    };
    if !is_number(page, "width") {
        return Err(invalid("width must be a number"));
    }
    if !is_number(page, "height") {
        return Err(invalid("height must be a number"));
    }
    let Some(elements) = page.get("elements").and_then(Value::as_array) else {
        return Err(invalid("elements must be an array"));
    };

    for (element_index, element) in elements.iter().enumerate() {
        let invalid = |rule| TemplateError::InvalidElement {
            page: page_index,
            element: element_index,
            rule,
        };
        let Some(element) = element.as_object() else {
            return Err(invalid("element must be an object"));
        };
        match element.get("type") {
            Some(Value::String(kind)) if kind == "text" || kind == "placeholder" => {}
            other => {
                return Err(TemplateError::InvalidElementType {
                    page: page_index,
                    element: element_index,
                    found: other.map_or_else(|| "missing".to_string(), Value::to_string),
                });
            }
        }
        if !element.get("content").is_some_and(Value::is_string) {
            return Err(invalid("content must be a string"));
        }
        if !is_number(element, "x") {
            return Err(invalid("x must be a number"));
        }
        if !is_number(element, "y") {
            return Err(invalid("y must be a number"));
        }
    }
    Ok(())
}

fn is_number(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).is_some_and(Value::is_number)
}

/// Checks a typed template. Serde already enforced the version and shapes, so
/// this covers what types cannot: non-empty pages, page count and finite
/// geometry.
pub fn validate(template: &Template) -> Result<(), TemplateError> {
    if template.pages.is_empty() {
        return Err(TemplateError::NoPages);
    }
    if template.metadata.source_page_count < 1 {
        return Err(TemplateError::InvalidSourcePageCount);
    }

    for (page_index, page) in template.pages.iter().enumerate() {
        if !page.width.is_finite() {
            return Err(TemplateError::InvalidPage {
                page: page_index,
                rule: "width must be a number",
            });
        }
        if !page.height.is_finite() {
            return Err(TemplateError::InvalidPage {
                page: page_index,
                rule: "height must be a number",
            });
        }
        for (element_index, element) in page.elements.iter().enumerate() {
            if !(element.x.is_finite() && element.y.is_finite()) {
                return Err(TemplateError::InvalidElement {
                    page: page_index,
                    element: element_index,
                    rule: "x and y must be numbers",
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "version": "1.0",
            "metadata": {"createdAt": "2026-01-02T03:04:05Z", "sourcePageCount": 1},
            "pages": [{
                "width": 612,
                "height": 792,
                "elements": [{"type": "text", "content": "Hi", "x": 40, "y": 752}]
            }],
            "fields": [],
            "fonts": {}
        })
    }

    fn message(value: &Value) -> String {
        validate_value(value).expect_err("invalid").to_string()
    }

    #[test]
    fn accepts_valid_template_repeatedly() {
        let value = valid();
        assert!(validate_value(&value).is_ok());
        assert!(validate_value(&value).is_ok());

        let template = Template::from_json(&value).expect("template");
        assert!(validate(&template).is_ok());
        assert!(validate(&template).is_ok());
    }

    #[test]
    fn rejects_null_template() {
        assert!(matches!(
            validate_value(&Value::Null),
            Err(TemplateError::Missing)
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut value = valid();
        value["version"] = json!("2.0");
        let message = message(&value);
        assert!(message.contains("version"), "{message}");
        assert!(message.contains("2.0"), "{message}");
    }

    #[test]
    fn rejects_empty_pages() {
        let mut value = valid();
        value["pages"] = json!([]);
        assert!(message(&value).contains("page"));
    }

    #[test]
    fn rejects_missing_metadata_and_bad_page_count() {
        let mut value = valid();
        value.as_object_mut().expect("object").remove("metadata");
        assert!(matches!(
            validate_value(&value),
            Err(TemplateError::MissingMetadata)
        ));

        let mut value = valid();
        value["metadata"]["sourcePageCount"] = json!(0);
        assert!(message(&value).contains("sourcePageCount"));

        value["metadata"]["sourcePageCount"] = json!("1");
        assert!(matches!(
            validate_value(&value),
            Err(TemplateError::InvalidSourcePageCount)
        ));
    }

    #[test]
    fn rejects_non_array_fields() {
        let mut value = valid();
        value["fields"] = json!({});
        assert!(matches!(
            validate_value(&value),
            Err(TemplateError::InvalidFields)
        ));
    }

    #[test]
    fn rejects_page_without_numeric_height() {
        let mut value = valid();
        value["pages"][0]["height"] = json!("tall");
        assert_eq!(message(&value), "pages[0]: height must be a number");
    }

    #[test]
    fn rejects_unknown_element_type() {
        let mut value = valid();
        value["pages"][0]["elements"][0]["type"] = json!("image");
        let message = message(&value);
        assert!(message.contains("element type"), "{message}");
        assert!(message.contains("image"), "{message}");
    }

    #[test]
    fn rejects_element_without_coordinates() {
        let mut value = valid();
        value["pages"][0]["elements"][0]
            .as_object_mut()
            .expect("element")
            .remove("y");
        assert_eq!(message(&value), "pages[0].elements[0]: y must be a number");
    }

    #[test]
    fn version_is_checked_before_pages() {
        let value = json!({"version": "0.9", "pages": []});
        assert!(matches!(
            validate_value(&value),
            Err(TemplateError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn does_not_cross_check_fields_or_page_count() {
        let mut value = valid();
        value["metadata"]["sourcePageCount"] = json!(7);
        value["pages"][0]["elements"][0] =
            json!({"type": "placeholder", "content": "{{undeclared}}", "x": 1, "y": 2});
        assert!(validate_value(&value).is_ok());
    }

    #[test]
    fn typed_validation_rejects_empty_pages() {
        let mut template = Template::from_json(&valid()).expect("template");
        template.pages.clear();
        assert!(matches!(validate(&template), Err(TemplateError::NoPages)));
    }

    #[test]
    fn typed_validation_rejects_non_finite_geometry() {
        let mut template = Template::from_json(&valid()).expect("template");
        template.pages[0].elements[0].x = f64::NAN;
        assert!(matches!(
            validate(&template),
            Err(TemplateError::InvalidElement { page: 0, element: 0, .. })
        ));
    }
}
