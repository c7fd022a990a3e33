use crate::contract::{self, errors};
use crate::engine::EngineError;
use crate::template::TemplateError;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

pub mod extract_template;
pub mod generate_document;
pub mod inspect_template;

/// Runs the tool registered under `name`.
pub fn call(name: &str, args: &Value) -> Value {
    match name {
        contract::TOOL_EXTRACT_TEMPLATE => extract_template::call(args),
        contract::TOOL_GENERATE_DOCUMENT => generate_document::call(args),
        contract::TOOL_INSPECT_TEMPLATE => inspect_template::call(args),
        _ => error_result(
            errors::INVALID_INPUT,
            format!("unknown tool: {name}"),
            Some(name),
        ),
    }
}

pub fn error_result(
    kind: &'static str,
    message: impl Into<String>,
    source: Option<&str>,
) -> serde_json::Value {
    let message = message.into();
    let mut error = json!({
        "kind": kind,
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}

#[derive(Debug)]
pub(crate) struct ToolError {
    pub kind: &'static str,
    pub message: String,
}

impl ToolError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: errors::INVALID_INPUT,
            message: message.into(),
        }
    }
}

impl From<TemplateError> for ToolError {
    fn from(error: TemplateError) -> Self {
        let kind = match &error {
            TemplateError::Engine(EngineError::Load(_) | EngineError::NoPages) => {
                errors::PARSE_FAILED
            }
            TemplateError::Engine(EngineError::Build(_)) => errors::RENDER_FAILED,
            TemplateError::Engine(EngineError::Text(_) | EngineError::PageOutOfRange(_)) => {
                errors::INTERNAL_ERROR
            }
            _ => errors::INVALID_TEMPLATE,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

pub(crate) struct OutputResource {
    pub path: String,
    pub uri: String,
    pub content: Vec<Value>,
}

pub(crate) fn parse_output_path(value: Option<&Value>) -> Result<Option<String>, ToolError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Some(path) = value.as_str() else {
        return Err(ToolError::invalid_input("output_path must be a string"));
    };
    if path.trim().is_empty() {
        return Err(ToolError::invalid_input("output_path must not be empty"));
    }
    Ok(Some(path.to_string()))
}

pub(crate) fn write_output(
    path: &str,
    bytes: &[u8],
    what: &str,
    mime_type: &str,
) -> Result<OutputResource, ToolError> {
    fs::write(path, bytes).map_err(|err| ToolError {
        kind: errors::INTERNAL_ERROR,
        message: format!("failed to write output: {err}"),
    })?;

    let uri = format!("file://{path}");
    let name = Path::new(path)
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or(what);

    let content = vec![
        json!({
            "type": "text",
            "text": format!("{what} written to {path}")
        }),
        json!({
            "type": "resource_link",
            "uri": uri,
            "name": name,
            "mimeType": mime_type
        }),
    ];

    Ok(OutputResource {
        path: path.to_string(),
        uri,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_result_carries_kind_and_source() {
        let result = error_result(errors::PARSE_FAILED, "bad pdf", Some("base64"));
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"]["kind"], "parse_failed");
        assert_eq!(result["structuredContent"]["error"]["source"], "base64");
        assert_eq!(result["content"][0]["text"], "Error: bad pdf");
    }

    #[test]
    fn template_errors_map_to_kinds() {
        let cases = [
            (TemplateError::NoPages, errors::INVALID_TEMPLATE),
            (
                TemplateError::Engine(EngineError::Load("x".to_string())),
                errors::PARSE_FAILED,
            ),
            (
                TemplateError::Engine(EngineError::Build("x".to_string())),
                errors::RENDER_FAILED,
            ),
        ];
        for (error, kind) in cases {
            assert_eq!(ToolError::from(error).kind, kind);
        }
    }

    #[test]
    fn unknown_tool_is_invalid_input() {
        let result = call("template.delete", &json!({}));
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"]["kind"], errors::INVALID_INPUT);
        assert_eq!(result["structuredContent"]["error"]["source"], "template.delete");

        let result = call(contract::TOOL_INSPECT_TEMPLATE, &json!({}));
        assert_eq!(result["structuredContent"]["error"]["kind"], errors::INVALID_INPUT);
    }

    #[test]
    fn output_path_must_be_non_empty_string() {
        assert!(parse_output_path(None).expect("none").is_none());
        assert!(parse_output_path(Some(&json!(" "))).is_err());
        assert!(parse_output_path(Some(&json!(3))).is_err());
        assert_eq!(
            parse_output_path(Some(&json!("out.pdf"))).expect("path"),
            Some("out.pdf".to_string())
        );
    }
}
