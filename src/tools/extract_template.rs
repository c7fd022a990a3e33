use crate::contract::JSON_MIME_TYPE;
use crate::contract::MAX_OUTPUT_BYTES;
use crate::contract::errors;
use crate::engine::PdfEngine;
use crate::input::load_input;
use crate::template::{self, ExtractOptions, TextSourceKind};
use crate::tools::{ToolError, error_result, parse_output_path, write_output};
use serde_json::{Value, json};

pub fn call(args: &Value) -> Value {
    let payload = match load_input(args) {
        Ok(payload) => payload,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let output_path = match parse_output_path(args.get("output_path")) {
        Ok(path) => path,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let extraction = match template::extract(&PdfEngine, &payload.bytes, &options) {
        Ok(extraction) => extraction,
        Err(err) => {
            let err = ToolError::from(err);
            return error_result(err.kind, err.message, Some(payload.source.as_str()));
        }
    };

    let page_count = extraction.template.pages.len() as u64;
    let field_names: Vec<&str> = extraction
        .template
        .fields
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    let field_count = field_names.len() as u64;
    let summary = format!("pages: {page_count}, fields: {field_count}");

    let template_json = match extraction.template.to_json() {
        Ok(value) => value,
        Err(err) => return error_result(errors::INTERNAL_ERROR, err.to_string(), None),
    };

    match output_path {
        Some(path) => {
            let serialized = match serde_json::to_vec_pretty(&template_json) {
                Ok(bytes) => bytes,
                Err(err) => return error_result(errors::INTERNAL_ERROR, err.to_string(), None),
            };
            match write_output(&path, &serialized, "template", JSON_MIME_TYPE) {
                Ok(output) => json!({
                    "content": output.content,
                    "structuredContent": {
                        "path": output.path,
                        "uri": output.uri,
                        "page_count": page_count,
                        "field_count": field_count,
                        "fields": field_names,
                        "text_source": options.text_source.as_str(),
                        "warnings": extraction.warnings
                    },
                    "isError": false
                }),
                Err(err) => error_result(err.kind, err.message, None),
            }
        }
        None => {
            let bytes_len = template_json.to_string().len() as u64;
            if bytes_len > MAX_OUTPUT_BYTES {
                return error_result(
                    errors::TOO_LARGE,
                    format!("output exceeds limit: {bytes_len} bytes (max {MAX_OUTPUT_BYTES})"),
                    None,
                );
            }
            json!({
                "content": [{"type": "text", "text": summary}],
                "structuredContent": {
                    "template": template_json,
                    "page_count": page_count,
                    "field_count": field_count,
                    "fields": field_names,
                    "text_source": options.text_source.as_str(),
                    "warnings": extraction.warnings
                },
                "isError": false
            })
        }
    }
}

fn parse_options(args: &Value) -> Result<ExtractOptions, ToolError> {
    Ok(ExtractOptions {
        name: optional_string(args, "name")?,
        description: optional_string(args, "description")?,
        text_source: match optional_string(args, "text_source")? {
            None => TextSourceKind::default(),
            Some(value) => TextSourceKind::parse(&value).ok_or_else(|| {
                ToolError::invalid_input("text_source must be proportional or per_page")
            })?,
        },
    })
}

fn optional_string(args: &Value, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ToolError::invalid_input(format!("{key} must be a string"))),
    }
}
