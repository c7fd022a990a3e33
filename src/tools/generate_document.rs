use crate::contract::errors;
use crate::contract::{MAX_OUTPUT_BYTES, PDF_MIME_TYPE};
use crate::engine::PdfEngine;
use crate::input::{load_data, load_template};
use crate::template::{self, GenerateOptions, MissingFieldPolicy};
use crate::tools::{ToolError, error_result, parse_output_path, write_output};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

pub fn call(args: &Value) -> Value {
    let template = match load_template(args) {
        Ok(template) => template,
        Err(err) => return error_result(err.kind, err.message, None),
    };

    let data = match load_data(args) {
        Ok(data) => data,
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

    let generation = match template::generate(&PdfEngine, &template, &data, &options) {
        Ok(generation) => generation,
        Err(err) => {
            let err = ToolError::from(err);
            return error_result(err.kind, err.message, None);
        }
    };

    let bytes_len = generation.bytes.len() as u64;
    let page_count = generation.page_count as u64;

    match output_path {
        Some(path) => match write_output(&path, &generation.bytes, "document", PDF_MIME_TYPE) {
            Ok(output) => json!({
                "content": output.content,
                "structuredContent": {
                    "path": output.path,
                    "uri": output.uri,
                    "bytes_len": bytes_len,
                    "page_count": page_count,
                    "unresolved_fields": generation.unresolved_fields
                },
                "isError": false
            }),
            Err(err) => error_result(err.kind, err.message, None),
        },
        None => {
            if bytes_len > MAX_OUTPUT_BYTES {
                return error_result(
                    errors::TOO_LARGE,
                    format!("output exceeds limit: {bytes_len} bytes (max {MAX_OUTPUT_BYTES})"),
                    None,
                );
            }
            let encoded = STANDARD.encode(&generation.bytes);
            json!({
                "content": [{
                    "type": "text",
                    "text": format!("generated {page_count} page(s), {bytes_len} bytes")
                }],
                "structuredContent": {
                    "base64": encoded,
                    "mime_type": PDF_MIME_TYPE,
                    "bytes_len": bytes_len,
                    "page_count": page_count,
                    "unresolved_fields": generation.unresolved_fields
                },
                "isError": false
            })
        }
    }
}

fn parse_options(args: &Value) -> Result<GenerateOptions, ToolError> {
    let missing_field_behavior = match args.get("missing_field_behavior") {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(MissingFieldPolicy::parse(value).ok_or_else(|| {
            ToolError::invalid_input(
                "missing_field_behavior must be leave_placeholder, use_default, or empty_string",
            )
        })?),
        Some(_) => {
            return Err(ToolError::invalid_input(
                "missing_field_behavior must be a string",
            ));
        }
    };
    Ok(GenerateOptions {
        missing_field_behavior,
    })
}
