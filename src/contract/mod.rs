pub mod errors;

pub const TOOL_EXTRACT_TEMPLATE: &str = "template.extract";
pub const TOOL_GENERATE_DOCUMENT: &str = "template.generate_document";
pub const TOOL_INSPECT_TEMPLATE: &str = "template.inspect";

pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_TEMPLATE_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_OUTPUT_BYTES: u64 = 20 * 1024 * 1024;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const JSON_MIME_TYPE: &str = "application/json";
