pub const INVALID_INPUT: &str = "invalid_input";
pub const TOO_LARGE: &str = "too_large";
pub const PARSE_FAILED: &str = "parse_failed";
pub const INVALID_TEMPLATE: &str = "invalid_template";
pub const RENDER_FAILED: &str = "render_failed";
pub const INTERNAL_ERROR: &str = "internal_error";
