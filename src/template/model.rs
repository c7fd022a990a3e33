use super::error::TemplateError;
use super::validate::validate_value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key of the catalog entry extraction writes into [`Template::fonts`].
pub const DEFAULT_FONT_KEY: &str = "default";
pub const DEFAULT_FONT_NAME: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Template format version. New formats get a new variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateVersion {
    #[serde(rename = "1.0")]
    V1,
}

impl TemplateVersion {
    pub const CURRENT: TemplateVersion = TemplateVersion::V1;

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateVersion::V1 => "1.0",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub version: TemplateVersion,
    pub metadata: TemplateMetadata,
    pub pages: Vec<TemplatePage>,
    pub fields: Vec<TemplateField>,
    #[serde(default)]
    pub fonts: BTreeMap<String, TemplateFont>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<TemplateDefaults>,
}

impl Template {
    /// Validates raw JSON against the structural rules, then deserializes it.
    pub fn from_json(value: &Value) -> Result<Self, TemplateError> {
        validate_value(value)?;
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_json(&self) -> Result<Value, TemplateError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub source_page_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<TemplateElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub content: String,
    /// Set only when the element is exactly one placeholder token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<TemplateFont>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TemplateColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub name: String,
    #[serde(default)]
    pub default_value: String,
    /// Ascending, de-duplicated 1-based page numbers.
    #[serde(default)]
    pub pages: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateFont {
    pub name: String,
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
}

impl TemplateFont {
    pub fn is_bold(&self) -> bool {
        self.weight == Some(FontWeight::Bold)
    }
}

impl Default for TemplateFont {
    fn default() -> Self {
        Self {
            name: DEFAULT_FONT_NAME.to_string(),
            size: DEFAULT_FONT_SIZE,
            weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<TemplateFont>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TemplateColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_field_behavior: Option<MissingFieldPolicy>,
}

/// How a placeholder with no data value is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    #[default]
    LeavePlaceholder,
    UseDefault,
    EmptyString,
}

impl MissingFieldPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "leave_placeholder" => Some(MissingFieldPolicy::LeavePlaceholder),
            "use_default" => Some(MissingFieldPolicy::UseDefault),
            "empty_string" => Some(MissingFieldPolicy::EmptyString),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MissingFieldPolicy::LeavePlaceholder => "leave_placeholder",
            MissingFieldPolicy::UseDefault => "use_default",
            MissingFieldPolicy::EmptyString => "empty_string",
        }
    }
}
