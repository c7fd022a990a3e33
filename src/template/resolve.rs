use super::model::{MissingFieldPolicy, TemplateField};
use super::placeholder::placeholder_regex;
use regex::Captures;
use std::collections::{BTreeMap, BTreeSet};

/// Values substituted for placeholder names.
pub type DataMap = BTreeMap<String, String>;

/// Replaces every `{{name}}` token in `content`.
///
/// A name present in `data` takes its value, even when empty. Otherwise the
/// policy decides: `UseDefault` takes the matching field's `default_value`
/// (empty when no field matches), `EmptyString` drops the token and
/// `LeavePlaceholder` keeps it verbatim. Never fails.
pub fn resolve(
    content: &str,
    data: &DataMap,
    policy: MissingFieldPolicy,
    fields: &[TemplateField],
) -> String {
    resolve_tracked(content, data, policy, fields, &mut BTreeSet::new())
}

/// Like [`resolve`], also recording names that were not found in `data`.
pub fn resolve_tracked(
    content: &str,
    data: &DataMap,
    policy: MissingFieldPolicy,
    fields: &[TemplateField],
    unresolved: &mut BTreeSet<String>,
) -> String {
    placeholder_regex()
        .replace_all(content, |caps: &Captures<'_>| {
            let name = &caps[1];
            if let Some(value) = data.get(name) {
                return value.clone();
            }
            unresolved.insert(name.to_string());
            match policy {
                MissingFieldPolicy::UseDefault => fields
                    .iter()
                    .find(|field| field.name == name)
                    .map(|field| field.default_value.clone())
                    .unwrap_or_default(),
                MissingFieldPolicy::EmptyString => String::new(),
                MissingFieldPolicy::LeavePlaceholder => caps[0].to_string(),
            }
        })
        .into_owned()
}
