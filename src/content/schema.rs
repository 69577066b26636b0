//! Field schemas attached to content types.
//!
//! Schemas drive the admin forms and are checked against item payloads in an
//! advisory way: [`ContentTypeSchema::check`] reports problems but never
//! rejects a write.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a single schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Textarea,
    #[serde(alias = "rich_text")]
    RichText,
    Array,
    Object,
    Image,
    Select,
    Boolean,
    Date,
}

/// Length and pattern constraints for string fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldDefinition {
    pub fn new(name: &str, kind: FieldKind, label: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            label: label.to_string(),
            placeholder: None,
            options: Vec::new(),
            item_type: None,
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn items(mut self, kind: FieldKind) -> Self {
        self.item_type = Some(kind);
        self
    }
}

/// Presentation hints for the public layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaLayout {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSchema {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub layout: SchemaLayout,
}

/// A labeled group of fields in the admin editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSection {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFormConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<String>,
    #[serde(default)]
    pub sections: BTreeMap<String, FormSection>,
}

impl AdminFormConfig {
    pub fn section(mut self, key: &str, title: &str, fields: &[&str]) -> Self {
        self.sections.insert(
            key.to_string(),
            FormSection {
                title: title.to_string(),
                fields: fields.iter().map(|f| f.to_string()).collect(),
            },
        );
        self
    }
}

/// One problem found while checking a payload against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaWarning {
    pub field: String,
    pub message: String,
}

impl SchemaWarning {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ContentTypeSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check `data` against the declared fields.
    ///
    /// Unknown keys in `data` are allowed. An empty result means the payload
    /// fits the schema.
    pub fn check(&self, data: &Value) -> Vec<SchemaWarning> {
        let Some(object) = data.as_object() else {
            return vec![SchemaWarning::new("", "payload is not an object")];
        };

        let mut warnings = Vec::new();
        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        warnings.push(SchemaWarning::new(&field.name, "required field is missing"));
                    }
                }
                Some(value) => check_value(field, value, &mut warnings),
            }
        }
        warnings
    }
}

fn check_value(field: &FieldDefinition, value: &Value, warnings: &mut Vec<SchemaWarning>) {
    let name = field.name.as_str();
    match field.kind {
        FieldKind::Text
        | FieldKind::Textarea
        | FieldKind::RichText
        | FieldKind::Image
        | FieldKind::Select
        | FieldKind::Date => {
            let Some(s) = value.as_str() else {
                warnings.push(SchemaWarning::new(name, "expected a string"));
                return;
            };
            if field.kind == FieldKind::Select
                && !field.options.is_empty()
                && !field.options.iter().any(|o| o == s)
            {
                warnings.push(SchemaWarning::new(
                    name,
                    format!("'{}' is not one of the allowed options", s),
                ));
            }
            if field.kind == FieldKind::Date && !is_date(s) {
                warnings.push(SchemaWarning::new(name, "expected an ISO-8601 date"));
            }
            if let Some(rules) = &field.validation {
                check_string_rules(name, s, rules, warnings);
            }
        }
        FieldKind::Array => {
            let Some(items) = value.as_array() else {
                warnings.push(SchemaWarning::new(name, "expected an array"));
                return;
            };
            let expected = match field.item_type {
                Some(FieldKind::Object) => Some(("an object", Value::is_object as fn(&Value) -> bool)),
                Some(FieldKind::Boolean) => Some(("a boolean", Value::is_boolean as fn(&Value) -> bool)),
                Some(FieldKind::Array) => Some(("an array", Value::is_array as fn(&Value) -> bool)),
                Some(_) => Some(("a string", Value::is_string as fn(&Value) -> bool)),
                None => None,
            };
            if let Some((label, matches)) = expected {
                for (idx, item) in items.iter().enumerate() {
                    if !matches(item) {
                        warnings.push(SchemaWarning::new(
                            name,
                            format!("item {} should be {}", idx, label),
                        ));
                    }
                }
            }
        }
        FieldKind::Object => {
            if !value.is_object() {
                warnings.push(SchemaWarning::new(name, "expected an object"));
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                warnings.push(SchemaWarning::new(name, "expected a boolean"));
            }
        }
    }
}

fn check_string_rules(
    name: &str,
    s: &str,
    rules: &FieldValidation,
    warnings: &mut Vec<SchemaWarning>,
) {
    let len = s.chars().count();
    if let Some(min) = rules.min_length {
        if len < min {
            warnings.push(SchemaWarning::new(
                name,
                format!("must be at least {} characters", min),
            ));
        }
    }
    if let Some(max) = rules.max_length {
        if len > max {
            warnings.push(SchemaWarning::new(
                name,
                format!("must be at most {} characters", max),
            ));
        }
    }
    if let Some(pattern) = &rules.pattern {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(s) => {
                warnings.push(SchemaWarning::new(name, format!("must match {}", pattern)));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(field = %name, error = %e, "ignoring invalid schema pattern");
            }
        }
    }
}

fn is_date(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
