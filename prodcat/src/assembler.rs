//! Turns raw admin-form rows into a typed details object, and back.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AssemblerSettings;
use crate::constraints::{check_field, check_required};
use crate::errors::{ValidationError, ValidationResult};
use crate::inference::{infer_type, parse_date, parse_leading_number, parse_number};
use crate::types::{DataType, FieldDefinition, TypeTag};
use crate::value::{DetailMap, DetailValue};

/// One (field, raw value) pair as collected by the product form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub field: String,
    pub raw_value: String,
    /// Set by [`render_details`] for keys with no definition in the category.
    #[serde(default)]
    pub is_custom: bool,
}

impl DetailRow {
    pub fn new(field: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            raw_value: raw_value.into(),
            is_custom: false,
        }
    }
}

/// How rows naming no field definition are coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldPolicy {
    /// Keep the raw string.
    #[default]
    #[serde(rename = "string")]
    AsString,
    /// Store numbers and dates typed, by [`infer_type`].
    Infer,
}

#[derive(Debug, Clone)]
pub struct DetailAssembler<'a> {
    fields: Vec<&'a FieldDefinition>,
    custom_fields: CustomFieldPolicy,
    enforce_constraints: bool,
}

impl<'a> DetailAssembler<'a> {
    /// Assembler over the active category's field definitions.
    pub fn new(fields: impl IntoIterator<Item = &'a FieldDefinition>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            custom_fields: CustomFieldPolicy::default(),
            enforce_constraints: false,
        }
    }

    pub fn with_settings(fields: impl IntoIterator<Item = &'a FieldDefinition>, settings: &AssemblerSettings) -> Self {
        Self::new(fields)
            .custom_fields(settings.custom_fields)
            .enforce_constraints(settings.enforce_constraints)
    }

    pub fn custom_fields(mut self, policy: CustomFieldPolicy) -> Self {
        self.custom_fields = policy;
        self
    }

    /// Also check options, validation rules and required fields.
    pub fn enforce_constraints(mut self, enforce: bool) -> Self {
        self.enforce_constraints = enforce;
        self
    }

    fn definition(&self, name: &str) -> Option<&'a FieldDefinition> {
        self.fields.iter().copied().find(|field| field.name == name)
    }

    /// Builds the details object from `rows`.
    ///
    /// Rows with a blank field name are ignored; a repeated field keeps the
    /// last value. The first row that fails coercion aborts the whole
    /// assembly with an error naming that field.
    pub fn assemble(&self, rows: &[DetailRow]) -> ValidationResult<DetailMap> {
        let mut details = DetailMap::new();
        let mut issues = Vec::new();

        for row in rows {
            let name = row.field.trim();
            if name.is_empty() {
                continue;
            }
            let value = match self.definition(name) {
                Some(def) => {
                    let value = coerce(def.data_type, name, &row.raw_value)?;
                    if self.enforce_constraints {
                        issues.extend(check_field(def, &value));
                    }
                    value
                }
                None => {
                    debug!("'{name}' has no definition in this category; stored as custom field");
                    self.coerce_custom(&row.raw_value)
                }
            };
            details.insert(name.to_string(), value);
        }

        if self.enforce_constraints {
            issues.extend(check_required(self.fields.iter().copied(), &details));
        }
        if !issues.is_empty() {
            return Err(ValidationError::new(issues));
        }
        Ok(details)
    }

    fn coerce_custom(&self, raw: &str) -> DetailValue {
        if self.custom_fields == CustomFieldPolicy::AsString {
            return DetailValue::String(raw.to_string());
        }
        match infer_type(&DetailValue::String(raw.to_string())) {
            TypeTag::Date => parse_date(raw).map(DetailValue::Date),
            TypeTag::Number => parse_number(raw).map(DetailValue::Number),
            _ => None,
        }
        .unwrap_or_else(|| DetailValue::String(raw.to_string()))
    }

    /// Converts a stored details object back into form rows: defined fields
    /// in definition order, then custom keys alphabetically.
    pub fn render(&self, details: &DetailMap) -> Vec<DetailRow> {
        let mut rows = Vec::with_capacity(details.len());
        let mut seen = HashSet::new();
        for def in &self.fields {
            if let Some(value) = details.get(&def.name)
                && seen.insert(def.name.as_str())
            {
                rows.push(DetailRow::new(&def.name, value.to_raw_string()));
            }
        }
        for (key, value) in details {
            if !seen.contains(key.as_str()) {
                rows.push(DetailRow {
                    field: key.clone(),
                    raw_value: value.to_raw_string(),
                    is_custom: true,
                });
            }
        }
        rows
    }
}

/// Coerces one raw string per the declared data type.
///
/// `number` reads the leading numeric prefix, so `"5.5%"` stores `5.5`.
/// `boolean` never fails: only the exact string `"true"` is true. `date`,
/// `json` and `string` keep the raw string.
pub fn coerce(data_type: DataType, field: &str, raw: &str) -> ValidationResult<DetailValue> {
    match data_type {
        DataType::Number => parse_leading_number(raw).map(DetailValue::Number).ok_or_else(|| {
            ValidationError::single(field, "parse.number", format!("'{raw}' is not a valid number"))
        }),
        DataType::Boolean => Ok(DetailValue::Bool(raw == "true")),
        DataType::Object => match parse_json(field, raw)? {
            value @ Value::Object(_) => Ok(DetailValue::from(value)),
            other => Err(ValidationError::single(
                field,
                "shape.object",
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
        },
        DataType::Array => match parse_json(field, raw)? {
            value @ Value::Array(_) => Ok(DetailValue::from(value)),
            other => Err(ValidationError::single(
                field,
                "shape.array",
                format!("expected a JSON array, got {}", json_kind(&other)),
            )),
        },
        DataType::String | DataType::Date | DataType::Json => Ok(DetailValue::String(raw.to_string())),
    }
}

fn parse_json(field: &str, raw: &str) -> ValidationResult<Value> {
    serde_json::from_str(raw)
        .map_err(|err| ValidationError::single(field, "parse.json", format!("invalid JSON: {err}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Assembles `rows` against `fields` with default settings.
pub fn assemble_details(rows: &[DetailRow], fields: &[FieldDefinition]) -> ValidationResult<DetailMap> {
    DetailAssembler::new(fields).assemble(rows)
}

/// Renders `details` against `fields`; see [`DetailAssembler::render`].
pub fn render_details(details: &DetailMap, fields: &[FieldDefinition]) -> Vec<DetailRow> {
    DetailAssembler::new(fields).render(details)
}
