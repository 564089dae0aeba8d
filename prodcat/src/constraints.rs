//! Declared-constraint checks applied to assembled detail values.

use log::warn;
use regex::Regex;

use crate::errors::ValidationIssue;
use crate::types::{FieldDefinition, FieldValidation, ValueFormat};
use crate::validators::matches_format;
use crate::value::{DetailMap, DetailValue, format_number};

fn length_for_value(value: &DetailValue) -> Option<usize> {
    match value {
        DetailValue::String(s) => Some(s.chars().count()),
        DetailValue::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn check_validation(field_name: &str, rules: &FieldValidation, value: &DetailValue, issues: &mut Vec<ValidationIssue>) {
    if let Some(candidate) = value.as_f64() {
        if let Some(min) = rules.min
            && candidate < min
        {
            issues.push(ValidationIssue::new(
                field_name,
                "validation.range",
                format!("value must be at least {}", format_number(min)),
            ));
        }
        if let Some(max) = rules.max
            && candidate > max
        {
            issues.push(ValidationIssue::new(
                field_name,
                "validation.range",
                format!("value must be at most {}", format_number(max)),
            ));
        }
    }

    if let Some(len) = length_for_value(value) {
        if let Some(min_len) = rules.min_length
            && len < min_len
        {
            issues.push(ValidationIssue::new(
                field_name,
                "validation.length",
                format!("length must be at least {min_len}"),
            ));
        }
        if let Some(max_len) = rules.max_length
            && len > max_len
        {
            issues.push(ValidationIssue::new(
                field_name,
                "validation.length",
                format!("length must be at most {max_len}"),
            ));
        }
    }

    if let Some(candidate) = value.as_str() {
        if let Some(pattern) = &rules.pattern {
            match Regex::new(pattern) {
                Ok(regex) if !regex.is_match(candidate) => issues.push(ValidationIssue::new(
                    field_name,
                    "validation.regex",
                    format!("value does not match pattern {pattern}"),
                )),
                Ok(_) => {}
                Err(err) => warn!("field '{field_name}' has an invalid pattern '{pattern}': {err}"),
            }
        }
        if let Some(format) = rules.format
            && !matches_format(format, candidate)
        {
            let (code, label) = match format {
                ValueFormat::Email => ("validation.email", "email"),
                ValueFormat::Url => ("validation.url", "url"),
                ValueFormat::Uuid => ("validation.uuid", "uuid"),
            };
            issues.push(ValidationIssue::new(field_name, code, format!("value must be a valid {label}")));
        }
    }
}

fn check_options(field: &FieldDefinition, value: &DetailValue, issues: &mut Vec<ValidationIssue>) {
    if field.options.is_empty() {
        return;
    }
    let allowed = |candidate: &DetailValue| field.options.iter().any(|option| *option == candidate.to_raw_string());
    let ok = match value {
        DetailValue::Array(items) => items.iter().all(allowed),
        other => allowed(other),
    };
    if !ok {
        issues.push(ValidationIssue::new(
            &field.name,
            "validation.enum",
            format!("value must be one of {:?}", field.options),
        ));
    }
}

/// Checks one assembled value against its definition's options and rules.
pub fn check_field(field: &FieldDefinition, value: &DetailValue) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_options(field, value, &mut issues);
    if let Some(rules) = &field.validation {
        check_validation(&field.name, rules, value, &mut issues);
    }
    issues
}

/// Reports required fields that are absent or blank in `details`.
pub fn check_required<'a>(
    fields: impl IntoIterator<Item = &'a FieldDefinition>,
    details: &DetailMap,
) -> Vec<ValidationIssue> {
    fields
        .into_iter()
        .filter(|field| field.is_required)
        .filter(|field| match details.get(&field.name) {
            None | Some(DetailValue::Null) => true,
            Some(DetailValue::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .map(|field| ValidationIssue::new(&field.name, "validation.required", "value is required"))
        .collect()
}
