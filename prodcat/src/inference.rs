//! Semantic type inference for detail values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::TypeTag;
use crate::value::DetailValue;

static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));
static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid year-month regex"));
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid number prefix regex"));

/// Derives the semantic type tag of a value.
///
/// Strings are probed for a date before a number, so a bare year such as
/// `"2024"` is a `date` while `"42"` is a `number`.
pub fn infer_type(value: &DetailValue) -> TypeTag {
    match value {
        DetailValue::Null => TypeTag::Null,
        DetailValue::String(s) => infer_string(s),
        DetailValue::Number(n) if !n.is_finite() => TypeTag::Unknown,
        DetailValue::Number(n) if n.fract() == 0.0 => TypeTag::Integer,
        DetailValue::Number(_) => TypeTag::Decimal,
        DetailValue::Bool(_) => TypeTag::Boolean,
        DetailValue::Date(_) => TypeTag::Date,
        DetailValue::Array(items) => infer_array(items),
        DetailValue::Object(_) => TypeTag::Object,
    }
}

fn infer_string(s: &str) -> TypeTag {
    if parse_date(s).is_some() {
        TypeTag::Date
    } else if parse_number(s).is_some() {
        TypeTag::Number
    } else {
        TypeTag::String
    }
}

fn infer_array(items: &[DetailValue]) -> TypeTag {
    let Some(first) = items.first() else {
        return TypeTag::Array;
    };
    let first_tag = infer_type(first);
    if items[1..].iter().all(|item| infer_type(item) == first_tag) {
        TypeTag::ArrayOf(Box::new(first_tag))
    } else {
        TypeTag::ArrayOf(Box::new(TypeTag::Mixed))
    }
}

/// Parses the date shapes the admin tooling recognises: RFC 3339, ISO
/// date-time without offset (taken as UTC), `YYYY-MM-DD`, `YYYY-MM` and a bare
/// four-digit year.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    if let Some(caps) = YEAR_MONTH.captures(s) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    if YEAR_ONLY.is_match(s) {
        let year = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    None
}

/// Parses a string that is numeric in its entirety (surrounding whitespace
/// ignored). Non-finite spellings such as `inf` or `NaN` are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses the longest numeric prefix of a string after leading whitespace,
/// so `"5.5%"` is `5.5` and `"12 months"` is `12`. Used when a field is
/// declared `number`; `None` when no digits lead the string.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let prefix = LEADING_NUMBER.find(raw.trim_start())?;
    prefix.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tag(value: serde_json::Value) -> String {
        infer_type(&DetailValue::from(value)).to_string()
    }

    #[test]
    fn scalars() {
        assert_eq!(tag(json!(null)), "null");
        assert_eq!(tag(json!(true)), "boolean");
        assert_eq!(tag(json!(42)), "integer");
        assert_eq!(tag(json!(4.0)), "integer");
        assert_eq!(tag(json!(3.25)), "decimal");
        assert_eq!(tag(json!({"a": 1})), "object");
        assert_eq!(infer_type(&DetailValue::Number(f64::INFINITY)), TypeTag::Unknown);
    }

    #[test]
    fn strings_prefer_date_over_number() {
        assert_eq!(tag(json!("42")), "number");
        assert_eq!(tag(json!("3.25")), "number");
        assert_eq!(tag(json!("2024")), "date");
        assert_eq!(tag(json!("2024-03")), "date");
        assert_eq!(tag(json!("2024-03-15")), "date");
        assert_eq!(tag(json!("2024-03-15T10:30:00Z")), "date");
        assert_eq!(tag(json!("2024-03-15T10:30:00")), "date");
        assert_eq!(tag(json!("hello")), "string");
        assert_eq!(tag(json!("")), "string");
        assert_eq!(tag(json!("NaN")), "string");
        assert_eq!(tag(json!("12 months")), "string");
    }

    #[test]
    fn invalid_calendar_dates_are_not_dates() {
        assert_eq!(tag(json!("2024-13-01")), "string");
        assert_eq!(tag(json!("2024-13")), "string");
    }

    #[test]
    fn arrays() {
        assert_eq!(tag(json!([])), "array");
        assert_eq!(tag(json!([1, 2, 3])), "array<integer>");
        assert_eq!(tag(json!(["a", "b"])), "array<string>");
        assert_eq!(tag(json!([1, "a"])), "array<mixed>");
        assert_eq!(tag(json!([1, 2.5])), "array<mixed>");
        assert_eq!(tag(json!([[1], [2]])), "array<array<integer>>");
    }

    #[test]
    fn inference_is_stable() {
        let value = DetailValue::from(json!(["2024", "x"]));
        assert_eq!(infer_type(&value), infer_type(&value));
        let parsed = parse_number("42").unwrap();
        assert_eq!(infer_type(&DetailValue::Number(parsed)), TypeTag::Integer);
        assert_eq!(infer_type(&DetailValue::String(crate::value::format_number(parsed))), TypeTag::Number);
    }

    #[test]
    fn leading_number_takes_the_numeric_prefix() {
        assert_eq!(parse_leading_number("5.5%"), Some(5.5));
        assert_eq!(parse_leading_number("12 months"), Some(12.0));
        assert_eq!(parse_leading_number("  -3.25abc"), Some(-3.25));
        assert_eq!(parse_leading_number("1e3 units"), Some(1000.0));
        assert_eq!(parse_leading_number("2e"), Some(2.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("7."), Some(7.0));
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number("$100"), None);
        assert_eq!(parse_leading_number("NaN"), None);
        assert_eq!(parse_leading_number("."), None);
    }
}
