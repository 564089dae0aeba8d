use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::DetailValue;

/// Declared data type of a field definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
    Json,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Object => "object",
            DataType::Array => "array",
            DataType::Json => "json",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic type derived from an observed value.
///
/// Serializes to the tag strings used by the admin tooling: `integer`,
/// `array<string>`, `array<mixed>`, `mixed` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    String,
    Number,
    Integer,
    Decimal,
    Boolean,
    Date,
    /// Empty array; the element type is unknown.
    Array,
    ArrayOf(Box<TypeTag>),
    Object,
    /// Observations disagree.
    Mixed,
    Unknown,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Null => f.write_str("null"),
            TypeTag::String => f.write_str("string"),
            TypeTag::Number => f.write_str("number"),
            TypeTag::Integer => f.write_str("integer"),
            TypeTag::Decimal => f.write_str("decimal"),
            TypeTag::Boolean => f.write_str("boolean"),
            TypeTag::Date => f.write_str("date"),
            TypeTag::Array => f.write_str("array"),
            TypeTag::ArrayOf(inner) => write!(f, "array<{inner}>"),
            TypeTag::Object => f.write_str("object"),
            TypeTag::Mixed => f.write_str("mixed"),
            TypeTag::Unknown => f.write_str("unknown"),
        }
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s {
            "null" => TypeTag::Null,
            "string" => TypeTag::String,
            "number" => TypeTag::Number,
            "integer" => TypeTag::Integer,
            "decimal" => TypeTag::Decimal,
            "boolean" => TypeTag::Boolean,
            "date" => TypeTag::Date,
            "array" => TypeTag::Array,
            "object" => TypeTag::Object,
            "mixed" => TypeTag::Mixed,
            "unknown" => TypeTag::Unknown,
            other => {
                let inner = other
                    .strip_prefix("array<")
                    .and_then(|rest| rest.strip_suffix('>'))
                    .ok_or_else(|| format!("unknown type tag '{other}'"))?;
                TypeTag::ArrayOf(Box::new(inner.parse()?))
            }
        };
        Ok(tag)
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A node of the two-level category hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl Category {
    /// Subcategories carry a parent; top-level categories do not.
    pub fn is_subcategory(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Optional structured constraint attached to a field definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueFormat>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self == &FieldValidation::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Email,
    Url,
    Uuid,
}

/// Schema entry declaring one field of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    pub category_id: String,
    pub name: String,
    /// Globally unique: `slugify(subcategory) + "-" + slugify(field slug)`.
    pub slug: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

/// Product record as handed over by the data-access layer.
///
/// Only `details` matters to the pipeline; the remaining columns are kept so
/// records can be passed through untouched. Stores disagree on column shapes,
/// so the typed columns read leniently and never reject a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub details: Option<DetailValue>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "lenient::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Builds a product carrying only a details payload.
    pub fn with_details(id: impl Into<String>, details: impl Into<DetailValue>) -> Self {
        Self {
            id: id.into(),
            category_id: None,
            details: Some(details.into()),
            is_active: true,
            is_featured: false,
            created_at: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::inference::parse_date;

    fn optional_text_of(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(optional_text_of(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(optional_text_of(Value::deserialize(deserializer)?))
    }

    /// Anything but JSON `true` is false.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
    }

    /// Any date shape `parse_date` knows; otherwise unset.
    pub fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => parse_date(&s),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_render_and_parse() {
        let tag = TypeTag::ArrayOf(Box::new(TypeTag::Integer));
        assert_eq!(tag.to_string(), "array<integer>");
        assert_eq!("array<integer>".parse::<TypeTag>().unwrap(), tag);
        assert_eq!("array<array<mixed>>".parse::<TypeTag>().unwrap().to_string(), "array<array<mixed>>");
        assert!("array<".parse::<TypeTag>().is_err());
    }

    #[test]
    fn field_definition_uses_camel_case() {
        let def: FieldDefinition = serde_json::from_str(
            r#"{"id":"field-001","categoryId":"sub1","name":"Interest Rate","slug":"personal-loans-interest-rate","dataType":"number","isRequired":true}"#,
        )
        .unwrap();
        assert_eq!(def.data_type, DataType::Number);
        assert!(def.is_required);
        assert!(def.options.is_empty());
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["categoryId"], "sub1");
        assert!(json.get("options").is_none());
    }

    #[test]
    fn product_keeps_unknown_columns() {
        let product: Product =
            serde_json::from_str(r#"{"id":"p1","categoryId":"c1","details":{"rate":1},"isActive":true,"providerId":"x"}"#)
                .unwrap();
        assert_eq!(product.category_id.as_deref(), Some("c1"));
        assert_eq!(product.extra["providerId"], "x");
    }

    #[test]
    fn product_columns_read_leniently() {
        let product: Product = serde_json::from_str(r#"{"id":7,"categoryId":12,"details":{"rate":1}}"#).unwrap();
        assert_eq!(product.id, "7");
        assert_eq!(product.category_id.as_deref(), Some("12"));

        let product: Product = serde_json::from_str(r#"{"isActive":null,"isFeatured":"yes"}"#).unwrap();
        assert!(!product.is_active);
        assert!(!product.is_featured);
        assert_eq!(product.id, "");

        let product: Product =
            serde_json::from_str(r#"{"createdAt":"2024-01-15 10:00:00","updatedAt":"2024-01-15T10:00:00Z"}"#).unwrap();
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.updated_at.unwrap().to_rfc3339(), "2024-01-15T10:00:00+00:00");

        let product: Product = serde_json::from_str(r#"{"createdAt":"last tuesday","updatedAt":1705312800}"#).unwrap();
        assert_eq!(product.created_at, None);
        assert_eq!(product.updated_at, None);
    }
}
