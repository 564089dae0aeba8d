//! Category-scoped field schema registry.
//!
//! The registry is built once, from the category export and the per-subcategory
//! field lists, and is read-only afterwards. Building it is an exclusive
//! migration step; nothing here is shared across threads while it runs.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SchemaImportError;
use crate::types::{Category, DataType, FieldDefinition, FieldValidation};

const CATEGORIES_DOCUMENT: &str = "categories";
const FIELDS_DOCUMENT: &str = "fields";

/// One entry of the field import document: the fields of a single subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryFields {
    pub category_name: String,
    pub sub_category_name: String,
    pub fields: Vec<FieldSpec>,
}

/// A field as written in the import document, before it has an id or a
/// category-qualified slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub slug: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub validation: Option<FieldValidation>,
}

/// Merged output of the import step, consumed by the database seeder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDocument {
    pub product_categories: Vec<Category>,
    pub field_definitions: Vec<FieldDefinition>,
}

/// Result of a batch import: the registry plus the subcategories that were
/// skipped because they could not be resolved.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub registry: FieldRegistry,
    pub skipped: Vec<SchemaImportError>,
}

#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    categories: Vec<Category>,
    fields: Vec<FieldDefinition>,
}

impl FieldRegistry {
    /// Wraps already-built definitions, e.g. ones loaded from a seed document.
    pub fn new(categories: Vec<Category>, fields: Vec<FieldDefinition>) -> Self {
        Self { categories, fields }
    }

    pub fn from_seed(seed: SeedDocument) -> Self {
        Self::new(seed.product_categories, seed.field_definitions)
    }

    pub fn to_seed(&self) -> SeedDocument {
        SeedDocument {
            product_categories: self.categories.clone(),
            field_definitions: self.fields.clone(),
        }
    }

    /// Parses both raw import documents and builds the registry.
    pub fn import_documents(categories: Value, fields: Value) -> Result<ImportReport, SchemaImportError> {
        let categories = parse_categories(categories)?;
        let groups = parse_field_groups(fields)?;
        Self::build(categories, &groups)
    }

    /// Builds the registry from parsed categories and field groups.
    ///
    /// Field ids are assigned sequentially across the whole batch in import
    /// order (`field-001`, `field-002`, ...). A subcategory that cannot be
    /// resolved is skipped in full and reported in [`ImportReport::skipped`].
    /// Two fields producing the same slug reject the batch.
    pub fn build(categories: Vec<Category>, groups: &[SubcategoryFields]) -> Result<ImportReport, SchemaImportError> {
        let mut fields: Vec<FieldDefinition> = Vec::new();
        let mut skipped = Vec::new();
        let mut slug_owners: HashMap<String, String> = HashMap::new();

        for group in groups {
            let Some(subcategory) = resolve_subcategory(&categories, &group.category_name, &group.sub_category_name)
            else {
                warn!(
                    "skipping {} field(s): subcategory '{}' under '{}' not found",
                    group.fields.len(),
                    group.sub_category_name,
                    group.category_name
                );
                skipped.push(SchemaImportError::UnresolvedSubcategory {
                    category: group.category_name.clone(),
                    subcategory: group.sub_category_name.clone(),
                });
                continue;
            };

            let prefix = slugify(&group.sub_category_name);
            for spec in &group.fields {
                let slug = format!("{prefix}-{}", slugify(&spec.slug));
                let owner = format!("{} / {}", group.sub_category_name, spec.name);
                if let Some(first) = slug_owners.get(&slug) {
                    return Err(SchemaImportError::SlugCollision {
                        slug,
                        first: first.clone(),
                        second: owner,
                    });
                }
                slug_owners.insert(slug.clone(), owner);

                let id = format!("field-{:03}", fields.len() + 1);
                debug!("{id}: '{}' -> {slug} ({})", spec.name, spec.data_type);
                fields.push(FieldDefinition {
                    id,
                    category_id: subcategory.id.clone(),
                    name: spec.name.clone(),
                    slug,
                    data_type: spec.data_type,
                    is_required: spec.is_required.unwrap_or(false),
                    options: spec.options.clone(),
                    validation: spec.validation.clone().filter(|v| !v.is_empty()),
                });
            }
        }

        info!(
            "imported {} field definition(s) across {} categorie(s); {} subcategorie(s) skipped",
            fields.len(),
            categories.len(),
            skipped.len()
        );

        Ok(ImportReport {
            registry: Self { categories, fields },
            skipped,
        })
    }

    /// Field definitions of a category, in import order.
    pub fn fields_for_category(&self, category_id: &str) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|field| field.category_id == category_id).collect()
    }

    pub fn field_by_slug(&self, slug: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.slug == slug)
    }

    pub fn field_by_name(&self, category_id: &str, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.category_id == category_id && field.name == name)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn subcategories_of(&self, parent_id: &str) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|category| category.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }
}

/// Exact name match among subcategories. When several subcategories share a
/// name, the one whose parent carries `category_name` wins.
fn resolve_subcategory<'a>(categories: &'a [Category], category_name: &str, name: &str) -> Option<&'a Category> {
    let candidates: Vec<&Category> = categories
        .iter()
        .filter(|category| category.is_subcategory() && category.name == name)
        .collect();
    if candidates.len() > 1 {
        let under_parent = candidates.iter().copied().find(|candidate| {
            categories
                .iter()
                .any(|parent| Some(parent.id.as_str()) == candidate.parent_id.as_deref() && parent.name == category_name)
        });
        if under_parent.is_some() {
            return under_parent;
        }
    }
    candidates.first().copied()
}

/// Lowercases and joins words with single dashes. Whitespace, `-` and `_`
/// separate words; any other punctuation is dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

pub fn parse_categories(document: Value) -> Result<Vec<Category>, SchemaImportError> {
    parse_records(document, CATEGORIES_DOCUMENT, &["id", "name"])
}

pub fn parse_field_groups(document: Value) -> Result<Vec<SubcategoryFields>, SchemaImportError> {
    parse_records(document, FIELDS_DOCUMENT, &["categoryName", "subCategoryName", "fields"])
}

/// Accepts either a flat array of records or an array whose first element is
/// the array of records (the shape some exporters emit).
fn parse_records<T>(document: Value, name: &'static str, required: &[&str]) -> Result<Vec<T>, SchemaImportError>
where
    T: for<'de> Deserialize<'de>,
{
    let Value::Array(mut items) = document else {
        return Err(SchemaImportError::NotAnArray { document: name });
    };
    if items.is_empty() {
        return Err(SchemaImportError::EmptyDocument { document: name });
    }
    if items[0].is_array() {
        let Value::Array(inner) = items.swap_remove(0) else {
            return Err(SchemaImportError::NotAnArray { document: name });
        };
        if inner.is_empty() {
            return Err(SchemaImportError::EmptyDocument { document: name });
        }
        items = inner;
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Some(object) = item.as_object() else {
                return Err(SchemaImportError::InvalidRecord {
                    document: name,
                    index,
                    message: "expected a JSON object".to_string(),
                });
            };
            if let Some(key) = required.iter().find(|key| !object.contains_key(**key)) {
                return Err(SchemaImportError::MissingKey {
                    document: name,
                    index,
                    key: key.to_string(),
                });
            }
            serde_json::from_value(item).map_err(|err| SchemaImportError::InvalidRecord {
                document: name,
                index,
                message: err.to_string(),
            })
        })
        .collect()
}
