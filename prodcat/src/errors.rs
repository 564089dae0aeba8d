use std::fmt;

use thiserror::Error;

/// Top-level error type returned by the catalog pipeline.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A detail row or constraint check failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The category/field import batch could not be built.
    #[error(transparent)]
    SchemaImport(#[from] SchemaImportError),

    /// The permission table denied the requested action.
    #[error("access denied: {role} may not {action} {resource}")]
    AccessDenied {
        role: String,
        action: String,
        resource: String,
    },

    /// Settings could not be loaded or were inconsistent.
    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Collection of validation issues encountered while assembling a details object.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// The first offending field, which is what the admin UI highlights.
    pub fn field(&self) -> Option<&str> {
        self.issues.first().map(|issue| issue.field.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "validation failed"),
            [issue] => write!(f, "{issue}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': {} ({})", self.field, self.message, self.code)
    }
}

/// Batch-level failures of the category/field import step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaImportError {
    #[error("{document} document must be a JSON array")]
    NotAnArray { document: &'static str },

    #[error("{document} document is empty")]
    EmptyDocument { document: &'static str },

    #[error("{document} record #{index} is missing required key '{key}'")]
    MissingKey {
        document: &'static str,
        index: usize,
        key: String,
    },

    #[error("{document} record #{index} is invalid: {message}")]
    InvalidRecord {
        document: &'static str,
        index: usize,
        message: String,
    },

    /// Reported as a diagnostic; the subcategory's fields are skipped.
    #[error("subcategory '{subcategory}' (under '{category}') does not match any known subcategory")]
    UnresolvedSubcategory { category: String, subcategory: String },

    #[error("slug '{slug}' generated for both '{first}' and '{second}'")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },
}

/// Convenience alias used when only validation can fail.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::permissions::{Action, Resource, Role, authorize};

    fn kind(err: &CatalogError) -> &'static str {
        match err {
            CatalogError::Validation(_) => "validation",
            CatalogError::SchemaImport(_) => "schema-import",
            CatalogError::AccessDenied { .. } => "access-denied",
            CatalogError::Config { .. } => "config",
        }
    }

    #[test]
    fn each_kind_comes_from_a_pipeline_stage() {
        let validation = CatalogError::from(ValidationError::single("Rate", "parse.number", "'x' is not a valid number"));
        let import = CatalogError::from(SchemaImportError::UnresolvedSubcategory {
            category: "Loans".into(),
            subcategory: "Boat Loans".into(),
        });
        let denied = authorize(Role::Member, Action::Manage, Resource::Settings).unwrap_err();
        let config = Settings::from_toml_str("[assembler").unwrap_err();

        let kinds: Vec<_> = [&validation, &import, &denied, &config].into_iter().map(kind).collect();
        assert_eq!(kinds, ["validation", "schema-import", "access-denied", "config"]);
        assert_eq!(validation.to_string(), "field 'Rate': 'x' is not a valid number (parse.number)");
    }
}
