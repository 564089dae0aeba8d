//! Product catalog field pipeline.
//!
//! Category-scoped field definitions ([`registry`]), typed assembly of the
//! free-form product `details` payload ([`assembler`]), field discovery over
//! stored products ([`analyzer`]) and the role permission table
//! ([`permissions`]). Everything here is synchronous and works on in-memory
//! data; persistence and identity verification belong to the caller.

pub mod analyzer;
pub mod assembler;
pub mod config;
pub mod constraints;
pub mod errors;
pub mod inference;
pub mod permissions;
pub mod registry;
pub mod types;
pub mod validators;
pub mod value;

pub use analyzer::{ExampleSet, FieldAnalyzer, FieldDescriptions, Frequency, InferredField};
pub use assembler::{CustomFieldPolicy, DetailAssembler, DetailRow, assemble_details, render_details};
pub use config::Settings;
pub use errors::*;
pub use inference::infer_type;
pub use permissions::{Action, Resource, Role, authorize, has_permission, has_permission_str};
pub use registry::{FieldRegistry, ImportReport, SeedDocument, SubcategoryFields, slugify};
pub use types::{Category, DataType, FieldDefinition, FieldValidation, Product, TypeTag};
pub use value::{DetailMap, DetailValue};
