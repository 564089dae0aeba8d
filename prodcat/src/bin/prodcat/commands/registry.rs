use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use prodcat::{FieldDefinition, FieldRegistry, SeedDocument};
use serde::Serialize;
use serde_json::Value;

use crate::context::{read_json, write_json};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::utils::truncate;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Build",
        commands: &[
            "prodcat registry build --categories categories.json --fields fields.json --out seed.json",
            "prodcat registry build --categories categories.json --fields fields.json   # print to stdout",
        ],
    },
    ExampleGroup {
        title: "Inspect",
        commands: &["prodcat registry fields --seed seed.json sub-personal-loans"],
    },
];

#[derive(Subcommand)]
pub enum RegistryCommands {
    /// Build the seed document from the category and field import files
    #[command(name = "build")]
    Build {
        /// Category export (array of {id, name, level, parentId})
        #[arg(long)]
        categories: PathBuf,

        /// Field import (array of {categoryName, subCategoryName, fields})
        #[arg(long)]
        fields: PathBuf,

        /// Write the seed document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the field definitions of a category
    #[command(name = "fields")]
    Fields {
        /// Seed document produced by `registry build`
        #[arg(long)]
        seed: PathBuf,

        /// Category id
        category: String,
    },
}

pub async fn handle_registry_commands(command: RegistryCommands, output: &OutputManager) -> Result<()> {
    match command {
        RegistryCommands::Build {
            categories,
            fields,
            out,
        } => {
            let categories: Value = read_json(&categories).await?;
            let fields: Value = read_json(&fields).await?;
            let report = FieldRegistry::import_documents(categories, fields).context("Import batch rejected")?;

            if !report.skipped.is_empty() {
                output.warning(&format!(
                    "{} subcategorie(s) skipped; their fields were not imported",
                    report.skipped.len()
                ));
                for skipped in &report.skipped {
                    output.bullet(&skipped.to_string());
                }
            }

            let seed = report.registry.to_seed();
            match out {
                Some(path) => {
                    write_json(&path, &seed).await?;
                    output.success(&format!(
                        "Wrote {} categorie(s) and {} field definition(s) to {}",
                        seed.product_categories.len(),
                        seed.field_definitions.len(),
                        path.display()
                    ));
                }
                None => println!("{}", serde_json::to_string_pretty(&seed)?),
            }
        }
        RegistryCommands::Fields { seed, category } => {
            let registry = load_registry(&seed).await?;
            let Some(found) = registry.category(&category) else {
                anyhow::bail!("Unknown category '{category}'");
            };
            output.heading(&format!("Fields of {} ({})", found.name, found.id));
            let listing = FieldListing(registry.fields_for_category(&category).into_iter().cloned().collect());
            if listing.0.is_empty() {
                output.info("No field definitions for this category");
            }
            output.display(&listing)?;
        }
    }
    Ok(())
}

pub async fn load_registry(seed: &std::path::Path) -> Result<FieldRegistry> {
    let seed: SeedDocument = read_json(seed).await?;
    Ok(FieldRegistry::from_seed(seed))
}

#[derive(Serialize)]
#[serde(transparent)]
struct FieldListing(Vec<FieldDefinition>);

impl TableDisplay for FieldListing {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["ID", "Name", "Slug", "Type", "Required", "Options"]);
        for field in &self.0 {
            table.add_row(vec![
                Cell::new(&field.id),
                Cell::new(&field.name),
                Cell::new(&field.slug),
                Cell::new(field.data_type),
                Cell::new(if field.is_required { "yes" } else { "" }),
                Cell::new(truncate(&field.options.join(", "), 40)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|field| format!("{}:{}", field.slug, field.data_type))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
