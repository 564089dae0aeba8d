use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Table};
use prodcat::{DetailAssembler, DetailMap, DetailRow, DetailValue, FieldRegistry, ValidationError};
use serde::Serialize;

use crate::commands::registry::load_registry;
use crate::context::{CliContext, read_json};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::utils::{parse_assignment, truncate};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Assemble",
        commands: &[
            "prodcat details assemble --seed seed.json --category sub1 --set \"Interest Rate=5.5\"",
            "prodcat details assemble --seed seed.json --category sub1 --rows form.json --strict",
        ],
    },
    ExampleGroup {
        title: "Render",
        commands: &["prodcat details render --seed seed.json --category sub1 details.json"],
    },
];

#[derive(Subcommand)]
pub enum DetailsCommands {
    /// Build a typed details object from raw form values
    #[command(name = "assemble")]
    Assemble {
        /// Seed document produced by `registry build`
        #[arg(long)]
        seed: PathBuf,

        /// Category id whose field definitions apply
        #[arg(long)]
        category: String,

        /// Field value as FIELD=VALUE (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<DetailRow>,

        /// JSON file holding an array of {field, rawValue} rows
        #[arg(long)]
        rows: Option<PathBuf>,

        /// Also enforce options, validation rules and required fields
        #[arg(long)]
        strict: bool,
    },

    /// Show a stored details object as form rows
    #[command(name = "render")]
    Render {
        /// Seed document produced by `registry build`
        #[arg(long)]
        seed: PathBuf,

        /// Category id whose field definitions apply
        #[arg(long)]
        category: String,

        /// JSON file holding the details object
        details: PathBuf,
    },
}

pub async fn handle_details_commands(command: DetailsCommands, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    match command {
        DetailsCommands::Assemble {
            seed,
            category,
            set,
            rows,
            strict,
        } => {
            let registry = load_registry(&seed).await?;
            ensure_category(&registry, &category)?;

            let mut all_rows: Vec<DetailRow> = match rows {
                Some(path) => read_json(&path).await?,
                None => Vec::new(),
            };
            all_rows.extend(set);
            if all_rows.is_empty() {
                anyhow::bail!("Nothing to assemble: pass --set FIELD=VALUE or --rows <file>");
            }

            let assembler = DetailAssembler::with_settings(registry.fields_for_category(&category), &ctx.settings.assembler);
            let assembler = if strict { assembler.enforce_constraints(true) } else { assembler };

            match assembler.assemble(&all_rows) {
                Ok(details) => {
                    output.success(&format!("Assembled {} field(s)", details.len()));
                    output.display(&DetailsView {
                        rows: assembler.render(&details),
                        details,
                    })?;
                }
                Err(err) => {
                    for issue in &err.issues {
                        output.error(&format!("{}: {} [{}]", issue.field, issue.message, issue.code));
                    }
                    anyhow::bail!(rejection_summary(&err));
                }
            }
        }
        DetailsCommands::Render {
            seed,
            category,
            details,
        } => {
            let registry = load_registry(&seed).await?;
            ensure_category(&registry, &category)?;

            let DetailValue::Object(details) = read_json::<DetailValue>(&details).await? else {
                anyhow::bail!("Details file must hold a JSON object");
            };
            let assembler = DetailAssembler::new(registry.fields_for_category(&category));
            output.display(&DetailsView {
                rows: assembler.render(&details),
                details,
            })?;
        }
    }
    Ok(())
}

/// Issues are already printed one per line; the returned error only counts them
fn rejection_summary(err: &ValidationError) -> String {
    match err.issues.len() {
        1 => "Details rejected: 1 field failed validation".to_string(),
        n => format!("Details rejected: {n} fields failed validation"),
    }
}

fn ensure_category(registry: &FieldRegistry, category: &str) -> Result<()> {
    if registry.category(category).is_none() {
        anyhow::bail!("Unknown category '{category}'");
    }
    Ok(())
}

/// JSON output is the details payload itself; tables show the form rows.
#[derive(Serialize)]
struct DetailsView {
    #[serde(flatten)]
    details: DetailMap,
    #[serde(skip)]
    rows: Vec<DetailRow>,
}

impl TableDisplay for DetailsView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Field", "Value", "Custom"]);
        for row in &self.rows {
            table.add_row(vec![
                Cell::new(&row.field),
                Cell::new(truncate(&row.raw_value, 60)),
                Cell::new(if row.is_custom { "yes" } else { "" }),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        serde_json::to_string(&self.details).unwrap_or_default()
    }
}
