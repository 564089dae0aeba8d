use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use prodcat::{FieldAnalyzer, InferredField, Product};
use serde::Serialize;
use serde_json::Value;

use crate::context::{CliContext, read_json};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::utils::{collect_json_files, format_examples, products_from_json};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Field Discovery",
    commands: &[
        "prodcat analyze products.json                     # All products in one file",
        "prodcat analyze exports/ --category sub-car-loans  # Every *.json below exports/, one category",
        "prodcat --output json analyze products.json",
    ],
}];

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Product file, or a directory searched recursively for *.json files
    pub path: PathBuf,

    /// Only analyze products of this category id
    #[arg(long)]
    pub category: Option<String>,
}

pub async fn handle_analyze(args: AnalyzeArgs, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    let files = collect_json_files(&args.path)?;
    if files.is_empty() {
        output.warning(&format!("No JSON files found under {}", args.path.display()));
        return Ok(());
    }

    let mut products: Vec<Product> = Vec::new();
    for file in &files {
        let document: Value = read_json(file).await?;
        let loaded = products_from_json(document);
        if loaded.skipped > 0 {
            output.warning(&format!(
                "{}: skipped {} entry(ies) that are not product objects",
                file.display(),
                loaded.skipped
            ));
        }
        output.verbose(&format!("{}: {} product(s)", file.display(), loaded.products.len()));
        products.extend(loaded.products);
    }

    let analyzer = FieldAnalyzer::new(ctx.settings.analyzer.field_descriptions());
    let (scanned, fields) = match &args.category {
        Some(category) => {
            let scanned = products
                .iter()
                .filter(|product| product.category_id.as_deref() == Some(category.as_str()))
                .count();
            (scanned, analyzer.analyze_category(&products, category))
        }
        None => (products.len(), analyzer.analyze(&products)),
    };

    output.heading("Discovered Fields");
    output.info(&format!(
        "Scanned {scanned} product(s) from {} file(s); {} distinct field(s)",
        files.len(),
        fields.len()
    ));
    output.display(&FieldReport { scanned, fields })
}

#[derive(Serialize)]
struct FieldReport {
    scanned: usize,
    fields: Vec<InferredField>,
}

impl TableDisplay for FieldReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Field", "Type", "Frequency", "Examples", "Description"]);
        for field in &self.fields {
            table.add_row(vec![
                Cell::new(&field.key),
                Cell::new(&field.type_tag),
                Cell::new(format!("{} ({}%)", field.frequency.count, field.frequency.percentage)),
                Cell::new(format_examples(field.display_examples())),
                Cell::new(&field.description),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{}:{}:{}%", field.key, field.type_tag, field.frequency.percentage))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
