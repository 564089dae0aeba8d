use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Table};
use prodcat::{CustomFieldPolicy, Settings};
use serde::Serialize;

use crate::context::CliContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Settings",
    commands: &[
        "prodcat config show                         # Effective settings and where they came from",
        "prodcat --config ./staging.toml config show",
        "prodcat config path",
    ],
}];

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    #[command(name = "show")]
    Show,

    /// Show which settings file is in use
    #[command(name = "path")]
    Path,
}

pub fn handle_config_commands(command: ConfigCommands, ctx: &CliContext, output: &OutputManager) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            output.key_value("Source", &ctx.describe_source());
            output.heading("Effective Settings");
            output.display(&SettingsView(&ctx.settings))?;
        }
        ConfigCommands::Path => {
            if output.is_json() {
                println!("{}", serde_json::json!({ "source": ctx.describe_source() }));
            } else {
                println!("{}", ctx.describe_source());
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(transparent)]
struct SettingsView<'a>(&'a Settings);

impl TableDisplay for SettingsView<'_> {
    fn to_table(&self, output: &OutputManager) -> Table {
        let settings = self.0;
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Setting", "Value"]);
        table.add_row(vec![
            Cell::new("analyzer.builtin_descriptions"),
            Cell::new(settings.analyzer.builtin_descriptions),
        ]);
        for (key, description) in &settings.analyzer.descriptions {
            table.add_row(vec![Cell::new(format!("analyzer.descriptions.{key}")), Cell::new(description)]);
        }
        table.add_row(vec![
            Cell::new("assembler.custom_fields"),
            Cell::new(match settings.assembler.custom_fields {
                CustomFieldPolicy::AsString => "string",
                CustomFieldPolicy::Infer => "infer",
            }),
        ]);
        table.add_row(vec![
            Cell::new("assembler.enforce_constraints"),
            Cell::new(settings.assembler.enforce_constraints),
        ]);
        table
    }

    fn to_compact(&self) -> String {
        self.0.to_toml_string().unwrap_or_default().replace('\n', " ")
    }
}
