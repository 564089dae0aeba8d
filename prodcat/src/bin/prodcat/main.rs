mod commands;
mod context;
mod examples;
mod output;
mod theme;
mod utils;

use std::fmt::Write;
use std::io::{self, Write as IoWrite};
use std::path::PathBuf;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};

use commands::{
    analyze::{AnalyzeArgs, handle_analyze},
    config::{ConfigCommands, handle_config_commands},
    details::{DetailsCommands, handle_details_commands},
    permissions::{PermissionCommands, handle_permission_commands},
    registry::{RegistryCommands, handle_registry_commands},
};
use context::CliContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("PRODCAT_CONFIG", "Settings file used when --config is not given"),
    ("RUST_LOG", "Log filter, e.g. prodcat=debug"),
];

#[derive(Parser)]
#[command(name = "prodcat")]
#[command(version)]
#[command(
    about = "Category-scoped product fields, typed details and field discovery",
    long_about = r#"Product catalog field tooling:

• Build the field registry from category and field import files
• Assemble typed product details from raw form values, and render them back
• Discover which detail fields products actually carry
• Inspect the role permission table

Commands:
  registry     Build and inspect field definitions
  analyze      Discover fields across stored products
  details      Assemble or render a product details object
  permissions  Check and list role permissions
  config       Show effective settings
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Settings file (overrides PRODCAT_CONFIG and prodcat.toml discovery)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        match command.styles(help_styles()).try_get_matches() {
            Ok(matches) => match Cli::from_arg_matches(&matches) {
                Ok(cli) => cli,
                Err(err) => err.exit(),
            },
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = print_blank_line_stdout();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display help: {print_err}");
                    }
                    let _ = print_blank_line_stdout();
                    std::process::exit(0);
                }
                ErrorKind::MissingSubcommand => {
                    handle_missing_subcommand(err);
                }
                _ => {
                    let exit_code = err.exit_code();
                    let _ = print_blank_line_stderr();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display error: {print_err}");
                    }
                    let _ = print_blank_line_stderr();
                    std::process::exit(exit_code);
                }
            },
        }
    }
}

fn handle_missing_subcommand(error: clap::error::Error) -> ! {
    let mut command = build_cli_command();
    let command_name = command
        .get_display_name()
        .unwrap_or_else(|| command.get_name())
        .to_string();

    let _ = print_blank_line_stderr();
    eprintln!("error: '{command_name}' requires a subcommand but one was not provided");
    let _ = print_blank_line_stderr();

    command = command.styles(help_styles());

    let mut stderr = io::stderr();
    if command.write_long_help(&mut stderr).is_ok() {
        let _ = IoWrite::write_all(&mut stderr, b"\n");
        let _ = IoWrite::flush(&mut stderr);
    }

    std::process::exit(error.exit_code());
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    let mut command = Cli::command().after_long_help(render_top_level_appendix(use_color));
    command = command.color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });
    attach_command_examples(&mut command, use_color);
    command
}

fn attach_command_examples(command: &mut Command, use_color: bool) {
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand
                .clone()
                .after_long_help(render_examples(example.groups, use_color));
        }
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let _ = writeln!(buffer, "{}", stylize("Examples:", theme.heading, true, use_color));

    for (index, group) in groups.iter().enumerate() {
        let _ = writeln!(buffer, "  {}", stylize(group.title, theme.title, true, use_color));
        for command in group.commands {
            let arrow = stylize(ICONS.arrow, theme.command, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {}", stylize(command, theme.command, false, use_color));
        }
        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }

    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let _ = writeln!(buffer, "{}", stylize("Environment Variables:", theme.heading, true, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, theme.key, true, use_color);
        let _ = writeln!(buffer, "  {key_text}  {}", stylize(description, theme.value, false, use_color));
    }

    buffer.push('\n');

    let tip = stylize(
        "Use 'prodcat <command> --help' to view examples for each command.",
        theme.command,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{} {tip}", stylize("Tip:", theme.heading, true, use_color));

    buffer
}

fn print_blank_line_stdout() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

fn print_blank_line_stderr() -> io::Result<()> {
    let mut stderr = io::stderr();
    IoWrite::write_all(&mut stderr, b"\n")?;
    IoWrite::flush(&mut stderr)
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, true) => text.color(color).bold().to_string(),
        (true, false) => text.color(color).to_string(),
    }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.title).bold())
        .header(style_from_color(theme.heading).bold())
        .literal(style_from_color(theme.command))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.success))
        .invalid(style_from_color(theme.warning))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    Style::new().fg_color(Some(color_to_clap_color(color)))
}

fn color_to_clap_color(color: ThemeColor) -> ClapColor {
    let ansi = match color {
        ThemeColor::TrueColor { r, g, b } => return ClapColor::Rgb(RgbColor(r, g, b)),
        ThemeColor::Black => AnsiColor::Black,
        ThemeColor::Red => AnsiColor::Red,
        ThemeColor::Green => AnsiColor::Green,
        ThemeColor::Yellow => AnsiColor::Yellow,
        ThemeColor::Blue => AnsiColor::Blue,
        ThemeColor::Magenta => AnsiColor::Magenta,
        ThemeColor::Cyan => AnsiColor::Cyan,
        ThemeColor::White => AnsiColor::White,
        ThemeColor::BrightBlack => AnsiColor::BrightBlack,
        ThemeColor::BrightRed => AnsiColor::BrightRed,
        ThemeColor::BrightGreen => AnsiColor::BrightGreen,
        ThemeColor::BrightYellow => AnsiColor::BrightYellow,
        ThemeColor::BrightBlue => AnsiColor::BrightBlue,
        ThemeColor::BrightMagenta => AnsiColor::BrightMagenta,
        ThemeColor::BrightCyan => AnsiColor::BrightCyan,
        ThemeColor::BrightWhite => AnsiColor::BrightWhite,
    };
    ClapColor::Ansi(ansi)
}

#[derive(Subcommand)]
enum Commands {
    /// Build and inspect category field definitions
    #[command(subcommand)]
    Registry(RegistryCommands),

    /// Discover detail fields across stored products
    Analyze(AnalyzeArgs),

    /// Assemble or render a product details object
    #[command(subcommand)]
    Details(DetailsCommands),

    /// Check and list role permissions
    #[command(subcommand)]
    Permissions(PermissionCommands),

    /// Show effective settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();

    if let Err(err) = execute(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });
    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = CliContext::load(cli.config.as_deref())?;
    output.verbose(&format!("Settings: {}", ctx.describe_source()));

    match cli.command {
        Commands::Registry(command) => handle_registry_commands(command, &output).await?,
        Commands::Analyze(args) => handle_analyze(args, &ctx, &output).await?,
        Commands::Details(command) => handle_details_commands(command, &ctx, &output).await?,
        Commands::Permissions(command) => handle_permission_commands(command, &output)?,
        Commands::Config(command) => handle_config_commands(command, &ctx, &output)?,
    }

    Ok(())
}
