use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use notionbib_core::{Config, Report, Severity};
use notionbib_engine::{DocumentWriter, Export, ExportSettings, Pipeline, YamlFileWriter};
use notionbib_source::{DatabaseId, NotionClient};

/// notionbib - Export a Notion literature database as a Hayagriva bibliography
#[derive(Parser)]
#[command(name = "notionbib")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: notionbib.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all rows to a Hayagriva YAML document
    Export {
        /// Output document (default: from config, hayagriva.yml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Database id (overrides NOTION_DB_ID and the config file)
        #[arg(short, long)]
        database: Option<String>,

        /// Also write a JSON report of all diagnostics
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Exit with failure when a diagnostic reaches this severity
        #[arg(long, value_name = "LEVEL")]
        fail_on: Option<Severity>,
    },

    /// Build every record without writing the document
    Check {
        /// Database id (overrides NOTION_DB_ID and the config file)
        #[arg(short, long)]
        database: Option<String>,

        /// Exit with failure when a diagnostic reaches this severity
        #[arg(long, value_name = "LEVEL")]
        fail_on: Option<Severity>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Secrets may live in a local .env file
    dotenvy::dotenv().ok();

    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            output,
            database,
            report,
            fail_on,
        } => {
            export_command(
                &config,
                output,
                database,
                report.as_deref(),
                fail_on.or(config.fail_on),
                cli.verbose,
            )
            .await
        }
        Commands::Check { database, fail_on } => {
            check_command(&config, database, fail_on.or(config.fail_on), cli.verbose).await
        }
    }
}

/// Install the stderr log subscriber; RUST_LOG wins over the defaults
fn init_logging(verbose: bool) {
    let default = if verbose { "notionbib=debug" } else { "notionbib=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(config_path) = path {
        return Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    let default_path = Path::new("notionbib.toml");
    if default_path.exists() {
        return Config::from_file(default_path).context("Failed to load notionbib.toml");
    }

    tracing::debug!("no config file found, using defaults");
    Ok(Config::default())
}

/// Resolve the database id: flag, then NOTION_DB_ID, then config
fn resolve_database(config: &Config, flag: Option<String>) -> Result<DatabaseId> {
    flag.or_else(|| std::env::var("NOTION_DB_ID").ok())
        .or_else(|| config.database_id.clone())
        .filter(|id| !id.trim().is_empty())
        .map(DatabaseId::new)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No database id given. Set NOTION_DB_ID, pass --database or add database_id to notionbib.toml."
            )
        })
}

fn connect(config: &Config) -> Result<NotionClient> {
    let token = std::env::var("NOTION_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("NOTION_TOKEN is not set (environment or .env)"))?;

    NotionClient::new(&token, &config.notion, config.relations.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create Notion client: {}", e))
}

/// Fetch and build every row of the database
async fn run_pipeline(config: &Config, database: &DatabaseId, verbose: bool) -> Result<Export> {
    let settings = ExportSettings::from_config(config)?;
    let client = connect(config)?;

    if verbose {
        eprintln!("{} {}...", "Querying database".cyan(), database);
    }

    let export = Pipeline::new(&client, &settings)
        .run(database, config.page_size)
        .await?;

    Ok(export)
}

/// Export command - write the bibliography document
async fn export_command(
    config: &Config,
    output: Option<PathBuf>,
    database: Option<String>,
    report_path: Option<&Path>,
    fail_on: Option<Severity>,
    verbose: bool,
) -> Result<()> {
    let database = resolve_database(config, database)?;
    let export = run_pipeline(config, &database, verbose).await?;

    let output = output.unwrap_or_else(|| config.output_path());
    YamlFileWriter::new(&output).write(&export.records)?;

    if verbose {
        eprintln!("{} {}", "Document saved to:".green(), output.display());
    }

    let report = export.report().with_database(database.as_str());

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print_report_summary(&report, "Bibliography Export Report");
    exit_on_threshold(&report, fail_on);

    Ok(())
}

/// Check command - build everything, write nothing
async fn check_command(
    config: &Config,
    database: Option<String>,
    fail_on: Option<Severity>,
    verbose: bool,
) -> Result<()> {
    let database = resolve_database(config, database)?;
    let export = run_pipeline(config, &database, verbose).await?;

    let report = export.report().with_database(database.as_str());

    print_report_summary(&report, "Bibliography Check Report");
    exit_on_threshold(&report, fail_on);

    Ok(())
}

fn exit_on_threshold(report: &Report, fail_on: Option<Severity>) {
    if let Some(threshold) = fail_on {
        if report.fails_at(threshold) {
            eprintln!(
                "{} diagnostics at or above {}",
                "Failing:".red().bold(),
                threshold
            );
            std::process::exit(1);
        }
    }
}

/// Print report summary to stdout
fn print_report_summary(report: &Report, title: &str) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", title.bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if let Some(database) = &report.database_id {
        println!("Database: {}", database);
    }
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Rows:     {}", report.summary.rows);
    println!("  Records:  {}", report.summary.records);

    if report.summary.skipped > 0 {
        println!("  Skipped:  {}", report.summary.skipped.to_string().red());
    } else {
        println!("  Skipped:  {}", report.summary.skipped);
    }

    if report.summary.errors > 0 {
        println!("  Errors:   {}", report.summary.errors.to_string().red().bold());
    } else {
        println!("  Errors:   {}", report.summary.errors.to_string().green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", report.summary.warnings.to_string().yellow());
    } else {
        println!("  Warnings: {}", report.summary.warnings.to_string().green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

            if let Some(row) = &diag.row_id {
                println!("    row: {}", row);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
