use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use syncdiff::presentation::cli_summary::{
    print_data_summary, print_perf_summary, print_schema_summary, print_sync_tables,
};
use syncdiff::presentation::writers::{all_writers, write_to_file, writer_for};
use syncdiff::{AppConfig, Changeset, ChangesetKind, ConnectionConfig, LogLevel, TableDefinition};

#[derive(Parser, Debug)]
#[command(
    name = "syncdiff",
    about = "Compare two MySQL databases and generate the SQL that brings the target in line."
)]
struct Cli {
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Print the summary only; write no files.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Output format: sql, json or all.
    #[arg(short, long, default_value = "all", global = true)]
    format: String,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare table structure (columns, indexes) and emit DDL.
    Schema,
    /// Compare row data and emit DML.
    Data {
        /// Restrict to these tables (repeatable). Overrides `[data].tables`.
        #[arg(short, long = "table")]
        tables: Vec<String>,
    },
    /// List source tables with their primary key and row count.
    Tables,
    /// Render a CREATE TABLE from a TOML definition.
    CreateTable {
        #[arg(short, long)]
        definition: PathBuf,
        /// Execute the statement against the target database.
        #[arg(long)]
        apply: bool,
    },
    /// List the column types, engines and charsets accepted in a table definition.
    Types,
    /// List user databases on the target server.
    Databases,
    /// Create a database on the target server.
    CreateDatabase {
        name: String,
        #[arg(long)]
        charset: Option<String>,
        #[arg(long)]
        collation: Option<String>,
    },
    /// Drop a database on the target server.
    DropDatabase { name: String },
    /// Check that both configured databases are reachable.
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else if cli.quiet {
        LogLevel::Error
    } else {
        LogLevel::Info
    };
    syncdiff::init_tracing(level);

    if let Command::Types = cli.command {
        print_catalogue("Column types", syncdiff::COMMON_DATA_TYPES);
        print_catalogue("Engines", syncdiff::TABLE_ENGINES);
        print_catalogue("Charsets", syncdiff::CHARSETS);
        return Ok(());
    }

    let cfg = AppConfig::load(&cli.config)?;

    match &cli.command {
        Command::Schema => {
            let changeset = syncdiff::compare_schemas(&cfg).await?;
            print_schema_summary(&changeset);
            emit(&cli, &cfg, &changeset)?;
        }
        Command::Data { tables } => {
            let mut cfg = cfg.clone();
            if !tables.is_empty() {
                cfg.data.tables = tables.clone();
            }
            let (changeset, perf) = syncdiff::compare_data_with_timing(&cfg).await?;
            print_data_summary(&changeset);
            if cli.verbose {
                print_perf_summary(&perf);
            }
            emit(&cli, &cfg, &changeset)?;
        }
        Command::Tables => {
            let tables = syncdiff::list_sync_tables(&cfg.source).await?;
            print_sync_tables(&tables);
        }
        Command::CreateTable { definition, apply } => {
            let def = load_definition(definition)?;
            if *apply && !cli.dry_run {
                let sql = syncdiff::create_table(&cfg.target, &def).await?;
                println!("{sql}");
                let done = format!("Created `{}` on {}", def.name, cfg.target.database);
                println!("{}", done.green());
            } else {
                println!("{}", syncdiff::build_create_table_sql(&def));
            }
        }
        Command::Types => {}
        Command::Databases => {
            for name in syncdiff::list_databases(&cfg.target).await? {
                println!("{name}");
            }
        }
        Command::CreateDatabase {
            name,
            charset,
            collation,
        } => {
            syncdiff::create_database(&cfg.target, name, charset.as_deref(), collation.as_deref())
                .await?;
            println!("{}", format!("Created database `{}`", name).green());
        }
        Command::DropDatabase { name } => {
            syncdiff::drop_database(&cfg.target, name).await?;
            println!("{}", format!("Dropped database `{}`", name).red());
        }
        Command::Ping => {
            ping("source", &cfg.source).await;
            ping("target", &cfg.target).await;
        }
    }

    Ok(())
}

fn load_definition(path: &Path) -> Result<TableDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read table definition: {}", path.display()))?;
    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).with_context(|| "Failed to parse table definition JSON")
    } else {
        toml::from_str(&content).with_context(|| "Failed to parse table definition TOML")
    }
}

fn print_catalogue(title: &str, entries: &[&str]) {
    println!("{}", title.bold());
    println!("  {}", entries.join(", "));
}

async fn ping(label: &str, cfg: &ConnectionConfig) {
    match syncdiff::test_connection(cfg).await {
        Ok(()) => println!("{} {} ({})", "✓".green(), label, cfg.address()),
        Err(e) => println!("{} {} ({}): {}", "✗".red(), label, cfg.address(), e),
    }
}

/// Write the changeset under `<output.dir>/<kind>/<timestamp>_<id>/`.
fn emit(cli: &Cli, cfg: &AppConfig, changeset: &Changeset) -> Result<()> {
    if cli.dry_run || changeset.is_empty() {
        return Ok(());
    }

    let kind = match changeset.kind {
        ChangesetKind::Schema => "schema",
        ChangesetKind::Data => "data",
    };
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let output_subdir = Path::new(&cfg.output.dir)
        .join(kind)
        .join(format!("{}_{}", timestamp, changeset.changeset_id));
    let dir = output_subdir.to_string_lossy();

    match cli.format.as_str() {
        "all" => {
            for writer in all_writers() {
                write_to_file(&*writer, changeset, &dir)?;
            }
        }
        fmt => {
            let writer =
                writer_for(fmt).ok_or_else(|| anyhow::anyhow!("Unknown format: {}", fmt))?;
            write_to_file(&*writer, changeset, &dir)?;
        }
    }

    println!("Changeset written to {}", output_subdir.display());
    Ok(())
}
