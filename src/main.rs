//! Blockdex CLI - prepares the storage schema for a blockchain indexer

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use blockdex::config::{self, BlockdexConfig};
use blockdex::storage::{SchemaStatus, schema};
use blockdex::ui::{self, Icons};
use blockdex::{EntityKind, SqliteCatalog, initialize_schema};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "blockdex")]
#[command(version)]
#[command(about = "Schema bootstrap for blockchain indexer storage")]
#[command(long_about = r#"
Blockdex creates the relations a blockchain indexer writes into
(block_refs, transaction_refs, transactions, continues_indexed_rounds,
blocks, logs). Creation is idempotent: existing relations are left alone.

Example usage:
  blockdex init --database ./index.db
  blockdex status --database ./index.db
  blockdex schema
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create any missing relations
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Record the database path in the config file
        #[arg(long)]
        save_config: bool,

        /// Overwrite an existing config file
        #[arg(long, requires = "save_config")]
        force: bool,
    },

    /// Show which relations exist and how many rows they hold
    Status {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Only report these relations (e.g. `logs`, `Block`)
        #[arg(short, long)]
        relation: Vec<String>,
    },

    /// Print the DDL for every relation
    Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

fn emit_success(mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        let body = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);

    match cli.command {
        Commands::Init { database, save_config, force } => {
            let db_path = config::database_path_for(database, &config_path)?;
            run_init(output_mode, &db_path)?;
            if save_config {
                let cfg = BlockdexConfig {
                    database: Some(db_path.to_string_lossy().to_string()),
                };
                config::write_config(&config_path, &cfg, force)?;
                tracing::info!("Wrote config to {}", config_path.display());
            }
        }
        Commands::Status { database, relation } => {
            let db_path = config::database_path_for(database, &config_path)?;
            let kinds = relation
                .iter()
                .map(|name| name.parse::<EntityKind>())
                .collect::<blockdex::Result<Vec<_>>>()?;
            run_status(output_mode, &db_path, &kinds)?;
        }
        Commands::Schema => run_schema(output_mode)?,
    }

    Ok(())
}

fn run_init(output_mode: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    tracing::info!("Initializing schema in {}", db_path.display());
    config::ensure_db_dir(db_path)?;

    let catalog = SqliteCatalog::open(db_path)?;
    let before = catalog.status()?;
    initialize_schema(&catalog)?;
    let after = catalog.status()?;

    let created: Vec<&str> = before.missing();
    tracing::info!("Created {} relation(s)", created.len());

    if output_mode.is_human() {
        ui::header("Schema initialized");
        ui::info(&format!("{} Database", Icons::DATABASE), &db_path.display().to_string());
        if created.is_empty() {
            ui::success("All relations already present");
        } else {
            ui::success(&format!("Created: {}", created.join(", ")));
        }
        print_relations(&after);
    } else {
        let data = serde_json::json!({
            "database": db_path.display().to_string(),
            "created": created,
            "status": after,
        });
        emit_success(output_mode, "init", data)?;
    }
    Ok(())
}

fn run_status(output_mode: OutputMode, db_path: &Path, kinds: &[EntityKind]) -> anyhow::Result<()> {
    if !db_path.exists() {
        anyhow::bail!("database not found at {} (run `blockdex init` first)", db_path.display());
    }

    let catalog = SqliteCatalog::open_read_only(db_path)?;
    let mut status = catalog.status()?;
    if !kinds.is_empty() {
        status = status.only(kinds);
    }

    if output_mode.is_human() {
        ui::info(&format!("{} Database", Icons::DATABASE), &db_path.display().to_string());
        println!("{}", ui::status_table(&status));
        if status.is_complete() {
            ui::success("Schema complete");
        } else {
            println!("{}", ui::dim("Run `blockdex init` to create missing relations."));
        }
    } else {
        let data = serde_json::json!({
            "database": db_path.display().to_string(),
            "complete": status.is_complete(),
            "status": status,
        });
        emit_success(output_mode, "status", data)?;
    }
    Ok(())
}

fn run_schema(output_mode: OutputMode) -> anyhow::Result<()> {
    let ddl = schema::render_schema();
    if output_mode.is_human() {
        print!("{}", ddl);
    } else {
        emit_success(output_mode, "schema", serde_json::json!({ "sql": ddl }))?;
    }
    Ok(())
}

fn print_relations(status: &SchemaStatus) {
    ui::section("Relations");
    for r in &status.relations {
        match r.rows {
            Some(rows) => ui::relation_present(r.relation, rows),
            None => ui::relation_missing(r.relation),
        }
    }
}
