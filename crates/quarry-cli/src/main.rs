//! quarry CLI
//!
//! Command-line tool for compiling builder queries and running SQL scripts
//! against the in-memory interpreter.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use quarry_core::Grammar;
use quarry_cli::{
    SelectOptions, compile_select, list_connections, load_config, parse_filter, parse_order,
    read_script, run_script,
};

/// Query builder and in-memory SQL runner.
#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON database configuration file.
    #[arg(short, long, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    /// Connection name (the configured default if not specified).
    #[arg(long)]
    connection: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run `;`-separated statements and print result rows as JSON lines.
    Run {
        /// Script file (stdin if not specified).
        file: Option<PathBuf>,
    },

    /// Compile a SELECT and print its text and bindings.
    Compile {
        /// Dialect: generic, mysql or literal.
        #[arg(short, long, default_value = "generic")]
        dialect: String,

        /// Table to select from.
        #[arg(short, long)]
        table: String,

        /// Equality filter as column=value (repeatable).
        #[arg(short = 'w', long = "where", value_name = "COLUMN=VALUE")]
        filters: Vec<String>,

        /// Ordering as column or column:desc (repeatable).
        #[arg(short = 'o', long = "order", value_name = "COLUMN[:DIR]")]
        orders: Vec<String>,

        /// Maximum number of rows.
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Render bindings into the SQL text.
        #[arg(long)]
        inline: bool,

        /// Print the result as a JSON object.
        #[arg(long)]
        json: bool,
    },

    /// List configured connections.
    Connections,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Run { file } => {
            let script = read_script(file.as_ref())?;
            let mut manager = quarry_memory::manager(config);
            let connection = manager.connection(cli.connection.as_deref())?;
            let summary = run_script(connection, &script, &mut stdout)?;
            info!(
                statements = summary.statements,
                rows = summary.rows,
                affected = summary.affected,
                "Script finished."
            );
        }

        Commands::Compile {
            dialect,
            table,
            filters,
            orders,
            limit,
            inline,
            json,
        } => {
            let grammar: Grammar = dialect.parse()?;
            let options = SelectOptions {
                table,
                filters: filters
                    .iter()
                    .map(|raw| parse_filter(raw))
                    .collect::<Result<_, _>>()?,
                orders: orders
                    .iter()
                    .map(|raw| parse_order(raw))
                    .collect::<Result<_, _>>()?,
                limit,
            };
            let compiled = compile_select(grammar, &options, inline)?;

            if json {
                writeln!(stdout, "{}", serde_json::to_string_pretty(&compiled)?)?;
            } else {
                writeln!(stdout, "{}", compiled.sql)?;
                if !compiled.bindings.is_empty() {
                    writeln!(stdout, "bindings: {}", serde_json::to_string(&compiled.bindings)?)?;
                }
            }
        }

        Commands::Connections => {
            if config.connections.is_empty() {
                info!("No connections configured.");
            } else {
                list_connections(&config, &mut stdout)?;
            }
        }
    }

    Ok(())
}
