mod commands;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use finvision::logging::{init_tracing, LogFormat, LoggingOptions};
use finvision::ledger::{TransactionEdit, TransactionType};
use finvision::BatchPolicy;
use log::info;

use state::AppState;

#[derive(Parser)]
#[command(name = "finvision", version, about = "Extract transactions from receipts and invoices")]
struct Cli {
    /// Config file (defaults to ~/.finvision/config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue documents for extraction and store the resulting transactions
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// income, expense or auto
        #[arg(long, default_value_t = BatchPolicy::Auto)]
        policy: BatchPolicy,

        /// Treat paths as dropped files: skip the image/PDF filter
        #[arg(long)]
        dropped: bool,
    },
    /// List stored transactions
    List {
        /// Case-insensitive vendor or category filter
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Correct fields of a stored transaction
    Edit {
        id: String,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        vendor: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        category: Option<String>,

        /// income or expense
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },
    /// Delete a transaction by id
    Delete { id: String },
    /// List uploaded documents
    Documents {
        #[arg(long)]
        json: bool,
    },
    /// Write transactions as CSV
    Export {
        /// Output file (defaults to FinVision_Export_<date>.csv)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        search: Option<String>,
    },
    /// Show revenue, expense and profit totals
    Stats {
        /// Only count transactions matching this vendor or category filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = LoggingOptions {
        format: if cli.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..LoggingOptions::default()
    };
    init_tracing(&logging)?;

    info!("Starting FinVision v{}", env!("CARGO_PKG_VERSION"));

    let config = AppState::load_config(cli.config.as_deref())?;

    let state = AppState::open(config);

    match cli.command {
        Command::Upload {
            paths,
            policy,
            dropped,
        } => commands::upload::run(&state, paths, policy, dropped).await,
        Command::List { search, json } => {
            commands::transactions::list(&state, search.as_deref(), json)
        }
        Command::Edit {
            id,
            date,
            vendor,
            amount,
            category,
            kind,
        } => {
            let edit = TransactionEdit {
                date,
                vendor,
                amount,
                category,
                kind,
            };
            commands::transactions::edit(&state, &id, edit)
        }
        Command::Delete { id } => commands::transactions::delete(&state, &id),
        Command::Documents { json } => commands::transactions::documents(&state, json),
        Command::Export { out, search } => commands::export::run(&state, out, search.as_deref()),
        Command::Stats { search } => commands::stats::show(&state, search.as_deref()),
        Command::Config => commands::config::show(&state),
    }
}
