pub mod demo;
pub mod export;
pub mod init;
pub mod report;
pub mod status;
pub mod transactions;

use clap::{Args, Parser, Subcommand};

use crate::db::Store;
use crate::error::Result;
use crate::filter::{filter, TimeWindow};
use crate::models::Transaction;
use crate::settings::Settings;

pub(crate) fn open_store(settings: &Settings) -> Result<Store> {
    std::fs::create_dir_all(&settings.data_dir)?;
    Store::open(&settings.db_path())
}

/// Fresh snapshot from the store, narrowed by the filter options.
pub(crate) fn filtered_snapshot(store: &Store, opts: &FilterArgs) -> Result<Vec<Transaction>> {
    let window: TimeWindow = opts.window.parse()?;
    let all = store.list_all()?;
    let now = chrono::Local::now().naive_local();
    let query = opts.search.as_deref().unwrap_or("").trim();
    Ok(filter(&all, query, window, now))
}

/// Human-readable description of the active filter.
pub(crate) fn filter_label(opts: &FilterArgs) -> Result<String> {
    let window: TimeWindow = opts.window.parse()?;
    Ok(match opts.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(q) => format!("{} matching \"{q}\"", window.label()),
        None => window.label().to_string(),
    })
}

#[derive(Parser)]
#[command(name = "tally", about = "Track income and expenses, summarize them by period, export reports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Case-insensitive text to match against category or description
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// Time window: all, week, month, year
    #[arg(long, short = 'w', default_value = "all")]
    pub window: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record a new income or expense.
    Add {
        /// income or expense
        kind: String,
        /// Amount, e.g. 42.50
        amount: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
        /// Date: YYYY-MM-DD or "YYYY-MM-DD HH:MM" (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// Replace fields of an existing transaction.
    Update {
        /// Transaction ID (shown in `tally list`)
        id: i64,
        /// New type: income or expense
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction by ID.
    Delete {
        /// Transaction ID (shown in `tally list`)
        id: i64,
    },
    /// List transactions, newest first.
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Income, expense and net balance.
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Totals per week, month or year.
    Group {
        /// Period: week, month, year
        #[arg(default_value = "month")]
        period: String,
        /// Bucket order: period (newest first) or label
        #[arg(long, default_value = "period")]
        order: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Categories currently in use.
    Categories,
    /// Totals for one category, broken down by period.
    Analyze {
        /// Category name (exact, case-sensitive)
        category: String,
        /// Period: week, month, year
        #[arg(long = "by", default_value = "month")]
        period: String,
    },
    /// Export transactions with their summary to PDF, XLSX or CSV.
    Export {
        /// Format: pdf, xlsx, csv
        format: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output directory (default: <data_dir>/exports)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
    /// Load sample transactions to explore tally.
    Demo,
    /// Show current database and summary statistics.
    Status,
}
