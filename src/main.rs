mod cli;
mod db;
mod error;
mod export;
mod filter;
mod fmt;
mod grouping;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod settings;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            kind,
            amount,
            category,
            description,
            date,
        } => cli::transactions::add(&kind, &amount, &category, description.as_deref(), date.as_deref()),
        Commands::Update {
            id,
            kind,
            amount,
            category,
            description,
            date,
        } => cli::transactions::update(
            id,
            kind.as_deref(),
            amount.as_deref(),
            category,
            description,
            date.as_deref(),
        ),
        Commands::Delete { id } => cli::transactions::delete(id),
        Commands::List { filter } => cli::transactions::list(&filter),
        Commands::Summary { filter } => cli::report::summary(&filter),
        Commands::Group {
            period,
            order,
            filter,
        } => cli::report::group(&period, &order, &filter),
        Commands::Categories => cli::report::categories(),
        Commands::Analyze { category, period } => cli::report::analyze(&category, &period),
        Commands::Export {
            format,
            filter,
            output_dir,
        } => cli::export::run(&format, &filter, output_dir).map(|_| ()),
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        tracing::debug!(class = ?e.class(), "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
