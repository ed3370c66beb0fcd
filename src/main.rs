use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod charts;
mod concentration;
mod config;
mod dashboard;
mod distribution;
mod geography;
mod loader;
mod models;
mod pipeline;
mod professions;
mod report;
mod segmentation;
mod server;
mod stats;

#[derive(Parser)]
#[command(name = "invoice-insights")]
#[command(about = "Product, geography and basket analytics over an invoice log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Invoice log with product_id, email, city, job, invoice_date, qty, amount columns
    #[arg(long, default_value = "data/invoices.csv")]
    csv: PathBuf,
    /// JSON file overriding analysis parameters
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard over HTTP
    Serve {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, default_value_t = 8051)]
        port: u16,
    },
    /// Write the dashboard as a standalone HTML file
    Render {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "dashboard.html")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { input, host, port } => {
            let config = config::load_config(input.config.as_deref())?;
            server::run(&input.csv, SocketAddr::new(host, port), &config).await?;
        }
        Commands::Render { input, out } => {
            let config = config::load_config(input.config.as_deref())?;
            let (table, analyses) = pipeline::prepare(&input.csv, &config)?;
            let page = dashboard::render_page(&table, &analyses, &config);
            std::fs::write(&out, page)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!("Dashboard written to {}", out.display());
        }
        Commands::Report { input, out } => {
            let config = config::load_config(input.config.as_deref())?;
            let (table, analyses) = pipeline::prepare(&input.csv, &config)?;
            let report = report::build_report(&table, &analyses);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!("Report written to {}", out.display());
        }
    }

    Ok(())
}
