//! Row-store health check
//!
//! Probes the lesson tables and auth session of the configured row-store.
//!
//! Usage: querylab-health [--config-dir DIR]

use clap::Parser;
use colored::Colorize;
use querylab::{check, Config, HttpRowStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "querylab-health")]
#[command(about = "Check connectivity to the querylab row-store", long_about = None)]
struct Args {
    /// Directory holding querylab.toml and .env
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "querylab=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = match Config::load(&args.config_dir).and_then(|c| c.require_rowstore()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    println!("Checking {}...", settings.url.white());
    let store = HttpRowStore::new(&settings);
    let report = check(&store);

    for item in &report.items {
        let mark = if item.passed {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {:<18} {}", mark, item.name, item.detail.dimmed());
    }

    if report.all_passed() {
        println!("{}", "All checks passed".green());
    } else {
        println!(
            "{}",
            format!("{} check(s) failed", report.failures().count()).red()
        );
    }
    ExitCode::SUCCESS
}
