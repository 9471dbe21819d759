mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::notes::{CoverageArgs, NoteArgs, PayoffArgs, ScheduleArgs, StatusArgs};
use commands::payments::{PayArgs, PaymentsArgs};
use commands::portfolio::PortfolioArgs;

/// Promissory-note schedules, payoff plans and portfolio reporting
#[derive(Parser)]
#[command(
    name = "mcap",
    version,
    about = "Promissory-note schedules, payoff plans and portfolio reporting",
    long_about = "A CLI for the Maninos capital note engine. Computes simple-interest \
                  schedules, per-month payment status, months-to-payoff plans, \
                  interest coverage, payment ledgers and note book roll-ups \
                  with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Month-by-month schedule (CSV output is the schedule export)
    Schedule(ScheduleArgs),
    /// Classify each month as paid, partial or pending
    Status(StatusArgs),
    /// Months to pay off the remaining balance at a flat monthly payment
    Payoff(PayoffArgs),
    /// Whole months of interest covered by payments so far
    Coverage(CoverageArgs),
    /// Full note detail: terms, schedule with status, banner figures
    Note(NoteArgs),
    /// Apply a payment ledger to a note
    Payments(PaymentsArgs),
    /// Record a single payment against a note
    Pay(PayArgs),
    /// Roll up a book of notes for capital reporting
    Portfolio(PortfolioArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::notes::run_schedule(args),
        Commands::Status(args) => commands::notes::run_status(args),
        Commands::Payoff(args) => commands::notes::run_payoff(args),
        Commands::Coverage(args) => commands::notes::run_coverage(args),
        Commands::Note(args) => commands::notes::run_note(args),
        Commands::Payments(args) => commands::payments::run_payments(args),
        Commands::Pay(args) => commands::payments::run_pay(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Version => {
            println!("mcap {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
