use clap::Args;
use serde_json::Value;

use maninos_capital_core::portfolio::book::{self, PortfolioInput};

use crate::input;

/// Arguments for the note book roll-up
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON/YAML input file ({ notes: [{ note, payments }] })
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let book_input: PortfolioInput = input::read_input(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for the portfolio summary")?;
    let result = book::summarize_portfolio(&book_input)?;
    Ok(serde_json::to_value(result)?)
}
