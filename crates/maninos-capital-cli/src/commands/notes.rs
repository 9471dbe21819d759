use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use maninos_capital_core::notes::coverage::{self, CoverageInput};
use maninos_capital_core::notes::detail::{self, NoteDetailInput};
use maninos_capital_core::notes::payoff::{self, PayoffInput};
use maninos_capital_core::notes::schedule::{self, ScheduleInput};
use maninos_capital_core::notes::status::{self, StatusInput};
use maninos_capital_core::notes::PromissoryNote;

use crate::input;

/// Note terms given as flags instead of an input document
#[derive(Args)]
pub struct NoteFlags {
    /// Principal lent
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Simple annual rate in percent (12 = 12%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Contractual term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Cumulative amount paid so far
    #[arg(long)]
    pub paid_amount: Option<Decimal>,

    /// Disbursement date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl NoteFlags {
    pub fn to_note(&self) -> Result<PromissoryNote, Box<dyn std::error::Error>> {
        let loan_amount = self
            .loan_amount
            .ok_or("--loan-amount is required (or provide --input)")?;
        let annual_rate = self
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?;
        let term_months = self
            .term_months
            .ok_or("--term-months is required (or provide --input)")?;

        Ok(PromissoryNote {
            id: None,
            lender: None,
            loan_amount,
            annual_rate,
            term_months,
            paid_amount: self.paid_amount.unwrap_or(Decimal::ZERO),
            start_date: self.start_date,
        })
    }
}

/// Arguments for the note schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub note: NoteFlags,

    /// Include the month-0 disbursement row
    #[arg(long)]
    pub include_disbursement: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::read_input(args.input.as_deref())? {
        Some(doc) => doc,
        None => ScheduleInput {
            note: args.note.to_note()?,
            include_disbursement: args.include_disbursement,
        },
    };
    let result = schedule::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for per-month payment status
#[derive(Args)]
pub struct StatusArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub note: NoteFlags,

    /// Include the month-0 disbursement row
    #[arg(long)]
    pub include_disbursement: bool,
}

pub fn run_status(args: StatusArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let status_input: StatusInput = match input::read_input(args.input.as_deref())? {
        Some(doc) => doc,
        None => StatusInput {
            note: args.note.to_note()?,
            include_disbursement: args.include_disbursement,
        },
    };
    let result = status::classify_payments(&status_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the months-to-payoff calculator
#[derive(Args)]
pub struct PayoffArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub note: NoteFlags,

    /// Proposed flat monthly payment
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,

    /// Count payoff months from this date (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input: PayoffInput = match input::read_input(args.input.as_deref())? {
        Some(doc) => doc,
        None => PayoffInput {
            note: args.note.to_note()?,
            monthly_payment: args
                .monthly_payment
                .ok_or("--monthly-payment is required (or provide --input)")?,
            as_of: args.as_of,
        },
    };
    let result = payoff::calculate_payoff(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the monthly-coverage counter
#[derive(Args)]
pub struct CoverageArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub note: NoteFlags,
}

pub fn run_coverage(args: CoverageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let coverage_input: CoverageInput = match input::read_input(args.input.as_deref())? {
        Some(doc) => doc,
        None => CoverageInput {
            note: args.note.to_note()?,
        },
    };
    let result = coverage::calculate_coverage(&coverage_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the full note detail snapshot
#[derive(Args)]
pub struct NoteArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub note: NoteFlags,

    /// Include the month-0 disbursement row
    #[arg(long)]
    pub include_disbursement: bool,

    /// What-if monthly payment for the payoff plan
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,
}

pub fn run_note(args: NoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let detail_input: NoteDetailInput = match input::read_input(args.input.as_deref())? {
        Some(doc) => doc,
        None => NoteDetailInput {
            note: args.note.to_note()?,
            include_disbursement: args.include_disbursement,
            monthly_payment: args.monthly_payment,
        },
    };
    let result = detail::note_detail(&detail_input)?;
    Ok(serde_json::to_value(result)?)
}
