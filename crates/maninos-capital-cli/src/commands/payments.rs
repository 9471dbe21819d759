use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use maninos_capital_core::payments::ledger::{self, LedgerInput, RecordPaymentInput};
use maninos_capital_core::payments::{PaymentMethod, PaymentRecord};

use crate::commands::notes::NoteFlags;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    BankTransfer,
    Cash,
    Check,
    Zelle,
    Wire,
    Other,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::BankTransfer => PaymentMethod::BankTransfer,
            MethodArg::Cash => PaymentMethod::Cash,
            MethodArg::Check => PaymentMethod::Check,
            MethodArg::Zelle => PaymentMethod::Zelle,
            MethodArg::Wire => PaymentMethod::Wire,
            MethodArg::Other => PaymentMethod::Other,
        }
    }
}

/// Arguments for applying a payment ledger to a note
#[derive(Args)]
pub struct PaymentsArgs {
    /// Path to JSON/YAML input file ({ note, payments })
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_payments(args: PaymentsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ledger_input: LedgerInput = input::read_input(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for the payment ledger")?;
    let result = ledger::apply_payments(&ledger_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for recording a single payment
#[derive(Args)]
pub struct PayArgs {
    /// Path to JSON/YAML input file ({ note, payment })
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub note: NoteFlags,

    /// Payment amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Payment method
    #[arg(long, value_enum, default_value = "bank-transfer")]
    pub method: MethodArg,

    /// Bank reference or check number
    #[arg(long)]
    pub reference: Option<String>,

    /// Payment date (YYYY-MM-DD)
    #[arg(long)]
    pub paid_at: Option<NaiveDate>,
}

pub fn run_pay(args: PayArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pay_input: RecordPaymentInput = match input::read_input(args.input.as_deref())? {
        Some(doc) => doc,
        None => RecordPaymentInput {
            note: args.note.to_note()?,
            payment: PaymentRecord {
                amount: args.amount.ok_or("--amount is required (or provide --input)")?,
                payment_method: args.method.into(),
                reference: args.reference,
                paid_at: args.paid_at.ok_or("--paid-at is required (or provide --input)")?,
            },
        },
    };
    let result = ledger::record_payment(&pay_input)?;
    Ok(serde_json::to_value(result)?)
}
