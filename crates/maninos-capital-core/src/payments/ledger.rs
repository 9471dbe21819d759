//! Append-only payment ledger for promissory notes.
//!
//! The ledger is the only thing that moves a note's `paid_amount`, and it
//! only moves it upward: amounts must be positive and payments are
//! accepted in chronological order. Everything else about the note is
//! re-derived from the refreshed total.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::CapitalError;
use crate::notes::terms::{PromissoryNote, SettlementStatus, MAX_AMOUNT};
use crate::types::{checked_total, with_metadata, ComputationOutput, Money};
use crate::CapitalResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Cash,
    Check,
    Zelle,
    Wire,
    Other,
}

/// A single recorded payment against a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Bank reference, check number or similar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub paid_at: NaiveDate,
}

impl PaymentRecord {
    pub fn new(amount: Money, paid_at: NaiveDate) -> Self {
        PaymentRecord {
            amount,
            payment_method: PaymentMethod::default(),
            reference: None,
            paid_at,
        }
    }
}

/// Chronological, append-only list of payments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentLedger {
    payments: Vec<PaymentRecord>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from payments in any order; ties keep input order.
    pub fn from_payments(mut payments: Vec<PaymentRecord>) -> CapitalResult<Self> {
        payments.sort_by_key(|p| p.paid_at);
        let mut ledger = Self::new();
        for payment in payments {
            ledger.record(payment)?;
        }
        Ok(ledger)
    }

    /// Append a payment and return the new ledger total.
    pub fn record(&mut self, payment: PaymentRecord) -> CapitalResult<Money> {
        if payment.amount <= Decimal::ZERO {
            return Err(CapitalError::invalid(
                "amount",
                format!("Payment amount must be positive, got {}", payment.amount),
            ));
        }
        if payment.amount > MAX_AMOUNT {
            return Err(CapitalError::invalid(
                "amount",
                format!("Payment amount cannot exceed {MAX_AMOUNT}"),
            ));
        }
        if let Some(last) = self.payments.last() {
            if payment.paid_at < last.paid_at {
                return Err(CapitalError::DateError(format!(
                    "payment dated {} precedes last recorded payment {}",
                    payment.paid_at, last.paid_at
                )));
            }
        }
        let total = checked_total(self.paid_amount(), payment.amount, "amount")?;
        self.payments.push(payment);
        Ok(total)
    }

    pub fn paid_amount(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn last_payment_date(&self) -> Option<NaiveDate> {
        self.payments.last().map(|p| p.paid_at)
    }

    /// Date of the payment that carried the running total (starting at
    /// `opening`) from below `target` to at least `target`.
    ///
    /// `None` when `opening` already meets `target` or the ledger never
    /// reaches it.
    pub fn date_reaching(&self, opening: Money, target: Money) -> Option<NaiveDate> {
        if opening >= target {
            return None;
        }
        let mut running = opening;
        self.payments.iter().find_map(|p| {
            running += p.amount;
            (running >= target).then_some(p.paid_at)
        })
    }
}

// ---------------------------------------------------------------------------
// Ledger reconciliation
// ---------------------------------------------------------------------------

/// A note plus payments recorded since its `paid_amount` was last refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInput {
    pub note: PromissoryNote,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub paid_at: NaiveDate,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub cumulative_paid: Money,
    pub remaining_after: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerOutput {
    /// The note with `paid_amount` refreshed.
    pub note: PromissoryNote,
    pub opening_paid: Money,
    pub payment_count: usize,
    pub ledger_total: Money,
    pub paid_amount: Money,
    pub total_due: Money,
    pub remaining_total: Money,
    pub status: SettlementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_on: Option<NaiveDate>,
    pub overpayment: Money,
    pub entries: Vec<LedgerEntry>,
}

/// Apply payments to a note and report the refreshed balance.
///
/// The note's own `paid_amount` is the opening balance; payments are
/// sorted by date and added on top.
pub fn apply_payments(input: &LedgerInput) -> CapitalResult<ComputationOutput<LedgerOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.note.validate()?;
    let ledger = PaymentLedger::from_payments(input.payments.clone())?;

    let terms = input.note.terms();
    let opening_paid = input.note.paid_amount;
    let ledger_total = ledger.paid_amount();
    let paid_amount = checked_total(opening_paid, ledger_total, "payments")?;

    let mut cumulative = opening_paid;
    let entries: Vec<LedgerEntry> = ledger
        .payments()
        .iter()
        .map(|p| {
            cumulative += p.amount;
            LedgerEntry {
                paid_at: p.paid_at,
                amount: p.amount,
                payment_method: p.payment_method,
                reference: p.reference.clone(),
                cumulative_paid: cumulative,
                remaining_after: terms.remaining_total(cumulative),
            }
        })
        .collect();

    let overpayment = (paid_amount - terms.total_due).max(Decimal::ZERO);
    if overpayment > Decimal::ZERO {
        warn!(%overpayment, "note overpaid");
        warnings.push(format!("Payments exceed total due by {overpayment}"));
    }

    if let (Some(first), Some(start_date)) = (ledger.payments().first(), input.note.start_date) {
        if first.paid_at < start_date {
            warnings.push(format!(
                "Payment dated {} precedes disbursement {start_date}",
                first.paid_at
            ));
        }
    }

    let status = terms.status(paid_amount);
    let settled_on = match status {
        SettlementStatus::Settled => ledger.date_reaching(opening_paid, terms.total_due),
        SettlementStatus::Active => None,
    };

    debug!(
        payments = ledger.len(),
        paid = %paid_amount,
        "applied payments to note"
    );

    let output = LedgerOutput {
        note: input.note.clone().with_paid_amount(paid_amount),
        opening_paid,
        payment_count: ledger.len(),
        ledger_total,
        paid_amount,
        total_due: terms.total_due,
        remaining_total: terms.remaining_total(paid_amount),
        status,
        settled_on,
        overpayment,
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Append-only payment ledger against simple-interest total due",
        &serde_json::json!({
            "opening_paid": opening_paid.to_string(),
            "payments": ledger.len(),
            "total_due": terms.total_due.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Single payment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentInput {
    pub note: PromissoryNote,
    pub payment: PaymentRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentOutput {
    pub note: PromissoryNote,
    pub applied: Money,
    pub remaining_total: Money,
    pub status: SettlementStatus,
    pub overpayment: Money,
}

/// Record one payment against a note, as the pay endpoint does.
pub fn record_payment(
    input: &RecordPaymentInput,
) -> CapitalResult<ComputationOutput<RecordPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.note.validate()?;
    let mut ledger = PaymentLedger::new();
    let applied = ledger.record(input.payment.clone())?;

    let terms = input.note.terms();
    let paid_amount = checked_total(input.note.paid_amount, applied, "amount")?;
    if input.note.paid_amount >= terms.total_due {
        warnings.push("Note was already settled before this payment".into());
    }
    let overpayment = (paid_amount - terms.total_due).max(Decimal::ZERO);
    if overpayment > Decimal::ZERO {
        warnings.push(format!("Payment exceeds remaining balance by {overpayment}"));
    }

    let output = RecordPaymentOutput {
        note: input.note.clone().with_paid_amount(paid_amount),
        applied,
        remaining_total: terms.remaining_total(paid_amount),
        status: terms.status(paid_amount),
        overpayment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Single payment applied to cumulative paid amount",
        &serde_json::json!({
            "amount": input.payment.amount.to_string(),
            "paid_at": input.payment.paid_at,
        }),
        warnings,
        elapsed,
        output,
    ))
}
