//! Note book roll-up for capital and investor reporting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::CapitalError;
use crate::notes::coverage::monthly_coverage;
use crate::notes::terms::{PromissoryNote, SettlementStatus};
use crate::payments::ledger::{PaymentLedger, PaymentRecord};
use crate::types::{
    capped_percent, checked_total, with_metadata, ComputationOutput, Money, Months, Percent,
};
use crate::CapitalResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A note in the book, with payments not yet folded into `paid_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEntry {
    pub note: PromissoryNote,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub notes: Vec<BookEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    pub loan_amount: Money,
    pub annual_rate: Percent,
    pub term_months: Months,
    pub total_due: Money,
    pub paid_amount: Money,
    pub outstanding: Money,
    pub months_paid: Months,
    pub status: SettlementStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOutput {
    pub note_count: usize,
    pub active_count: usize,
    pub settled_count: usize,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_due: Money,
    pub total_collected: Money,
    pub total_outstanding: Money,
    /// Principal-weighted average annual rate, percentage points.
    pub weighted_avg_rate: Percent,
    /// Collected as a share of total due, percent.
    pub collection_pct: Decimal,
    pub lines: Vec<NoteLine>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Roll up a book of notes into capital-reporting totals.
pub fn summarize_portfolio(
    input: &PortfolioInput,
) -> CapitalResult<ComputationOutput<PortfolioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.notes.is_empty() {
        return Err(CapitalError::InsufficientData(
            "Portfolio summary requires at least one note".into(),
        ));
    }

    let mut lines: Vec<NoteLine> = Vec::with_capacity(input.notes.len());
    let mut total_principal = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut total_due = Decimal::ZERO;
    let mut total_collected = Decimal::ZERO;
    let mut total_outstanding = Decimal::ZERO;
    let mut rate_weight = Decimal::ZERO;

    for (idx, entry) in input.notes.iter().enumerate() {
        let note = &entry.note;
        note.validate().map_err(|e| match e {
            CapitalError::InvalidInput { field, reason } => CapitalError::InvalidInput {
                field: format!("notes[{idx}].{field}"),
                reason,
            },
            other => other,
        })?;

        let ledger = PaymentLedger::from_payments(entry.payments.clone())?;
        let paid_amount = checked_total(note.paid_amount, ledger.paid_amount(), "payments")?;
        let terms = note.terms();
        let outstanding = terms.remaining_total(paid_amount);

        if paid_amount > terms.total_due {
            warnings.push(format!(
                "{} overpaid by {}",
                note_label(note, idx),
                paid_amount - terms.total_due
            ));
        }

        total_principal = checked_total(total_principal, terms.loan_amount, "total_principal")?;
        total_interest = checked_total(total_interest, terms.total_interest, "total_interest")?;
        total_due = checked_total(total_due, terms.total_due, "total_due")?;
        total_collected = checked_total(total_collected, paid_amount, "total_collected")?;
        total_outstanding = checked_total(total_outstanding, outstanding, "total_outstanding")?;
        // Bounded by MAX_AMOUNT * MAX_ANNUAL_RATE per note
        rate_weight = checked_total(
            rate_weight,
            terms.loan_amount * terms.annual_rate,
            "annual_rate",
        )?;

        lines.push(NoteLine {
            id: note.id.clone(),
            lender: note.lender.clone(),
            loan_amount: terms.loan_amount,
            annual_rate: terms.annual_rate,
            term_months: terms.term_months,
            total_due: terms.total_due,
            paid_amount,
            outstanding,
            months_paid: monthly_coverage(&terms, paid_amount).months_paid,
            status: terms.status(paid_amount),
        });
    }

    // Validated notes have positive principal, so both totals are positive.
    let weighted_avg_rate = rate_weight
        .checked_div(total_principal)
        .ok_or_else(|| CapitalError::DivisionByZero {
            context: "principal-weighted average rate".into(),
        })?
        .round_dp(4);
    let collection_pct = capped_percent(total_collected, total_due);

    let settled_count = lines
        .iter()
        .filter(|l| l.status == SettlementStatus::Settled)
        .count();

    debug!(notes = lines.len(), settled_count, "summarized note book");

    let output = PortfolioOutput {
        note_count: lines.len(),
        active_count: lines.len() - settled_count,
        settled_count,
        total_principal,
        total_interest,
        total_due,
        total_collected,
        total_outstanding,
        weighted_avg_rate,
        collection_pct,
        lines,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Promissory note book roll-up",
        &serde_json::json!({ "notes": input.notes.len() }),
        warnings,
        elapsed,
        output,
    ))
}

fn note_label(note: &PromissoryNote, idx: usize) -> String {
    note.id
        .clone()
        .unwrap_or_else(|| format!("notes[{idx}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::terms::{MAX_AMOUNT, MAX_ANNUAL_RATE, MAX_TERM_MONTHS};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(loan: Money, rate: Percent, term: Months, paid: Money) -> BookEntry {
        BookEntry {
            note: PromissoryNote::new(loan, rate, term).with_paid_amount(paid),
            payments: vec![],
        }
    }

    #[test]
    fn test_totals_and_counts() {
        let input = PortfolioInput {
            notes: vec![
                entry(dec!(100000), dec!(12), 12, dec!(5000)),
                entry(dec!(50000), dec!(10), 12, dec!(55000)),
            ],
        };
        let out = summarize_portfolio(&input).unwrap().result;
        assert_eq!(out.note_count, 2);
        assert_eq!(out.settled_count, 1);
        assert_eq!(out.active_count, 1);
        assert_eq!(out.total_principal, dec!(150000));
        assert_eq!(out.total_interest, dec!(17000));
        assert_eq!(out.total_due, dec!(167000));
        assert_eq!(out.total_collected, dec!(60000));
        assert_eq!(out.total_outstanding, dec!(107000));
        // (100000*12 + 50000*10) / 150000
        assert_eq!(out.weighted_avg_rate, dec!(11.3333));
    }

    #[test]
    fn test_payments_folded_in() {
        let mut e = entry(dec!(10000), dec!(12), 12, Decimal::ZERO);
        e.payments = vec![
            PaymentRecord::new(dec!(300), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            PaymentRecord::new(dec!(200), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
        ];
        let out = summarize_portfolio(&PortfolioInput { notes: vec![e] })
            .unwrap()
            .result;
        assert_eq!(out.lines[0].paid_amount, dec!(500));
        assert_eq!(out.lines[0].months_paid, 5);
    }

    #[test]
    fn test_empty_book_error() {
        assert!(summarize_portfolio(&PortfolioInput { notes: vec![] }).is_err());
    }

    #[test]
    fn test_out_of_range_note_is_an_error() {
        let input = PortfolioInput {
            notes: vec![
                entry(dec!(1000), dec!(12), 12, Decimal::ZERO),
                entry(
                    Decimal::from_i128_with_scale(10_i128.pow(27), 0),
                    dec!(1000),
                    120,
                    Decimal::ZERO,
                ),
            ],
        };
        let err = summarize_portfolio(&input).unwrap_err();
        assert!(err.to_string().contains("notes[1].loan_amount"));
    }

    #[test]
    fn test_largest_book_entries_sum_without_overflow() {
        let input = PortfolioInput {
            notes: vec![
                entry(MAX_AMOUNT, MAX_ANNUAL_RATE, MAX_TERM_MONTHS, MAX_AMOUNT),
                entry(MAX_AMOUNT, MAX_ANNUAL_RATE, MAX_TERM_MONTHS, MAX_AMOUNT),
            ],
        };
        let out = summarize_portfolio(&input).unwrap().result;
        assert_eq!(out.total_principal, dec!(2000000000000000));
        assert_eq!(out.weighted_avg_rate, dec!(1000));
        assert_eq!(out.total_collected, dec!(2000000000000000));
    }

    #[test]
    fn test_invalid_note_reports_index() {
        let input = PortfolioInput {
            notes: vec![
                entry(dec!(1000), dec!(12), 12, Decimal::ZERO),
                entry(Decimal::ZERO, dec!(12), 12, Decimal::ZERO),
            ],
        };
        let err = summarize_portfolio(&input).unwrap_err();
        assert!(err.to_string().contains("notes[1].loan_amount"));
    }
}
