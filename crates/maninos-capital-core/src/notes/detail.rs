//! Note detail snapshot: everything the promissory-note page derives
//! locally from a note, recomputed from scratch on every call.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::CapitalError;
use crate::notes::coverage::{monthly_coverage, MonthlyCoverage};
use crate::notes::payoff::{solve_payoff, PayoffPlan};
use crate::notes::schedule::{generate_schedule, ScheduleRow};
use crate::notes::status::{classify_month, PaymentStatus};
use crate::notes::terms::{NoteTerms, PromissoryNote, SettlementStatus};
use crate::types::{capped_percent, with_metadata, ComputationOutput, Money};
use crate::CapitalResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDetailInput {
    pub note: PromissoryNote,
    #[serde(default)]
    pub include_disbursement: bool,
    /// Optional what-if monthly payment for the payoff calculator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
}

/// A schedule row annotated with its payment status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    #[serde(flatten)]
    pub row: ScheduleRow,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDetailOutput {
    pub note: PromissoryNote,
    pub terms: NoteTerms,
    pub status: SettlementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
    pub remaining_total: Money,
    /// Share of total due collected, capped at 100.
    pub progress_pct: Decimal,
    pub coverage: MonthlyCoverage,
    pub schedule: Vec<DetailRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff: Option<PayoffPlan>,
}

/// Paid share of total due in percent, two decimals.
pub fn progress_pct(terms: &NoteTerms, paid_amount: Money) -> CapitalResult<Decimal> {
    if terms.total_due <= Decimal::ZERO {
        return Err(CapitalError::DivisionByZero {
            context: "progress against total due".into(),
        });
    }
    Ok(capped_percent(paid_amount, terms.total_due))
}

/// Assemble the full detail snapshot for a note.
pub fn note_detail(input: &NoteDetailInput) -> CapitalResult<ComputationOutput<NoteDetailOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let note = &input.note;
    note.validate()?;

    let terms = note.terms();
    let paid = note.paid_amount;

    if note.term_months == 0 {
        warnings.push("Term of 0 months: schedule is empty".into());
    }
    if paid > terms.total_due {
        warnings.push(format!("Overpaid by {}", paid - terms.total_due));
    }

    let schedule: Vec<DetailRow> =
        generate_schedule(&terms, note.start_date, input.include_disbursement)
            .into_iter()
            .map(|row| DetailRow {
                status: classify_month(&terms, paid, row.term),
                row,
            })
            .collect();

    let remaining_total = terms.remaining_total(paid);
    let payoff = match input.monthly_payment {
        Some(payment) => {
            let plan = solve_payoff(remaining_total, payment);
            if plan.is_none() {
                warnings.push(format!(
                    "Monthly payment {payment} cannot retire the balance; payoff omitted"
                ));
            }
            plan
        }
        None => None,
    };

    debug!(
        status = ?terms.status(paid),
        remaining = %remaining_total,
        "assembled note detail"
    );

    let output = NoteDetailOutput {
        status: terms.status(paid),
        maturity_date: note.maturity_date(),
        remaining_total,
        progress_pct: progress_pct(&terms, paid)?,
        coverage: monthly_coverage(&terms, paid),
        schedule,
        payoff,
        note: note.clone(),
        terms,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Promissory note detail (simple interest, flat principal)",
        &serde_json::json!({
            "loan_amount": note.loan_amount.to_string(),
            "annual_rate_pct": note.annual_rate.to_string(),
            "term_months": note.term_months,
            "paid_amount": paid.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
