use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::notes::terms::{due_date, NoteTerms, PromissoryNote};
use crate::types::{with_metadata, ComputationOutput, Money, Months};
use crate::CapitalResult;

/// One month of a note's life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Month index; 0 is the disbursement row.
    pub term: Months,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Monthly interest to the cent.
    pub interest: Money,
    /// Exact accrual rounded once; at rates such as 10% it can differ from
    /// `term * interest` by a few cents.
    pub accrued_interest: Money,
    /// Flat principal, unchanged until maturity.
    pub principal: Money,
    /// Total owed through this month.
    pub pending: Money,
}

/// Input for building a note schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub note: PromissoryNote,
    /// Prepend the month-0 disbursement row.
    #[serde(default)]
    pub include_disbursement: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub terms: NoteTerms,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
    pub rows: Vec<ScheduleRow>,
}

/// Generate the month-by-month schedule for a set of terms.
///
/// Interest is constant each month and accrues linearly; the final row's
/// `pending` is exactly `total_due`. A zero-month term yields no rows
/// (besides the disbursement row, when requested).
pub fn generate_schedule(
    terms: &NoteTerms,
    start_date: Option<NaiveDate>,
    include_disbursement: bool,
) -> Vec<ScheduleRow> {
    let capacity = terms.term_months as usize + usize::from(include_disbursement);
    let mut rows = Vec::with_capacity(capacity);

    if include_disbursement {
        rows.push(ScheduleRow {
            term: 0,
            due_date: start_date,
            interest: Decimal::ZERO,
            accrued_interest: Decimal::ZERO,
            principal: terms.loan_amount,
            pending: Decimal::ZERO,
        });
    }

    for term in 1..=terms.term_months {
        let accrued_interest = terms.accrued_interest(term);
        let pending = if term == terms.term_months {
            terms.total_due
        } else {
            terms.loan_amount + accrued_interest
        };

        rows.push(ScheduleRow {
            term,
            due_date: start_date.and_then(|start| due_date(start, term)),
            interest: terms.monthly_interest,
            accrued_interest,
            principal: terms.loan_amount,
            pending,
        });
    }

    rows
}

/// Build the full schedule for a note, with terms and maturity date.
pub fn build_schedule(input: &ScheduleInput) -> CapitalResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let note = &input.note;
    note.validate()?;

    if note.term_months == 0 {
        warnings.push("Term of 0 months: schedule is empty and total due equals principal".into());
    }
    if note.annual_rate.is_zero() {
        warnings.push("Zero annual rate: no interest accrues".into());
    }

    let terms = note.terms();
    let rows = generate_schedule(&terms, note.start_date, input.include_disbursement);
    debug!(
        rows = rows.len(),
        total_due = %terms.total_due,
        "built note schedule"
    );

    let output = ScheduleOutput {
        maturity_date: note.maturity_date(),
        terms,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Simple-interest note schedule (flat principal, linear accrual)",
        &serde_json::json!({
            "loan_amount": note.loan_amount.to_string(),
            "annual_rate_pct": note.annual_rate.to_string(),
            "term_months": note.term_months,
            "include_disbursement": input.include_disbursement,
        }),
        warnings,
        elapsed,
        output,
    ))
}
