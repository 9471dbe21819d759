use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::notes::terms::{NoteTerms, PromissoryNote};
use crate::types::{with_metadata, ComputationOutput, Money, Months};
use crate::CapitalResult;

/// Whole months of interest the borrower has covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCoverage {
    pub months_paid: Months,
    pub months_remaining: Months,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageInput {
    pub note: PromissoryNote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageOutput {
    pub monthly_interest: Money,
    pub paid_amount: Money,
    pub months_paid: Months,
    pub months_remaining: Months,
    pub term_months: Months,
}

/// `min(term_months, floor(paid_amount / monthly_interest))`; 0 at a zero rate.
///
/// The quotient uses the unrounded monthly interest and is then settled
/// against the cent-rounded accruals, so a month counted here before
/// maturity is also `paid` in the status view.
pub fn monthly_coverage(terms: &NoteTerms, paid_amount: Money) -> MonthlyCoverage {
    let months_paid =
        if terms.exact_monthly_interest <= Decimal::ZERO || paid_amount <= Decimal::ZERO {
            0
        } else {
            let estimate = paid_amount
                .checked_div(terms.exact_monthly_interest)
                .and_then(|months| months.floor().to_u32())
                .unwrap_or(u32::MAX)
                .min(terms.term_months);
            settle_to_cents(terms, paid_amount, estimate)
        };

    MonthlyCoverage {
        months_paid,
        months_remaining: terms.term_months - months_paid,
    }
}

/// Nudge `months` until `accrued_interest(months) <= paid < accrued_interest(months + 1)`.
fn settle_to_cents(terms: &NoteTerms, paid_amount: Money, mut months: Months) -> Months {
    while months > 0 && paid_amount < terms.accrued_interest(months) {
        months -= 1;
    }
    while months < terms.term_months && paid_amount >= terms.accrued_interest(months + 1) {
        months += 1;
    }
    months
}

/// Summary-banner figures: months covered and months left.
pub fn calculate_coverage(input: &CoverageInput) -> CapitalResult<ComputationOutput<CoverageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let note = &input.note;
    note.validate()?;

    let terms = note.terms();
    if terms.exact_monthly_interest.is_zero() {
        warnings.push("Monthly interest is zero; months paid reported as 0".into());
    }
    let coverage = monthly_coverage(&terms, note.paid_amount);

    let output = CoverageOutput {
        monthly_interest: terms.monthly_interest,
        paid_amount: note.paid_amount,
        months_paid: coverage.months_paid,
        months_remaining: coverage.months_remaining,
        term_months: terms.term_months,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Interest months covered by cumulative payments",
        &serde_json::json!({
            "paid_amount": note.paid_amount.to_string(),
            "monthly_interest": terms.monthly_interest.to_string(),
            "exact_monthly_interest": terms.exact_monthly_interest.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
