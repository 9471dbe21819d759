use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::notes::terms::{NoteTerms, PromissoryNote};
use crate::types::{with_metadata, ComputationOutput, Money, Months};
use crate::CapitalResult;

/// Coverage of a single schedule month by the cumulative amount paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Pending,
    /// Disbursement month; nothing is owed.
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStatus {
    pub term: Months,
    /// Cumulative obligation through this month.
    pub obligation: Money,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInput {
    pub note: PromissoryNote,
    #[serde(default)]
    pub include_disbursement: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutput {
    pub paid_amount: Money,
    pub months: Vec<MonthStatus>,
    pub paid_count: u32,
    pub partial_count: u32,
    pub pending_count: u32,
    /// First month not fully covered, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_month: Option<Months>,
}

/// Classify month `month` given the cumulative amount paid.
///
/// A month is paid once `paid_amount` reaches its cumulative obligation
/// (ties count as paid), partial when the payment reaches past the
/// previous month's obligation, and pending otherwise.
pub fn classify_month(terms: &NoteTerms, paid_amount: Money, month: Months) -> PaymentStatus {
    if month == 0 {
        return PaymentStatus::Neutral;
    }
    let month = i64::from(month);
    let prev = terms.cumulative_obligation(month - 1);
    let curr = terms.cumulative_obligation(month);

    if paid_amount >= curr {
        PaymentStatus::Paid
    } else if paid_amount > prev {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Classify every month of the note, optionally with the month-0 row.
pub fn classify_schedule(
    terms: &NoteTerms,
    paid_amount: Money,
    include_disbursement: bool,
) -> Vec<MonthStatus> {
    let first = if include_disbursement { 0 } else { 1 };
    (first..=terms.term_months)
        .map(|term| MonthStatus {
            term,
            obligation: terms.cumulative_obligation(i64::from(term)),
            status: classify_month(terms, paid_amount, term),
        })
        .collect()
}

/// Classify each month of a note against its recorded payments.
pub fn classify_payments(input: &StatusInput) -> CapitalResult<ComputationOutput<StatusOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let note = &input.note;
    note.validate()?;

    let terms = note.terms();
    if note.paid_amount > terms.total_due {
        warnings.push(format!(
            "Paid amount {} exceeds total due {}",
            note.paid_amount, terms.total_due
        ));
    }

    let months = classify_schedule(&terms, note.paid_amount, input.include_disbursement);

    let count = |status: PaymentStatus| months.iter().filter(|m| m.status == status).count() as u32;
    let paid_count = count(PaymentStatus::Paid);
    let partial_count = count(PaymentStatus::Partial);
    let pending_count = count(PaymentStatus::Pending);
    let next_due_month = months
        .iter()
        .find(|m| matches!(m.status, PaymentStatus::Partial | PaymentStatus::Pending))
        .map(|m| m.term);

    debug!(paid_count, partial_count, pending_count, "classified note months");

    let output = StatusOutput {
        paid_amount: note.paid_amount,
        months,
        paid_count,
        partial_count,
        pending_count,
        next_due_month,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cumulative-obligation payment classification (interest monthly, principal at maturity)",
        &serde_json::json!({
            "paid_amount": note.paid_amount.to_string(),
            "total_due": terms.total_due.to_string(),
            "term_months": note.term_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn terms() -> NoteTerms {
        NoteTerms::new(dec!(100000), dec!(12), 12)
    }

    #[test]
    fn test_boundary_tie_counts_as_paid() {
        let t = terms();
        assert_eq!(classify_month(&t, dec!(5000), 5), PaymentStatus::Paid);
        assert_eq!(classify_month(&t, dec!(5000), 6), PaymentStatus::Pending);
    }

    #[test]
    fn test_partial_month() {
        let t = terms();
        assert_eq!(classify_month(&t, dec!(5500), 6), PaymentStatus::Partial);
        assert_eq!(classify_month(&t, dec!(5500), 7), PaymentStatus::Pending);
    }

    #[test]
    fn test_maturity_requires_principal() {
        let t = terms();
        // All interest paid, principal outstanding
        assert_eq!(classify_month(&t, dec!(12000), 11), PaymentStatus::Paid);
        assert_eq!(classify_month(&t, dec!(12000), 12), PaymentStatus::Partial);
        assert_eq!(classify_month(&t, dec!(112000), 12), PaymentStatus::Paid);
    }

    #[test]
    fn test_month_zero_neutral() {
        assert_eq!(
            classify_month(&terms(), Decimal::ZERO, 0),
            PaymentStatus::Neutral
        );
    }

    #[test]
    fn test_nothing_paid_all_pending() {
        let months = classify_schedule(&terms(), Decimal::ZERO, false);
        assert_eq!(months.len(), 12);
        assert!(months.iter().all(|m| m.status == PaymentStatus::Pending));
    }

    #[test]
    fn test_paid_rows_form_a_prefix() {
        let t = terms();
        for paid in [dec!(0), dec!(999.99), dec!(3000), dec!(7250.50), dec!(60000), dec!(112000)] {
            let months = classify_schedule(&t, paid, false);
            let last_paid = months
                .iter()
                .rposition(|m| m.status == PaymentStatus::Paid);
            if let Some(idx) = last_paid {
                assert!(months[..idx].iter().all(|m| m.status == PaymentStatus::Paid));
            }
        }
    }

    #[test]
    fn test_classify_payments_counts() {
        let input = StatusInput {
            note: PromissoryNote::new(dec!(100000), dec!(12), 12).with_paid_amount(dec!(5500)),
            include_disbursement: true,
        };
        let out = classify_payments(&input).unwrap().result;
        assert_eq!(out.months.len(), 13);
        assert_eq!(out.months[0].status, PaymentStatus::Neutral);
        assert_eq!(out.paid_count, 5);
        assert_eq!(out.partial_count, 1);
        assert_eq!(out.pending_count, 6);
        assert_eq!(out.next_due_month, Some(6));
    }

    #[test]
    fn test_overpayment_warns() {
        let input = StatusInput {
            note: PromissoryNote::new(dec!(1000), dec!(12), 1).with_paid_amount(dec!(2000)),
            include_disbursement: false,
        };
        let result = classify_payments(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.result.next_due_month, None);
    }
}
