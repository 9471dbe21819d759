use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::CapitalError;
use crate::notes::terms::{due_date, PromissoryNote};
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Months};
use crate::CapitalResult;

/// Outcome of the months-to-payoff solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayoffPlan {
    AlreadyPaidOff,
    Scheduled {
        monthly_payment: Money,
        /// Whole months needed, including the final short month.
        months_to_payoff: Months,
        /// Months paid at the full `monthly_payment`.
        full_months: Months,
        last_month_payment: Money,
    },
}

impl PayoffPlan {
    pub fn months_to_payoff(&self) -> Months {
        match self {
            PayoffPlan::AlreadyPaidOff => 0,
            PayoffPlan::Scheduled {
                months_to_payoff, ..
            } => *months_to_payoff,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffInput {
    pub note: PromissoryNote,
    /// Proposed flat monthly payment.
    pub monthly_payment: Money,
    /// Date the first proposed payment is counted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffOutput {
    pub remaining_total: Money,
    /// Fixed regardless of payment cadence.
    pub total_interest: Money,
    /// Fixed regardless of payment cadence.
    pub total_due: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PayoffPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_payoff_date: Option<NaiveDate>,
}

/// Solve how many flat monthly payments retire `remaining_total`.
///
/// Returns `None` when the solver is disabled (`monthly_payment <= 0`) or
/// the month count does not fit a `u32`.
pub fn solve_payoff(remaining_total: Money, monthly_payment: Money) -> Option<PayoffPlan> {
    if monthly_payment <= Decimal::ZERO {
        return None;
    }
    if remaining_total <= Decimal::ZERO {
        return Some(PayoffPlan::AlreadyPaidOff);
    }

    let exact_months = remaining_total.checked_div(monthly_payment)?;
    let months_to_payoff = exact_months.ceil().to_u32()?.max(1);
    let full_months = months_to_payoff - 1;
    let last_month_payment =
        round_cents(remaining_total - Decimal::from(full_months) * monthly_payment);

    Some(PayoffPlan::Scheduled {
        monthly_payment,
        months_to_payoff,
        full_months,
        last_month_payment,
    })
}

/// What-if payoff calculator for a note at a proposed monthly payment.
pub fn calculate_payoff(input: &PayoffInput) -> CapitalResult<ComputationOutput<PayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let note = &input.note;
    note.validate()?;

    let terms = note.terms();
    let remaining_total = terms.remaining_total(note.paid_amount);
    let plan = solve_payoff(remaining_total, input.monthly_payment);

    if input.monthly_payment <= Decimal::ZERO {
        warnings.push("Monthly payment must be positive; payoff not computed".into());
    } else if plan.is_none() {
        return Err(CapitalError::invalid(
            "monthly_payment",
            format!(
                "Payment {} is too small to retire {}",
                input.monthly_payment, remaining_total
            ),
        ));
    }

    let projected_payoff_date = match (&plan, input.as_of) {
        (Some(p), Some(as_of)) => Some(due_date(as_of, p.months_to_payoff()).ok_or_else(|| {
            CapitalError::DateError(format!(
                "payoff date out of range: {} months from {as_of}",
                p.months_to_payoff()
            ))
        })?),
        _ => None,
    };

    if let (Some(projected), Some(maturity)) = (projected_payoff_date, note.maturity_date()) {
        if projected > maturity {
            warnings.push(format!(
                "Projected payoff {projected} falls after maturity {maturity}"
            ));
        }
    }

    debug!(
        remaining = %remaining_total,
        months = plan.as_ref().map(PayoffPlan::months_to_payoff),
        "solved payoff"
    );

    let output = PayoffOutput {
        remaining_total,
        total_interest: terms.total_interest,
        total_due: terms.total_due,
        plan,
        projected_payoff_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Months-to-payoff at a flat monthly payment (total interest fixed)",
        &serde_json::json!({
            "monthly_payment": input.monthly_payment.to_string(),
            "paid_amount": note.paid_amount.to_string(),
            "total_due": terms.total_due.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_division() {
        let plan = solve_payoff(dec!(112000), dec!(11200)).unwrap();
        assert_eq!(
            plan,
            PayoffPlan::Scheduled {
                monthly_payment: dec!(11200),
                months_to_payoff: 10,
                full_months: 9,
                last_month_payment: dec!(11200),
            }
        );
    }

    #[test]
    fn test_short_final_month() {
        let plan = solve_payoff(dec!(10000), dec!(3000)).unwrap();
        match plan {
            PayoffPlan::Scheduled {
                months_to_payoff,
                full_months,
                last_month_payment,
                ..
            } => {
                assert_eq!(months_to_payoff, 4);
                assert_eq!(full_months, 3);
                assert_eq!(last_month_payment, dec!(1000));
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_already_paid_off() {
        assert_eq!(
            solve_payoff(Decimal::ZERO, dec!(500)),
            Some(PayoffPlan::AlreadyPaidOff)
        );
    }

    #[test]
    fn test_non_positive_payment_disables_solver() {
        assert_eq!(solve_payoff(dec!(1000), Decimal::ZERO), None);
        assert_eq!(solve_payoff(dec!(1000), dec!(-10)), None);
    }

    #[test]
    fn test_payoff_identity_to_the_cent() {
        let remaining = dec!(108765.43);
        for payment in [dec!(1), dec!(333.33), dec!(2500), dec!(7000.07), dec!(108765.43)] {
            if let Some(PayoffPlan::Scheduled {
                full_months,
                last_month_payment,
                months_to_payoff,
                ..
            }) = solve_payoff(remaining, payment)
            {
                assert!(months_to_payoff >= 1);
                assert_eq!(
                    Decimal::from(full_months) * payment + last_month_payment,
                    remaining
                );
            } else {
                panic!("expected a plan for payment {payment}");
            }
        }
    }

    #[test]
    fn test_calculate_payoff_disabled_warns() {
        let input = PayoffInput {
            note: PromissoryNote::new(dec!(100000), dec!(12), 12),
            monthly_payment: Decimal::ZERO,
            as_of: None,
        };
        let result = calculate_payoff(&input).unwrap();
        assert!(result.result.plan.is_none());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.result.total_due, dec!(112000));
    }

    #[test]
    fn test_calculate_payoff_projects_date() {
        let input = PayoffInput {
            note: PromissoryNote::new(dec!(100000), dec!(12), 12)
                .with_paid_amount(dec!(12000))
                .with_start_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            monthly_payment: dec!(10000),
            as_of: NaiveDate::from_ymd_opt(2025, 6, 1),
        };
        let result = calculate_payoff(&input).unwrap();
        let out = &result.result;
        assert_eq!(out.remaining_total, dec!(100000));
        assert_eq!(out.plan.as_ref().unwrap().months_to_payoff(), 10);
        assert_eq!(out.projected_payoff_date, NaiveDate::from_ymd_opt(2026, 4, 1));
        // Maturity is 2026-01-01
        assert_eq!(result.warnings.len(), 1);
    }
}
