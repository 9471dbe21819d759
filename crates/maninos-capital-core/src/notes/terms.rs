//! Promissory-note terms under simple, non-compounding interest.
//!
//! A note carries a flat principal that is due in full at maturity while
//! interest accrues linearly against the *original* principal. Every
//! derived figure here is computed from the note's three contractual
//! inputs (principal, annual rate, term). Accrued interest is
//! `month * exact_monthly_interest` rounded to the cent once, so it never
//! drifts through repeated rounding; the cent-rounded `monthly_interest`
//! is a display figure and may differ from `accrued / month` by sub-cent
//! amounts at rates such as 10%.

use chrono::{Months as CalendarMonths, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CapitalError;
use crate::types::{round_cents, Money, Months, Percent, Rate};
use crate::CapitalResult;

/// Percentage points per unit rate.
const PERCENT_DIVISOR: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);
/// `100 * 12`: converts `principal * annual_pct * months` into money.
const PERCENT_MONTHS_DIVISOR: Decimal = dec!(1200);

/// Largest principal or paid amount accepted (one quadrillion).
pub const MAX_AMOUNT: Money = dec!(1000000000000000);
/// Largest annual rate accepted, in percentage points.
pub const MAX_ANNUAL_RATE: Percent = dec!(1000);
/// Longest term accepted (100 years).
pub const MAX_TERM_MONTHS: Months = 1200;

/// A promissory note as the capital backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromissoryNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Investor who funded the note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    /// Principal lent.
    pub loan_amount: Money,
    /// Simple annual rate in percentage points (12 = 12%/year).
    pub annual_rate: Percent,
    /// Contractual duration.
    pub term_months: Months,
    /// Cumulative amount paid so far.
    #[serde(default)]
    pub paid_amount: Money,
    /// Disbursement date; schedule due dates count whole months from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Lifecycle state of a note, as far as the engine can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Active,
    Settled,
}

/// Derived, immutable terms of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTerms {
    pub loan_amount: Money,
    pub annual_rate: Percent,
    /// `annual_rate / 100 / 12`
    pub monthly_rate: Rate,
    /// Fixed interest charged every month, to the cent.
    pub monthly_interest: Money,
    /// `loan_amount * monthly_rate`, unrounded.
    pub exact_monthly_interest: Decimal,
    pub term_months: Months,
    pub total_interest: Money,
    /// Principal plus total interest.
    pub total_due: Money,
}

impl PromissoryNote {
    pub fn new(loan_amount: Money, annual_rate: Percent, term_months: Months) -> Self {
        PromissoryNote {
            id: None,
            lender: None,
            loan_amount,
            annual_rate,
            term_months,
            paid_amount: Decimal::ZERO,
            start_date: None,
        }
    }

    pub fn with_paid_amount(mut self, paid_amount: Money) -> Self {
        self.paid_amount = paid_amount;
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Reject notes the engine cannot price.
    ///
    /// A zero term is accepted: it yields an empty schedule and a total
    /// due equal to the principal. Upper bounds keep every derived figure
    /// inside `Decimal` range.
    pub fn validate(&self) -> CapitalResult<()> {
        if self.loan_amount <= Decimal::ZERO {
            return Err(CapitalError::invalid(
                "loan_amount",
                "Loan amount must be positive",
            ));
        }
        if self.loan_amount > MAX_AMOUNT {
            return Err(CapitalError::invalid(
                "loan_amount",
                format!("Loan amount cannot exceed {MAX_AMOUNT}"),
            ));
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(CapitalError::invalid(
                "annual_rate",
                "Annual rate cannot be negative",
            ));
        }
        if self.annual_rate > MAX_ANNUAL_RATE {
            return Err(CapitalError::invalid(
                "annual_rate",
                format!("Annual rate cannot exceed {MAX_ANNUAL_RATE}%"),
            ));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(CapitalError::invalid(
                "term_months",
                format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
            ));
        }
        if self.paid_amount < Decimal::ZERO {
            return Err(CapitalError::invalid(
                "paid_amount",
                "Paid amount cannot be negative",
            ));
        }
        if self.paid_amount > MAX_AMOUNT {
            return Err(CapitalError::invalid(
                "paid_amount",
                format!("Paid amount cannot exceed {MAX_AMOUNT}"),
            ));
        }
        if self.start_date.is_some() && self.maturity_date().is_none() {
            return Err(CapitalError::DateError(format!(
                "maturity date out of range for a {}-month term",
                self.term_months
            )));
        }
        Ok(())
    }

    pub fn terms(&self) -> NoteTerms {
        NoteTerms::new(self.loan_amount, self.annual_rate, self.term_months)
    }

    /// `max(0, total_due - paid_amount)`
    pub fn remaining_total(&self) -> Money {
        self.terms().remaining_total(self.paid_amount)
    }

    pub fn status(&self) -> SettlementStatus {
        self.terms().status(self.paid_amount)
    }

    /// `start_date + term_months`, clamped to the end of the month.
    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.start_date
            .and_then(|start| due_date(start, self.term_months))
    }
}

/// Date a given month falls due, counted from disbursement.
pub fn due_date(start: NaiveDate, month: Months) -> Option<NaiveDate> {
    start.checked_add_months(CalendarMonths::new(month))
}

impl NoteTerms {
    /// Derive the terms of a note.
    ///
    /// Expects inputs within the bounds [`PromissoryNote::validate`]
    /// enforces; larger values can overflow `Decimal`.
    pub fn new(loan_amount: Money, annual_rate: Percent, term_months: Months) -> Self {
        let monthly_rate = annual_rate / PERCENT_DIVISOR / MONTHS_PER_YEAR;
        let exact_monthly_interest = loan_amount * annual_rate / PERCENT_MONTHS_DIVISOR;
        let total_interest = round_cents(exact_monthly_interest * Decimal::from(term_months));
        NoteTerms {
            loan_amount,
            annual_rate,
            monthly_rate,
            monthly_interest: round_cents(exact_monthly_interest),
            exact_monthly_interest,
            term_months,
            total_interest,
            total_due: loan_amount + total_interest,
        }
    }

    /// Interest accrued from disbursement through the end of `month`.
    ///
    /// Never compounds: `month * exact_monthly_interest`, to the cent.
    pub fn accrued_interest(&self, month: Months) -> Money {
        round_cents(self.exact_monthly_interest * Decimal::from(month))
    }

    /// Amount that must have been paid by the end of `month`.
    ///
    /// Interest-only before maturity; principal plus all interest at
    /// maturity. Months past maturity stay at `total_due`.
    pub fn cumulative_obligation(&self, month: i64) -> Money {
        if month <= 0 {
            return Decimal::ZERO;
        }
        match month.to_u32() {
            Some(m) if m < self.term_months => self.accrued_interest(m),
            _ => self.total_due,
        }
    }

    pub fn remaining_total(&self, paid_amount: Money) -> Money {
        (self.total_due - paid_amount).max(Decimal::ZERO)
    }

    pub fn status(&self, paid_amount: Money) -> SettlementStatus {
        if paid_amount >= self.total_due {
            SettlementStatus::Settled
        } else {
            SettlementStatus::Active
        }
    }
}
