use chrono::NaiveDate;
use maninos_capital_core::notes::coverage::{self, CoverageInput};
use maninos_capital_core::notes::detail::{self, NoteDetailInput};
use maninos_capital_core::notes::payoff::{self, PayoffInput, PayoffPlan};
use maninos_capital_core::notes::schedule::{self, ScheduleInput};
use maninos_capital_core::notes::status::{self, PaymentStatus, StatusInput};
use maninos_capital_core::notes::{NoteTerms, PromissoryNote, SettlementStatus};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn reference_note() -> PromissoryNote {
    PromissoryNote::new(dec!(100000), dec!(12), 12)
}

// ===========================================================================
// Terms
// ===========================================================================

#[test]
fn test_reference_note_terms() {
    // 100,000 at 12% for 12 months
    let terms = reference_note().terms();
    assert_eq!(
        terms,
        NoteTerms {
            loan_amount: dec!(100000),
            annual_rate: dec!(12),
            monthly_rate: dec!(0.01),
            monthly_interest: dec!(1000),
            exact_monthly_interest: dec!(1000),
            term_months: 12,
            total_interest: dec!(12000),
            total_due: dec!(112000),
        }
    );
}

#[test]
fn test_total_due_identity_across_rates() {
    for rate in [dec!(0), dec!(5.5), dec!(9.99), dec!(12), dec!(18), dec!(24.75)] {
        for term in [1u32, 6, 13, 36, 120] {
            let t = NoteTerms::new(dec!(87654.32), rate, term);
            assert_eq!(t.total_due, t.loan_amount + t.total_interest);
        }
    }
}

// ===========================================================================
// Schedule
// ===========================================================================

#[test]
fn test_schedule_completeness() {
    for term in [1u32, 2, 12, 35, 60] {
        let input = ScheduleInput {
            note: PromissoryNote::new(dec!(25000), dec!(11.5), term),
            include_disbursement: false,
        };
        let out = schedule::build_schedule(&input).unwrap().result;
        assert_eq!(out.rows.len(), term as usize);
        assert_eq!(out.rows.last().unwrap().pending, out.terms.total_due);
    }
}

#[test]
fn test_schedule_linear_interest() {
    let input = ScheduleInput {
        note: PromissoryNote::new(dec!(10000), dec!(12), 12),
        include_disbursement: false,
    };
    let out = schedule::build_schedule(&input).unwrap().result;
    assert_eq!(out.terms.monthly_interest, dec!(100));
    for row in &out.rows {
        assert_eq!(row.accrued_interest, Decimal::from(row.term) * dec!(100));
    }
    assert_eq!(out.rows[5].term, 6);
    assert_eq!(out.rows[5].accrued_interest, dec!(600));
}

#[test]
fn test_ten_percent_known_answers() {
    // 1 000 at 10% for 24 months: 8.333... a month, rounded once per row
    let note = PromissoryNote::new(dec!(1000), dec!(10), 24).with_paid_amount(dec!(99.99));
    let out = schedule::build_schedule(&ScheduleInput {
        note: note.clone(),
        include_disbursement: false,
    })
    .unwrap()
    .result;
    assert_eq!(out.terms.monthly_interest, dec!(8.33));
    assert_eq!(out.terms.total_interest, dec!(200));
    assert_eq!(out.rows[5].accrued_interest, dec!(50));
    assert_eq!(out.rows[5].pending, dec!(1050));
    assert_eq!(out.rows[11].accrued_interest, dec!(100));
    assert_eq!(out.rows[22].pending, dec!(1191.67));
    assert_eq!(out.rows[23].pending, dec!(1200));

    let months = status::classify_schedule(&out.terms, note.paid_amount, false);
    assert_eq!(months[10].status, PaymentStatus::Paid);
    assert_eq!(months[11].status, PaymentStatus::Partial);

    let banner = coverage::calculate_coverage(&CoverageInput { note })
        .unwrap()
        .result;
    assert_eq!(banner.monthly_interest, dec!(8.33));
    assert_eq!(banner.months_paid, 11);
    assert_eq!(banner.months_remaining, 13);
}

#[test]
fn test_schedule_zero_rate() {
    let input = ScheduleInput {
        note: PromissoryNote::new(dec!(40000), Decimal::ZERO, 10),
        include_disbursement: false,
    };
    let out = schedule::build_schedule(&input).unwrap().result;
    assert_eq!(out.terms.total_due, dec!(40000));
    assert!(out.rows.iter().all(|r| r.interest.is_zero()));
    assert_eq!(out.rows.last().unwrap().pending, dec!(40000));
}

#[test]
fn test_schedule_json_shape() {
    let input: ScheduleInput = serde_json::from_value(serde_json::json!({
        "note": {
            "id": "PN-0042",
            "loan_amount": "100000",
            "annual_rate": "12",
            "term_months": 12,
            "start_date": "2025-01-15"
        },
        "include_disbursement": true
    }))
    .unwrap();
    let out = schedule::build_schedule(&input).unwrap().result;
    assert_eq!(out.rows.len(), 13);
    assert_eq!(out.rows[0].due_date, NaiveDate::from_ymd_opt(2025, 1, 15));
    assert_eq!(out.maturity_date, NaiveDate::from_ymd_opt(2026, 1, 15));
}

// ===========================================================================
// Classification
// ===========================================================================

#[test]
fn test_reference_classification() {
    let input = StatusInput {
        note: reference_note().with_paid_amount(dec!(5000)),
        include_disbursement: false,
    };
    let out = status::classify_payments(&input).unwrap().result;
    assert_eq!(out.months[4].term, 5);
    assert_eq!(out.months[4].status, PaymentStatus::Paid);
    assert_eq!(out.months[5].status, PaymentStatus::Pending);
}

#[test]
fn test_paid_prefix_property() {
    let terms = NoteTerms::new(dec!(75000), dec!(14), 18);
    let mut paid = Decimal::ZERO;
    while paid <= terms.total_due + dec!(1000) {
        let months = status::classify_schedule(&terms, paid, false);
        for (i, m) in months.iter().enumerate() {
            if m.status == PaymentStatus::Paid {
                assert!(months[..i]
                    .iter()
                    .all(|earlier| earlier.status == PaymentStatus::Paid));
            }
        }
        paid += dec!(437.5);
    }
}

#[test]
fn test_extra_payment_cascades_forward() {
    // Three months of interest paid at once covers months 1-3
    let terms = reference_note().terms();
    let months = status::classify_schedule(&terms, dec!(3000), false);
    let paid: Vec<u32> = months
        .iter()
        .filter(|m| m.status == PaymentStatus::Paid)
        .map(|m| m.term)
        .collect();
    assert_eq!(paid, vec![1, 2, 3]);
}

// ===========================================================================
// Payoff and coverage
// ===========================================================================

#[test]
fn test_payoff_fixed_totals() {
    for payment in [dec!(5000), dec!(20000), dec!(112000)] {
        let input = PayoffInput {
            note: reference_note(),
            monthly_payment: payment,
            as_of: None,
        };
        let out = payoff::calculate_payoff(&input).unwrap().result;
        assert_eq!(out.total_interest, dec!(12000));
        assert_eq!(out.total_due, dec!(112000));
    }
}

#[test]
fn test_payoff_identity() {
    let note = reference_note().with_paid_amount(dec!(3333.33));
    let remaining = note.remaining_total();
    for payment in [dec!(999.99), dec!(1234.56), dec!(50000)] {
        let input = PayoffInput {
            note: note.clone(),
            monthly_payment: payment,
            as_of: None,
        };
        let out = payoff::calculate_payoff(&input).unwrap().result;
        match out.plan.unwrap() {
            PayoffPlan::Scheduled {
                months_to_payoff,
                full_months,
                last_month_payment,
                ..
            } => {
                assert_eq!(full_months + 1, months_to_payoff);
                assert_eq!(
                    Decimal::from(full_months) * payment + last_month_payment,
                    remaining
                );
            }
            PayoffPlan::AlreadyPaidOff => panic!("note is not paid off"),
        }
    }
}

#[test]
fn test_payoff_settled_note() {
    let input = PayoffInput {
        note: reference_note().with_paid_amount(dec!(112000)),
        monthly_payment: dec!(1000),
        as_of: None,
    };
    let out = payoff::calculate_payoff(&input).unwrap().result;
    assert_eq!(out.remaining_total, Decimal::ZERO);
    assert_eq!(out.plan, Some(PayoffPlan::AlreadyPaidOff));
}

#[test]
fn test_coverage_banner() {
    let input = CoverageInput {
        note: reference_note().with_paid_amount(dec!(7500)),
    };
    let out = coverage::calculate_coverage(&input).unwrap().result;
    assert_eq!(out.months_paid, 7);
    assert_eq!(out.months_remaining, 5);
}

// ===========================================================================
// Detail snapshot
// ===========================================================================

#[test]
fn test_detail_matches_components() {
    let note = reference_note()
        .with_paid_amount(dec!(5500))
        .with_start_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    let input = NoteDetailInput {
        note: note.clone(),
        include_disbursement: false,
        monthly_payment: Some(dec!(25000)),
    };
    let out = detail::note_detail(&input).unwrap().result;

    let terms = note.terms();
    let classified = status::classify_schedule(&terms, note.paid_amount, false);
    for (row, month) in out.schedule.iter().zip(&classified) {
        assert_eq!(row.row.term, month.term);
        assert_eq!(row.status, month.status);
    }
    assert_eq!(out.status, SettlementStatus::Active);
    assert_eq!(out.coverage.months_paid, 5);
    assert_eq!(out.remaining_total, dec!(106500));
    assert_eq!(
        out.payoff,
        payoff::solve_payoff(dec!(106500), dec!(25000))
    );
    assert_eq!(out.maturity_date, NaiveDate::from_ymd_opt(2026, 1, 1));
}
