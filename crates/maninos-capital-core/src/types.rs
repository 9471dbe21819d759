use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CapitalError;
use crate::CapitalResult;

const HUNDRED: Decimal = dec!(100);

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.01 = 1%).
pub type Rate = Decimal;

/// Rates quoted in percentage points (12 = 12%), as notes are written.
pub type Percent = Decimal;

/// Whole calendar months.
pub type Months = u32;

/// Round a monetary amount to the cent, halves away from zero.
pub fn round_cents(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `total + amount`, rejected on `field` when the sum leaves `Decimal` range.
pub fn checked_total(total: Money, amount: Money, field: &str) -> CapitalResult<Money> {
    total.checked_add(amount).ok_or_else(|| {
        CapitalError::invalid(field, format!("{total} + {amount} is out of range"))
    })
}

/// `part / whole` as a percentage capped at 100, two decimals.
///
/// Callers guard `whole > 0`; a quotient too large to represent is past
/// the cap anyway.
pub fn capped_percent(part: Money, whole: Money) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .map_or(HUNDRED, |pct| pct.min(HUNDRED))
        .round_dp(2)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
