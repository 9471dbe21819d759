use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use maninos_capital_core::CapitalResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON input, run the computation, serialise the output.
fn run_json<I, O>(input_json: &str, compute: impl FnOnce(&I) -> CapitalResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = compute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[napi]
pub fn note_schedule(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::notes::schedule::build_schedule)
}

#[napi]
pub fn note_payment_status(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::notes::status::classify_payments)
}

#[napi]
pub fn note_payoff(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::notes::payoff::calculate_payoff)
}

#[napi]
pub fn note_coverage(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::notes::coverage::calculate_coverage)
}

#[napi]
pub fn note_detail(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::notes::detail::note_detail)
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[napi]
pub fn apply_payments(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::payments::ledger::apply_payments)
}

#[napi]
pub fn record_payment(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::payments::ledger::record_payment)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn portfolio_summary(input_json: String) -> NapiResult<String> {
    run_json(&input_json, maninos_capital_core::portfolio::book::summarize_portfolio)
}
