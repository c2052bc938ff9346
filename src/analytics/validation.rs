//! Boundary validation for analytics requests.

use serde_json::Value;
use thiserror::Error;

use crate::models::request::{IndicatorRequest, StockInfo};

pub const MAX_SYMBOL_LEN: usize = 10;
/// Roughly two years, in seconds.
pub const MAX_RANGE_SECONDS: u64 = 63_072_000;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required stock information")]
    Missing,
    #[error("Invalid stock symbol format")]
    InvalidSymbol,
    #[error("Invalid time period format")]
    InvalidPeriod,
    #[error("Time period end precedes start")]
    RangeReversed,
    #[error("Time period too large")]
    RangeTooLarge,
}

/// Validate the raw `info` object into an [`IndicatorRequest`].
pub fn validate_request(info: Option<&StockInfo>) -> Result<IndicatorRequest, ValidationError> {
    let info = info.ok_or(ValidationError::Missing)?;

    if !is_present(&info.symbol) || !is_present(&info.period1) || !is_present(&info.period2) {
        return Err(ValidationError::Missing);
    }

    let symbol = as_text(&info.symbol)
        .filter(|s| is_valid_symbol(s))
        .ok_or(ValidationError::InvalidSymbol)?;

    let period1 = as_text(&info.period1)
        .and_then(|s| parse_period(&s))
        .ok_or(ValidationError::InvalidPeriod)?;
    let period2 = as_text(&info.period2)
        .and_then(|s| parse_period(&s))
        .ok_or(ValidationError::InvalidPeriod)?;

    if period2 < period1 {
        return Err(ValidationError::RangeReversed);
    }
    if period2 - period1 > MAX_RANGE_SECONDS {
        return Err(ValidationError::RangeTooLarge);
    }

    Ok(IndicatorRequest {
        symbol,
        period1,
        period2,
    })
}

/// 1 to 10 characters from `[A-Za-z0-9.]`.
pub fn is_valid_symbol(symbol: &str) -> bool {
    (1..=MAX_SYMBOL_LEN).contains(&symbol.len())
        && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.')
}

/// Unix seconds written as plain decimal digits.
pub fn parse_period(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Null, `false`, `""` and numeric zero count as absent.
fn is_present(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(_) => true,
    }
}

fn as_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
