//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::trend::calculate_ema;
use crate::models::indicators::MacdSeries;

pub const DEFAULT_FAST_PERIOD: u32 = 12;
pub const DEFAULT_SLOW_PERIOD: u32 = 26;
pub const DEFAULT_SIGNAL_PERIOD: u32 = 9;

/// Calculate MACD series
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
///
/// Every output series is aligned with `prices`; empty input gives empty series.
pub fn calculate_macd(
    prices: &[f64],
    fast_period: u32,
    slow_period: u32,
    signal_period: u32,
) -> MacdSeries {
    if prices.is_empty() {
        return MacdSeries::default();
    }

    let fast_ema = calculate_ema(prices, fast_period);
    let slow_ema = calculate_ema(prices, slow_period);

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(fast, slow)| fast - slow)
        .collect();

    let signal_line = calculate_ema(&macd_line, signal_period);

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(macd, signal)| macd - signal)
        .collect();

    MacdSeries {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(prices: &[f64]) -> MacdSeries {
    calculate_macd(
        prices,
        DEFAULT_FAST_PERIOD,
        DEFAULT_SLOW_PERIOD,
        DEFAULT_SIGNAL_PERIOD,
    )
}
