//! EMA (Exponential Moving Average) indicator

/// Smoothing factor `k = 2 / (period + 1)`.
pub fn smoothing_factor(period: u32) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Next EMA value from the current price and the previous EMA.
pub fn ema_from_previous(price: f64, previous: f64, k: f64) -> f64 {
    price * k + previous * (1.0 - k)
}

/// Calculate the full EMA series for a period.
///
/// The output has the same length as `prices`. It is seeded with the first
/// price, so there is no warm-up window and nothing is trimmed. An empty
/// input yields an empty output.
pub fn calculate_ema(prices: &[f64], period: u32) -> Vec<f64> {
    let Some((&first, rest)) = prices.split_first() else {
        return Vec::new();
    };

    let k = smoothing_factor(period);
    let mut ema = Vec::with_capacity(prices.len());
    ema.push(first);

    let mut previous = first;
    for &price in rest {
        previous = ema_from_previous(price, previous, k);
        ema.push(previous);
    }

    ema
}
