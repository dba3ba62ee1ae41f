//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Recursive form with no bias adjustment, so every bar is defined.

pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(closes.len());
    let mut ema = closes[0];
    values.push(ema);

    for &close in &closes[1..] {
        ema = close * k + ema * (1.0 - k);
        values.push(ema);
    }

    values
}
