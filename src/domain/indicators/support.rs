//! Shared rolling-window math behind the indicator catalogue: simple and
//! exponential moving averages and Wilder smoothing, each returning a
//! sequence aligned with its input, `None` while the window hasn't filled
//! (§4.3's "leading undefined entries").

use rust_decimal::{Decimal, MathematicalOps};

/// `sma[i] = mean(values[i-period+1..=i])`, `None` for `i < period - 1`.
pub fn simple_moving_average(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i + 1 < period {
            out.push(None);
            continue;
        }
        let window = &values[i + 1 - period..=i];
        let sum: Decimal = window.iter().copied().sum();
        out.push(Some(sum / Decimal::from(period as u64)));
    }
    out
}

/// Seeds with the SMA over the first `period` samples, then recurses with
/// `alpha = 2 / (period + 1)`. `None` until seeded (§4.3).
pub fn exponential_moving_average(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }
    let alpha = Decimal::from(2u64) / Decimal::from((period + 1) as u64);
    let mut out = vec![None; values.len()];
    let seed: Decimal = values[..period].iter().copied().sum::<Decimal>() / Decimal::from(period as u64);
    out[period - 1] = Some(seed);
    let mut prev = seed;
    for (i, value) in values.iter().enumerate().skip(period) {
        let ema = alpha * *value + (Decimal::ONE - alpha) * prev;
        out[i] = Some(ema);
        prev = ema;
    }
    out
}

/// Wilder's smoothed moving average: seeded with the plain average of the
/// first `period` samples, then `avg[i] = (avg[i-1]*(period-1) + v[i]) / period`.
/// Used by RSI, ATR, and DMI (§4.3).
pub fn wilder_average(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }
    let mut out = vec![None; values.len()];
    let seed: Decimal = values[..period].iter().copied().sum::<Decimal>() / Decimal::from(period as u64);
    out[period - 1] = Some(seed);
    let mut prev = seed;
    let p = Decimal::from(period as u64);
    for (i, value) in values.iter().enumerate().skip(period) {
        let avg = (prev * (p - Decimal::ONE) + *value) / p;
        out[i] = Some(avg);
        prev = avg;
    }
    out
}

/// Population standard deviation of `values[i-period+1..=i]`, `None` for
/// `i < period - 1`. Used by Bollinger Bands.
pub fn rolling_stddev(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let means = simple_moving_average(values, period);
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        match means[i] {
            None => out.push(None),
            Some(mean) => {
                let window = &values[i + 1 - period..=i];
                let sum_sq: Decimal = window.iter().map(|v| (*v - mean) * (*v - mean)).sum();
                let variance = sum_sq / Decimal::from(period as u64);
                out.push(variance.sqrt());
            }
        }
    }
    out
}
