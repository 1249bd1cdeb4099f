pub mod adx;
pub mod drawdown;
pub mod volatility;

pub use adx::*;
pub use drawdown::*;
pub use volatility::*;

use crate::types::PriceBar;

pub const DEFAULT_FAST_MA_PERIOD: usize = 50;
pub const DEFAULT_SLOW_MA_PERIOD: usize = 200;

/// Mean of the last `period` closes, or 0.0 when fewer bars are available.
pub fn calculate_sma(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period {
        return 0.0;
    }
    let closes: Vec<f64> = bars[bars.len() - period..]
        .iter()
        .map(PriceBar::close_f64)
        .collect();
    sma(&closes, period).unwrap_or(0.0)
}

pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let sum: f64 = values.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;

    Some(variance.max(0.0).sqrt())
}

#[cfg(test)]
pub(crate) mod test_bars {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::types::PriceBar;

    /// Daily bars built from closes, with highs/lows `spread` either side.
    pub fn from_closes(closes: &[f64], spread: f64) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let close = Decimal::try_from(c).unwrap();
                let high = Decimal::try_from(c + spread).unwrap();
                let low = Decimal::try_from(c - spread).unwrap();
                PriceBar::new(
                    start + Duration::days(i as i64),
                    close,
                    high,
                    low,
                    close,
                    Decimal::from(1000),
                )
            })
            .collect()
    }

    pub fn linear(start: f64, step: f64, count: usize) -> Vec<f64> {
        (0..count).map(|i| start + step * i as f64).collect()
    }
}
