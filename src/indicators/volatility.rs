use super::sample_stddev;
use crate::types::PriceBar;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized volatility (fraction) of daily log returns over the given bars.
pub fn calculate_annualized_volatility(bars: &[PriceBar]) -> f64 {
    annualized_volatility(bars, TRADING_DAYS_PER_YEAR)
}

/// Standard deviation of log returns scaled by `sqrt(periods_per_year)`.
/// Needs at least three bars; flat prices give exactly zero.
pub fn annualized_volatility(bars: &[PriceBar], periods_per_year: f64) -> f64 {
    if bars.len() < 3 {
        return 0.0;
    }

    let returns = log_returns(bars);
    match sample_stddev(&returns) {
        Some(sd) if sd > 0.0 => sd * periods_per_year.sqrt(),
        _ => 0.0,
    }
}

pub fn log_returns(bars: &[PriceBar]) -> Vec<f64> {
    bars.windows(2)
        .filter_map(|w| {
            let prev = w[0].close_f64();
            let curr = w[1].close_f64();
            if prev > 0.0 && curr > 0.0 {
                Some((curr / prev).ln())
            } else {
                None
            }
        })
        .collect()
}
