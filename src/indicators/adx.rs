use serde::{Deserialize, Serialize};

use crate::types::PriceBar;

pub const DEFAULT_ADX_PERIOD: usize = 14;

/// Trend strength (ADX) and direction (+DI / -DI), all on a 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionalIndex {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

impl DirectionalIndex {
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.adx, self.plus_di, self.minus_di)
    }

    pub fn is_bullish(&self) -> bool {
        self.plus_di > self.minus_di
    }
}

pub fn calculate_adx(bars: &[PriceBar]) -> DirectionalIndex {
    calculate_adx_with_period(bars, DEFAULT_ADX_PERIOD)
}

/// Wilder's ADX. Needs `2 * period + 1` bars; with fewer, every value is zero.
pub fn calculate_adx_with_period(bars: &[PriceBar], period: usize) -> DirectionalIndex {
    if period == 0 || bars.len() < 2 * period + 1 {
        return DirectionalIndex::default();
    }

    let moves: Vec<DirectionalMove> = bars
        .windows(2)
        .map(|w| DirectionalMove::between(&w[0], &w[1]))
        .collect();

    let p = period as f64;
    let mut smoothed_tr: f64 = moves[..period].iter().map(|m| m.true_range).sum();
    let mut smoothed_plus: f64 = moves[..period].iter().map(|m| m.plus_dm).sum();
    let mut smoothed_minus: f64 = moves[..period].iter().map(|m| m.minus_dm).sum();

    let (mut plus_di, mut minus_di) = directional_indicators(smoothed_plus, smoothed_minus, smoothed_tr);
    let mut dx_values = Vec::with_capacity(moves.len() - period + 1);
    dx_values.push(directional_index(plus_di, minus_di));

    for m in &moves[period..] {
        smoothed_tr = smoothed_tr - smoothed_tr / p + m.true_range;
        smoothed_plus = smoothed_plus - smoothed_plus / p + m.plus_dm;
        smoothed_minus = smoothed_minus - smoothed_minus / p + m.minus_dm;

        (plus_di, minus_di) = directional_indicators(smoothed_plus, smoothed_minus, smoothed_tr);
        dx_values.push(directional_index(plus_di, minus_di));
    }

    // First ADX is the plain mean of the first `period` DX values, then Wilder-smoothed.
    let mut adx = dx_values[..period].iter().sum::<f64>() / p;
    for dx in &dx_values[period..] {
        adx = (adx * (p - 1.0) + dx) / p;
    }

    DirectionalIndex {
        adx,
        plus_di,
        minus_di,
    }
}

#[derive(Debug, Clone, Copy)]
struct DirectionalMove {
    true_range: f64,
    plus_dm: f64,
    minus_dm: f64,
}

impl DirectionalMove {
    fn between(prev: &PriceBar, current: &PriceBar) -> Self {
        let (high, low) = (current.high_f64(), current.low_f64());
        let prev_close = prev.close_f64();

        let true_range = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());

        let up_move = high - prev.high_f64();
        let down_move = prev.low_f64() - low;

        Self {
            true_range,
            plus_dm: if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 },
            minus_dm: if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 },
        }
    }
}

fn directional_indicators(plus_dm: f64, minus_dm: f64, true_range: f64) -> (f64, f64) {
    if true_range <= 0.0 {
        return (0.0, 0.0);
    }
    (100.0 * plus_dm / true_range, 100.0 * minus_dm / true_range)
}

fn directional_index(plus_di: f64, minus_di: f64) -> f64 {
    let sum = plus_di + minus_di;
    if sum <= 0.0 {
        return 0.0;
    }
    100.0 * (plus_di - minus_di).abs() / sum
}
