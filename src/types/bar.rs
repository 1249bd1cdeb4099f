use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLCV bar. Bars for one symbol are supplied in ascending time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    pub fn close_f64(&self) -> f64 {
        self.close.try_into().unwrap_or(0.0)
    }

    pub fn high_f64(&self) -> f64 {
        self.high.try_into().unwrap_or(0.0)
    }

    pub fn low_f64(&self) -> f64 {
        self.low.try_into().unwrap_or(0.0)
    }
}

pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(PriceBar::close_f64).collect()
}

pub fn highs(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(PriceBar::high_f64).collect()
}

pub fn lows(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(PriceBar::low_f64).collect()
}

/// Last `n` bars, or all of them when fewer are available.
pub fn last_n(bars: &[PriceBar], n: usize) -> &[PriceBar] {
    let len = bars.len();
    if n >= len {
        bars
    } else {
        &bars[len - n..]
    }
}
