//! Pure mapping from indicator values to a regime tag.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. volatility above the crisis level, or drawdown above the crisis level -> `Crisis`
//! 2. volatility above the high-volatility level -> `HighVolatility`
//! 3. ADX above the strong-trend level -> trend in the direction of +DI vs -DI
//! 4. ADX within the weak-trend band -> trend in the direction of the moving averages
//! 5. anything else -> `Ranging`

use crate::config::ClassifierThresholds;
use crate::types::RegimeTag;

/// Classifies with the default thresholds.
///
/// `volatility_pct` is annualized volatility in percent (35.0 = 35%);
/// `drawdown` is a fraction (0.15 = 15%).
#[allow(clippy::too_many_arguments)]
pub fn classify(
    adx: f64,
    plus_di: f64,
    minus_di: f64,
    volatility_pct: f64,
    price: f64,
    ma50: f64,
    ma200: f64,
    drawdown: f64,
) -> RegimeTag {
    ClassifierThresholds::default().classify(adx, plus_di, minus_di, volatility_pct, price, ma50, ma200, drawdown)
}

impl ClassifierThresholds {
    #[allow(clippy::too_many_arguments)]
    pub fn classify(
        &self,
        adx: f64,
        plus_di: f64,
        minus_di: f64,
        volatility_pct: f64,
        price: f64,
        ma50: f64,
        ma200: f64,
        drawdown: f64,
    ) -> RegimeTag {
        if volatility_pct > self.crisis_volatility_pct || drawdown > self.crisis_drawdown {
            return RegimeTag::Crisis;
        }

        if volatility_pct > self.high_volatility_pct {
            return RegimeTag::HighVolatility;
        }

        // DI direction wins over the moving averages once the trend is strong.
        if adx > self.strong_trend_adx {
            return if plus_di > minus_di {
                RegimeTag::TrendingUp
            } else {
                RegimeTag::TrendingDown
            };
        }

        if adx >= self.weak_trend_adx {
            if price > ma50 && price > ma200 && ma50 > ma200 {
                return RegimeTag::TrendingUp;
            }
            if price < ma50 && price < ma200 && ma50 < ma200 {
                return RegimeTag::TrendingDown;
            }
        }

        RegimeTag::Ranging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatility_crisis_overrides_trend() {
        assert_eq!(classify(30.0, 25.0, 15.0, 55.0, 110.0, 108.0, 105.0, 0.05), RegimeTag::Crisis);
    }

    #[test]
    fn test_drawdown_crisis_despite_normal_volatility() {
        assert_eq!(classify(25.0, 20.0, 15.0, 20.0, 100.0, 102.0, 101.0, 0.20), RegimeTag::Crisis);
    }

    #[test]
    fn test_high_volatility() {
        assert_eq!(classify(20.0, 18.0, 17.0, 35.0, 100.0, 100.0, 100.0, 0.02), RegimeTag::HighVolatility);
    }

    #[test]
    fn test_strong_uptrend() {
        assert_eq!(classify(30.0, 25.0, 15.0, 15.0, 110.0, 108.0, 105.0, 0.02), RegimeTag::TrendingUp);
    }

    #[test]
    fn test_di_wins_over_moving_averages() {
        assert_eq!(classify(30.0, 25.0, 15.0, 15.0, 105.0, 100.0, 103.0, 0.02), RegimeTag::TrendingUp);
        assert_eq!(classify(30.0, 15.0, 25.0, 15.0, 110.0, 108.0, 105.0, 0.02), RegimeTag::TrendingDown);
    }

    #[test]
    fn test_ranging() {
        assert_eq!(classify(15.0, 18.0, 17.0, 12.0, 100.0, 100.0, 100.0, 0.01), RegimeTag::Ranging);
    }

    #[test]
    fn test_weak_trend_follows_moving_averages() {
        assert_eq!(classify(22.0, 15.0, 25.0, 12.0, 110.0, 105.0, 100.0, 0.01), RegimeTag::TrendingUp);
        assert_eq!(classify(25.0, 25.0, 15.0, 12.0, 90.0, 95.0, 100.0, 0.01), RegimeTag::TrendingDown);
        assert_eq!(classify(20.0, 25.0, 15.0, 12.0, 100.0, 105.0, 95.0, 0.01), RegimeTag::Ranging);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        // Exactly at the crisis and high-volatility levels does not trigger them.
        assert_eq!(classify(15.0, 0.0, 0.0, 50.0, 0.0, 0.0, 0.0, 0.15), RegimeTag::HighVolatility);
        assert_eq!(classify(15.0, 0.0, 0.0, 30.0, 0.0, 0.0, 0.0, 0.0), RegimeTag::Ranging);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = ClassifierThresholds {
            crisis_volatility_pct: 80.0,
            high_volatility_pct: 60.0,
            ..ClassifierThresholds::default()
        };
        assert_eq!(
            thresholds.classify(30.0, 25.0, 15.0, 55.0, 110.0, 108.0, 105.0, 0.05),
            RegimeTag::TrendingUp
        );
    }

    #[test]
    fn test_total_over_grid() {
        let values = [-10.0, 0.0, 19.9, 20.0, 25.0, 25.1, 30.0, 50.1, f64::NAN];
        for &adx in &values {
            for &vol in &values {
                for &dd in &[-0.1, 0.0, 0.15, 0.16, f64::NAN] {
                    let tag = classify(adx, 10.0, 12.0, vol, 100.0, 99.0, 101.0, dd);
                    assert!(RegimeTag::all().contains(&tag));
                }
            }
        }
    }
}
