use crate::types::{last_n, PriceBar};

pub const DEFAULT_DRAWDOWN_WINDOW: usize = 60;

pub fn calculate_recent_drawdown(bars: &[PriceBar]) -> f64 {
    recent_drawdown(bars, DEFAULT_DRAWDOWN_WINDOW)
}

/// `(peak - last close) / peak` with the peak close taken over the trailing
/// `window` bars. Never negative.
pub fn recent_drawdown(bars: &[PriceBar], window: usize) -> f64 {
    let recent = last_n(bars, window.max(1));
    let Some(last) = recent.last() else {
        return 0.0;
    };

    let peak = recent
        .iter()
        .map(PriceBar::close_f64)
        .fold(f64::NEG_INFINITY, f64::max);
    if peak <= 0.0 {
        return 0.0;
    }

    ((peak - last.close_f64()) / peak).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_bars::{from_closes, linear};

    #[test]
    fn test_rising_prices_have_no_drawdown() {
        let bars = from_closes(&linear(100.0, 1.0, 100), 0.0);
        assert_eq!(calculate_recent_drawdown(&bars), 0.0);
    }

    #[test]
    fn test_drawdown_from_peak() {
        let bars = from_closes(&[100.0, 120.0, 110.0, 90.0], 0.0);
        assert!((calculate_recent_drawdown(&bars) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_peak_outside_window_is_ignored() {
        let mut closes = vec![200.0];
        closes.extend(std::iter::repeat(100.0).take(60));
        let bars = from_closes(&closes, 0.0);
        assert_eq!(calculate_recent_drawdown(&bars), 0.0);
        assert!((recent_drawdown(&bars, 61) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_bars() {
        assert_eq!(calculate_recent_drawdown(&[]), 0.0);
    }
}
