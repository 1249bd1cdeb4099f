use dashmap::DashMap;
use tracing::{debug, info};

use crate::config::{AnalyzerSettings, ClassifierThresholds, RegimeConfig};
use crate::indicators::{
    annualized_volatility, calculate_adx_with_period, calculate_sma, recent_drawdown, DirectionalIndex,
};
use crate::types::{last_n, PriceBar, RegimeAnalysis, RegimeTag};

/// Computes indicators over a symbol's history, classifies the regime, and
/// keeps the latest analysis per symbol.
pub struct RegimeAnalyzer {
    settings: AnalyzerSettings,
    thresholds: ClassifierThresholds,
    cache: DashMap<String, RegimeAnalysis>,
}

impl Default for RegimeAnalyzer {
    fn default() -> Self {
        Self::new(&RegimeConfig::default())
    }
}

impl RegimeAnalyzer {
    pub fn new(config: &RegimeConfig) -> Self {
        Self {
            settings: config.analyzer.clone(),
            thresholds: config.thresholds,
            cache: DashMap::new(),
        }
    }

    pub fn analyze_regime(&self, symbol: &str, bars: &[PriceBar]) -> RegimeAnalysis {
        let analysis = match bars.last() {
            Some(last) => self.compute(symbol, bars, last),
            None => {
                debug!("{}: no market data, defaulting to {}", symbol, RegimeTag::Ranging);
                RegimeAnalysis::no_data(symbol)
            }
        };

        self.cache.insert(symbol.to_string(), analysis.clone());
        analysis
    }

    pub fn analyze_many(&self, inputs: &[(&str, &[PriceBar])]) -> Vec<RegimeAnalysis> {
        inputs
            .iter()
            .map(|(symbol, bars)| self.analyze_regime(symbol, bars))
            .collect()
    }

    fn compute(&self, symbol: &str, bars: &[PriceBar], last: &PriceBar) -> RegimeAnalysis {
        let s = &self.settings;

        let di = calculate_adx_with_period(bars, s.adx_period);
        let volatility = annualized_volatility(last_n(bars, s.volatility_window), s.trading_days_per_year);
        let ma50 = calculate_sma(bars, s.fast_ma_period);
        let ma200 = calculate_sma(bars, s.slow_ma_period);
        let drawdown = recent_drawdown(bars, s.drawdown_window);
        let price = last.close_f64();
        let volatility_pct = volatility * 100.0;

        // Short histories deliberately skip the weak-trend rule: with the fast average
        // standing in for the slow one, `ma50 > ma200` can never hold.
        let limited = bars.len() < s.slow_ma_period;
        let slow_for_classify = if limited { ma50 } else { ma200 };

        let regime = self.thresholds.classify(
            di.adx,
            di.plus_di,
            di.minus_di,
            volatility_pct,
            price,
            ma50,
            slow_for_classify,
            drawdown,
        );

        let mut confidence = self.confidence(regime, &di, volatility_pct, drawdown, ma50, slow_for_classify);
        if limited {
            confidence = confidence.min(s.limited_data_confidence_cap);
            debug!(
                "{}: limited data ({} of {} bars), confidence capped at {:.2}",
                symbol,
                bars.len(),
                s.slow_ma_period,
                s.limited_data_confidence_cap
            );
        }

        let rationale = format!(
            "{}{}: ADX={:.1} (+DI={:.1}, -DI={:.1}), vol={:.1}%, drawdown={:.1}%, MA50={:.2}, MA200={:.2}",
            regime.description(),
            if limited { " (limited data)" } else { "" },
            di.adx,
            di.plus_di,
            di.minus_di,
            volatility_pct,
            drawdown * 100.0,
            ma50,
            ma200
        );

        RegimeAnalysis {
            symbol: symbol.to_string(),
            regime,
            confidence,
            adx: di.adx,
            plus_di: di.plus_di,
            minus_di: di.minus_di,
            volatility,
            ma50,
            ma200,
            drawdown,
            timestamp: last.timestamp,
            rationale,
        }
    }

    /// Signal clarity: how far the deciding indicator sits past its threshold.
    fn confidence(
        &self,
        regime: RegimeTag,
        di: &DirectionalIndex,
        volatility_pct: f64,
        drawdown: f64,
        ma50: f64,
        ma200: f64,
    ) -> f64 {
        let t = &self.thresholds;
        let beyond = |value: f64, from: f64, span: f64| {
            if span > 0.0 {
                ((value - from) / span).clamp(0.0, 1.0)
            } else {
                1.0
            }
        };

        let confidence = match regime {
            RegimeTag::Crisis => {
                let vol_excess = beyond(volatility_pct, t.crisis_volatility_pct, t.crisis_volatility_pct);
                let dd_excess = beyond(drawdown, t.crisis_drawdown, t.crisis_drawdown);
                0.7 + 0.3 * vol_excess.max(dd_excess)
            }
            RegimeTag::HighVolatility => {
                let span = t.crisis_volatility_pct - t.high_volatility_pct;
                0.6 + 0.4 * beyond(volatility_pct, t.high_volatility_pct, span)
            }
            RegimeTag::TrendingUp | RegimeTag::TrendingDown if di.adx > t.strong_trend_adx => {
                let strength = beyond(di.adx, t.strong_trend_adx, t.strong_trend_adx);
                let di_sum = di.plus_di + di.minus_di;
                let separation = if di_sum > 0.0 {
                    ((di.plus_di - di.minus_di).abs() / di_sum).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                0.6 + 0.25 * strength + 0.15 * separation
            }
            RegimeTag::TrendingUp | RegimeTag::TrendingDown => {
                let spread = if ma200 > 0.0 { (ma50 - ma200).abs() / ma200 } else { 0.0 };
                0.5 + 0.3 * beyond(spread, 0.0, 0.05)
            }
            RegimeTag::Ranging if di.adx < t.weak_trend_adx => {
                0.6 + 0.4 * beyond(t.weak_trend_adx - di.adx, 0.0, t.weak_trend_adx)
            }
            // Weak trend with conflicting moving averages.
            RegimeTag::Ranging => 0.4,
        };

        if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn get_cached_regime(&self, symbol: &str) -> Option<RegimeAnalysis> {
        self.cache.get(symbol).map(|r| r.clone())
    }

    pub fn cached_symbols(&self) -> Vec<String> {
        self.cache.iter().map(|r| r.key().clone()).collect()
    }

    pub fn clear_cache(&self) {
        let count = self.cache.len();
        self.cache.clear();
        info!("Regime cache cleared ({} symbols)", count);
    }

    pub fn is_trending(&self, symbol: &str) -> bool {
        self.cache
            .get(symbol)
            .map(|a| a.regime.is_trending())
            .unwrap_or(false)
    }

    pub fn is_volatile(&self, symbol: &str) -> bool {
        self.cache
            .get(symbol)
            .map(|a| a.regime.is_volatile())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_bars::{from_closes, linear};

    fn uptrend(count: usize) -> Vec<PriceBar> {
        from_closes(&linear(100.0, 0.5, count), 1.0)
    }

    fn choppy(count: usize) -> Vec<PriceBar> {
        let closes: Vec<f64> = (0..count).map(|i| if i % 2 == 0 { 100.0 } else { 100.2 }).collect();
        from_closes(&closes, 0.5)
    }

    #[test]
    fn test_empty_bars_default_analysis() {
        let analyzer = RegimeAnalyzer::default();
        let analysis = analyzer.analyze_regime("BTCUSDT", &[]);
        assert_eq!(analysis.regime, RegimeTag::Ranging);
        assert_eq!(analysis.confidence, 0.0);
        assert_eq!(analysis.rationale, "No market data");
        assert_eq!(analyzer.get_cached_regime("BTCUSDT"), Some(analysis));
    }

    #[test]
    fn test_uptrend_is_trending_up() {
        let analyzer = RegimeAnalyzer::default();
        let bars = uptrend(250);
        let analysis = analyzer.analyze_regime("BTCUSDT", &bars);
        assert_eq!(analysis.regime, RegimeTag::TrendingUp);
        assert!(analysis.confidence >= 0.6);
        assert!(analysis.confidence <= 1.0);
        assert!(analysis.ma50 > analysis.ma200);
        assert_eq!(analysis.drawdown, 0.0);
        assert_eq!(analysis.timestamp, bars.last().unwrap().timestamp);
        assert!(analyzer.is_trending("BTCUSDT"));
        assert!(!analyzer.is_volatile("BTCUSDT"));
    }

    #[test]
    fn test_choppy_market_is_ranging() {
        let analyzer = RegimeAnalyzer::default();
        let analysis = analyzer.analyze_regime("ETHUSDT", &choppy(250));
        assert_eq!(analysis.regime, RegimeTag::Ranging);
        assert!(analysis.confidence >= 0.6);
        assert!(analysis.is_favorable_for_mean_reversion());
    }

    #[test]
    fn test_crash_is_crisis() {
        let analyzer = RegimeAnalyzer::default();
        let mut closes = linear(100.0, 0.2, 240);
        let top = *closes.last().unwrap();
        closes.extend((1..=10).map(|i| top * (1.0 - 0.03 * i as f64)));
        let analysis = analyzer.analyze_regime("SOLUSDT", &from_closes(&closes, 1.0));
        assert_eq!(analysis.regime, RegimeTag::Crisis);
        assert!(analysis.drawdown > 0.15);
        assert!(analysis.confidence >= 0.7);
        assert!(analyzer.is_volatile("SOLUSDT"));
        assert!(analysis.should_reduce_exposure());
    }

    #[test]
    fn test_limited_data_caps_confidence() {
        let analyzer = RegimeAnalyzer::default();
        let analysis = analyzer.analyze_regime("BTCUSDT", &uptrend(120));
        assert!(analysis.confidence <= 0.5);
        assert_eq!(analysis.ma200, 0.0);
        assert!(analysis.ma50 > 0.0);
        assert!(analysis.rationale.contains("limited data"));
    }

    #[test]
    fn test_limited_data_skips_weak_trend_rule() {
        // Weak-band ADX with price above both averages would trend up with a real MA200.
        let thresholds = ClassifierThresholds::default();
        assert_eq!(
            thresholds.classify(22.0, 15.0, 25.0, 12.0, 110.0, 105.0, 100.0, 0.01),
            RegimeTag::TrendingUp
        );
        assert_eq!(
            thresholds.classify(22.0, 15.0, 25.0, 12.0, 110.0, 105.0, 105.0, 0.01),
            RegimeTag::Ranging
        );
    }

    #[test]
    fn test_cache_overwrites_and_clears() {
        let analyzer = RegimeAnalyzer::default();
        analyzer.analyze_regime("BTCUSDT", &uptrend(250));
        analyzer.analyze_regime("BTCUSDT", &choppy(250));
        assert_eq!(analyzer.get_cached_regime("BTCUSDT").unwrap().regime, RegimeTag::Ranging);
        assert_eq!(analyzer.cached_symbols(), vec!["BTCUSDT".to_string()]);

        analyzer.clear_cache();
        assert!(analyzer.get_cached_regime("BTCUSDT").is_none());
    }

    #[test]
    fn test_unseen_symbol_predicates() {
        let analyzer = RegimeAnalyzer::default();
        assert!(analyzer.get_cached_regime("XRPUSDT").is_none());
        assert!(!analyzer.is_trending("XRPUSDT"));
        assert!(!analyzer.is_volatile("XRPUSDT"));
    }

    #[test]
    fn test_analyze_many() {
        let analyzer = RegimeAnalyzer::default();
        let up = uptrend(250);
        let flat = choppy(250);
        let results = analyzer.analyze_many(&[("BTCUSDT", up.as_slice()), ("ETHUSDT", flat.as_slice())]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].symbol, "BTCUSDT");
        assert_eq!(results[1].regime, RegimeTag::Ranging);
        assert_eq!(analyzer.cached_symbols().len(), 2);
    }

    #[test]
    fn test_confidence_always_bounded() {
        let analyzer = RegimeAnalyzer::default();
        for count in [1, 2, 3, 10, 29, 30, 60, 199, 200, 300] {
            for bars in [uptrend(count), choppy(count)] {
                let analysis = analyzer.analyze_regime("BTCUSDT", &bars);
                assert!((0.0..=1.0).contains(&analysis.confidence));
                assert!(RegimeTag::all().contains(&analysis.regime));
            }
        }
    }
}
