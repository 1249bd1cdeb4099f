use serde::{Deserialize, Serialize};

use crate::indicators::{
    DEFAULT_ADX_PERIOD, DEFAULT_DRAWDOWN_WINDOW, DEFAULT_FAST_MA_PERIOD, DEFAULT_SLOW_MA_PERIOD,
    TRADING_DAYS_PER_YEAR,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub analyzer: AnalyzerSettings,
    pub thresholds: ClassifierThresholds,
    pub transition: TransitionSettings,
}

impl RegimeConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Analyzer validation
        let a = &self.analyzer;
        if a.adx_period == 0 {
            errors.push("adx_period must be > 0".to_string());
        }
        if a.fast_ma_period == 0 || a.fast_ma_period >= a.slow_ma_period {
            errors.push("fast_ma_period must be > 0 and < slow_ma_period".to_string());
        }
        if a.drawdown_window == 0 {
            errors.push("drawdown_window must be > 0".to_string());
        }
        if a.volatility_window < 3 {
            errors.push("volatility_window must be >= 3".to_string());
        }
        if a.trading_days_per_year <= 0.0 {
            errors.push("trading_days_per_year must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&a.limited_data_confidence_cap) {
            errors.push("limited_data_confidence_cap must be between 0 and 1".to_string());
        }

        // Threshold validation
        let t = &self.thresholds;
        if t.high_volatility_pct >= t.crisis_volatility_pct {
            errors.push("high_volatility_pct must be < crisis_volatility_pct".to_string());
        }
        if t.crisis_drawdown <= 0.0 || t.crisis_drawdown > 1.0 {
            errors.push("crisis_drawdown must be between 0 and 1".to_string());
        }
        if t.weak_trend_adx > t.strong_trend_adx {
            errors.push("weak_trend_adx must be <= strong_trend_adx".to_string());
        }

        // Transition validation
        let tr = &self.transition;
        if !(0.0..=1.0).contains(&tr.min_confidence) {
            errors.push("min_confidence must be between 0 and 1".to_string());
        }
        if tr.confirmation_periods == 0 {
            errors.push("confirmation_periods must be > 0".to_string());
        }
        if tr.scaling_steps == 0 {
            errors.push("scaling_steps must be > 0".to_string());
        }
        if tr.history_capacity == 0 {
            errors.push("history_capacity must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Lookbacks and scaling used when computing indicators for an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub adx_period: usize,
    pub fast_ma_period: usize,
    pub slow_ma_period: usize,
    pub drawdown_window: usize,
    /// Trailing bars used for annualized volatility.
    pub volatility_window: usize,
    pub trading_days_per_year: f64,
    /// Confidence ceiling when history is shorter than `slow_ma_period`.
    pub limited_data_confidence_cap: f64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            adx_period: DEFAULT_ADX_PERIOD,
            fast_ma_period: DEFAULT_FAST_MA_PERIOD,
            slow_ma_period: DEFAULT_SLOW_MA_PERIOD,
            drawdown_window: DEFAULT_DRAWDOWN_WINDOW,
            volatility_window: 21,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            limited_data_confidence_cap: 0.5,
        }
    }
}

/// Decision boundaries for regime classification.
/// Volatility thresholds are percentages, drawdown is a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub crisis_volatility_pct: f64,
    pub crisis_drawdown: f64,
    pub high_volatility_pct: f64,
    pub strong_trend_adx: f64,
    pub weak_trend_adx: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            crisis_volatility_pct: 50.0,
            crisis_drawdown: 0.15,
            high_volatility_pct: 30.0,
            strong_trend_adx: 25.0,
            weak_trend_adx: 20.0,
        }
    }
}

/// Hysteresis and scaling parameters for the transition state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Updates below this confidence never start, advance, or cancel a transition.
    pub min_confidence: f64,
    /// Matching updates (including the one that opened the candidate) needed to confirm.
    pub confirmation_periods: u32,
    /// Equal steps from the old regime's sizing to the new one.
    pub scaling_steps: u32,
    pub history_capacity: usize,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self::moderate()
    }
}
