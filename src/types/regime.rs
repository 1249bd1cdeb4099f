use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market regime classification. Every classification yields exactly one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegimeTag {
    TrendingUp,
    TrendingDown,
    Ranging,
    HighVolatility,
    Crisis,
}

impl RegimeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegimeTag::TrendingUp => "TRENDING_UP",
            RegimeTag::TrendingDown => "TRENDING_DOWN",
            RegimeTag::Ranging => "RANGING",
            RegimeTag::HighVolatility => "HIGH_VOLATILITY",
            RegimeTag::Crisis => "CRISIS",
        }
    }

    pub fn all() -> [RegimeTag; 5] {
        [
            RegimeTag::TrendingUp,
            RegimeTag::TrendingDown,
            RegimeTag::Ranging,
            RegimeTag::HighVolatility,
            RegimeTag::Crisis,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            RegimeTag::TrendingUp => "Sustained upward trend",
            RegimeTag::TrendingDown => "Sustained downward trend",
            RegimeTag::Ranging => "Range-bound, no clear direction",
            RegimeTag::HighVolatility => "Elevated volatility",
            RegimeTag::Crisis => "Extreme volatility or deep drawdown",
        }
    }

    pub fn is_trending(&self) -> bool {
        matches!(self, RegimeTag::TrendingUp | RegimeTag::TrendingDown)
    }

    pub fn is_volatile(&self) -> bool {
        matches!(self, RegimeTag::HighVolatility | RegimeTag::Crisis)
    }

    /// Fixed position size multiplier applied while settled in this regime.
    pub fn position_scale_factor(&self) -> Decimal {
        match self {
            RegimeTag::TrendingUp => Decimal::ONE,         // 1.0x
            RegimeTag::TrendingDown => Decimal::new(5, 1), // 0.5x
            RegimeTag::Ranging => Decimal::new(7, 1),      // 0.7x
            RegimeTag::HighVolatility => Decimal::new(3, 1), // 0.3x
            RegimeTag::Crisis => Decimal::ZERO,
        }
    }
}

impl fmt::Display for RegimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RegimeTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_uppercase().as_str() {
            "TRENDING_UP" => Ok(RegimeTag::TrendingUp),
            "TRENDING_DOWN" => Ok(RegimeTag::TrendingDown),
            "RANGING" => Ok(RegimeTag::Ranging),
            "HIGH_VOLATILITY" => Ok(RegimeTag::HighVolatility),
            "CRISIS" => Ok(RegimeTag::Crisis),
            _ => Err(anyhow::anyhow!("Unknown regime: {}", s)),
        }
    }
}

/// Full result of analyzing one symbol's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeAnalysis {
    pub symbol: String,
    pub regime: RegimeTag,
    /// Signal clarity in [0, 1].
    pub confidence: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    /// Annualized volatility as a fraction (0.25 = 25%).
    pub volatility: f64,
    pub ma50: f64,
    pub ma200: f64,
    /// Drawdown from the trailing peak as a fraction.
    pub drawdown: f64,
    pub timestamp: DateTime<Utc>,
    pub rationale: String,
}

impl RegimeAnalysis {
    /// Analysis returned when there is no market data to work with.
    pub fn no_data(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            regime: RegimeTag::Ranging,
            confidence: 0.0,
            adx: 0.0,
            plus_di: 0.0,
            minus_di: 0.0,
            volatility: 0.0,
            ma50: 0.0,
            ma200: 0.0,
            drawdown: 0.0,
            timestamp: Utc::now(),
            rationale: "No market data".to_string(),
        }
    }

    pub fn is_favorable_for_momentum(&self) -> bool {
        self.regime.is_trending()
    }

    pub fn is_favorable_for_mean_reversion(&self) -> bool {
        self.regime == RegimeTag::Ranging
    }

    pub fn should_reduce_exposure(&self) -> bool {
        self.regime.is_volatile()
    }

    pub fn position_scale_factor(&self) -> Decimal {
        self.regime.position_scale_factor()
    }

    pub fn snapshot(&self) -> RegimeSnapshot {
        RegimeSnapshot {
            symbol: self.symbol.clone(),
            regime: self.regime,
            confidence: self.confidence,
            timestamp: self.timestamp,
        }
    }
}

/// Lightweight history record kept in the per-symbol rolling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    pub symbol: String,
    pub regime: RegimeTag,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}
