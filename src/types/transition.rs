use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RegimeTag;

/// An in-flight regime transition for one symbol.
///
/// A state with `confirmed == false` is a candidate still waiting for
/// confirmation. Once confirmed, `scaling_progress` climbs from one step to 1.0
/// as the caller advances it, and never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionState {
    pub symbol: String,
    pub from_regime: RegimeTag,
    pub to_regime: RegimeTag,
    pub confirmation_count: u32,
    pub last_update_time: DateTime<Utc>,
    pub scaling_progress: Decimal,
    pub confirmed: bool,
    /// Confidence of the analysis that last moved this state.
    #[serde(default)]
    pub confidence: f64,
    scaling_step: u32,
    scaling_steps: u32,
}

impl TransitionState {
    pub fn candidate(
        symbol: &str,
        from_regime: RegimeTag,
        to_regime: RegimeTag,
        scaling_steps: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            from_regime,
            to_regime,
            confirmation_count: 1,
            last_update_time: at,
            scaling_progress: Decimal::ZERO,
            confirmed: false,
            confidence: 0.0,
            scaling_step: 0,
            scaling_steps: scaling_steps.max(1),
        }
    }

    /// Crisis transitions skip confirmation and scale fully at once.
    pub fn crisis(symbol: &str, from_regime: RegimeTag, scaling_steps: u32, at: DateTime<Utc>) -> Self {
        let steps = scaling_steps.max(1);
        Self {
            symbol: symbol.to_string(),
            from_regime,
            to_regime: RegimeTag::Crisis,
            confirmation_count: 1,
            last_update_time: at,
            scaling_progress: Decimal::ONE,
            confirmed: true,
            confidence: 0.0,
            scaling_step: steps,
            scaling_steps: steps,
        }
    }

    /// Marks the candidate confirmed and takes the first scaling step.
    pub fn confirm(&mut self, at: DateTime<Utc>) {
        self.confirmed = true;
        self.last_update_time = at;
        self.scaling_step = 1;
        self.recompute_progress();
    }

    /// Takes one scaling step. Returns true only on the step that reaches 1.0.
    pub fn advance(&mut self, at: DateTime<Utc>) -> bool {
        if !self.confirmed || self.is_complete() {
            return false;
        }
        self.scaling_step = (self.scaling_step + 1).min(self.scaling_steps);
        self.last_update_time = at;
        self.recompute_progress();
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.scaling_progress >= Decimal::ONE
    }

    pub fn is_candidate(&self) -> bool {
        !self.confirmed
    }

    fn recompute_progress(&mut self) {
        let progress = Decimal::from(self.scaling_step) / Decimal::from(self.scaling_steps);
        self.scaling_progress = progress.min(Decimal::ONE);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionEventType {
    SignalDetected,
    Confirmed,
    Cancelled,
    Completed,
    CrisisTriggered,
}

impl TransitionEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionEventType::SignalDetected => "SIGNAL_DETECTED",
            TransitionEventType::Confirmed => "CONFIRMED",
            TransitionEventType::Cancelled => "CANCELLED",
            TransitionEventType::Completed => "COMPLETED",
            TransitionEventType::CrisisTriggered => "CRISIS_TRIGGERED",
        }
    }
}

impl fmt::Display for TransitionEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Emitted by a processing call. Not stored anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub event_type: TransitionEventType,
    pub from_regime: RegimeTag,
    pub to_regime: RegimeTag,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub scaling_progress: Decimal,
    pub confidence: f64,
}

impl TransitionEvent {
    pub fn new(
        event_type: TransitionEventType,
        state: &TransitionState,
        confidence: f64,
    ) -> Self {
        Self {
            event_type,
            from_regime: state.from_regime,
            to_regime: state.to_regime,
            symbol: state.symbol.clone(),
            timestamp: state.last_update_time,
            scaling_progress: state.scaling_progress,
            confidence,
        }
    }
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} -> {} (scaling {})",
            self.event_type, self.symbol, self.from_regime, self.to_regime, self.scaling_progress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_candidate_starts_unscaled() {
        let state = TransitionState::candidate("BTCUSDT", RegimeTag::Ranging, RegimeTag::TrendingUp, 5, Utc::now());
        assert!(state.is_candidate());
        assert_eq!(state.confirmation_count, 1);
        assert_eq!(state.scaling_progress, Decimal::ZERO);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_unconfirmed_does_not_advance() {
        let mut state = TransitionState::candidate("BTCUSDT", RegimeTag::Ranging, RegimeTag::TrendingUp, 5, Utc::now());
        assert!(!state.advance(Utc::now()));
        assert_eq!(state.scaling_progress, Decimal::ZERO);
    }

    #[test]
    fn test_scaling_steps_are_exact() {
        let mut state = TransitionState::candidate("BTCUSDT", RegimeTag::Ranging, RegimeTag::TrendingUp, 5, Utc::now());
        state.confirm(Utc::now());
        assert_eq!(state.scaling_progress, dec!(0.2));

        let mut completions = 0;
        for _ in 0..10 {
            if state.advance(Utc::now()) {
                completions += 1;
            }
        }
        assert_eq!(state.scaling_progress, dec!(1.0));
        assert!(state.is_complete());
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_crisis_state_is_complete() {
        let state = TransitionState::crisis("BTCUSDT", RegimeTag::TrendingUp, 5, Utc::now());
        assert!(state.confirmed);
        assert!(state.is_complete());
        assert_eq!(state.to_regime, RegimeTag::Crisis);
    }

    #[test]
    fn test_event_display() {
        let state = TransitionState::crisis("SOLUSDT", RegimeTag::Ranging, 5, Utc::now());
        let event = TransitionEvent::new(TransitionEventType::CrisisTriggered, &state, 0.9);
        assert_eq!(event.to_string(), "CRISIS_TRIGGERED SOLUSDT: RANGING -> CRISIS (scaling 1)");
    }
}
