//! Per-symbol regime transition tracking.
//!
//! Each symbol moves through:
//!
//! ```text
//! Stable --signal--> Candidate --confirmations--> Confirmed (scaling) --advance--> Complete
//!    ^                   |
//!    +----reversion------+
//! ```
//!
//! A crisis signal jumps straight from any state to Complete. Updates below the
//! minimum confidence are recorded in history but otherwise ignored.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::analyzer::RegimeAnalyzer;
use super::blender::{blend, blend_regime_size};
use crate::config::{RegimeConfig, TransitionSettings};
use crate::error::Result;
use crate::types::{
    PriceBar, RegimeAnalysis, RegimeSnapshot, RegimeTag, TransitionEvent, TransitionEventType,
    TransitionState,
};

#[derive(Debug, Default)]
struct SymbolTransitions {
    history: VecDeque<RegimeSnapshot>,
    /// Regime the symbol is considered settled in when no transition is active.
    settled: Option<RegimeTag>,
    active: Option<TransitionState>,
}

impl SymbolTransitions {
    fn record(&mut self, snapshot: RegimeSnapshot, capacity: usize) {
        while self.history.len() >= capacity.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    fn dominant(&self, lookback: usize) -> Option<RegimeTag> {
        let skip = self.history.len().saturating_sub(lookback);
        dominant_regime(self.history.iter().skip(skip).map(|s| s.regime))
    }

    fn apply(
        &mut self,
        symbol: &str,
        analysis: &RegimeAnalysis,
        settings: &TransitionSettings,
    ) -> Option<TransitionEvent> {
        let prior_dominant = self.dominant(self.history.len());
        self.record(analysis.snapshot(), settings.history_capacity);

        if analysis.confidence < settings.min_confidence {
            debug!(
                "{}: ignoring {} signal, confidence {:.2} < {:.2}",
                symbol, analysis.regime, analysis.confidence, settings.min_confidence
            );
            return None;
        }

        let at = analysis.timestamp;

        if analysis.regime == RegimeTag::Crisis {
            return self.trigger_crisis(symbol, prior_dominant, analysis, settings);
        }

        if let Some(state) = self.active.as_ref() {
            if state.is_complete() && state.to_regime != analysis.regime {
                debug!("{}: retiring completed {} -> {} transition", symbol, state.from_regime, state.to_regime);
                self.settled = Some(state.to_regime);
                self.active = None;
            }
        }

        match self.active.take() {
            None => self.open_candidate(symbol, prior_dominant, analysis, settings),
            Some(state) if state.is_candidate() => self.update_candidate(state, analysis, settings, at),
            // Confirmed transitions only move through explicit scaling advances.
            Some(state) => {
                self.active = Some(state);
                None
            }
        }
    }

    fn trigger_crisis(
        &mut self,
        symbol: &str,
        prior_dominant: Option<RegimeTag>,
        analysis: &RegimeAnalysis,
        settings: &TransitionSettings,
    ) -> Option<TransitionEvent> {
        // A repeated crisis keeps the regime the symbol was in before the first one.
        let from = match &self.active {
            Some(state) if state.to_regime == RegimeTag::Crisis => state.from_regime,
            _ => self.settled.or(prior_dominant).unwrap_or(RegimeTag::Ranging),
        };
        let mut state = TransitionState::crisis(symbol, from, settings.scaling_steps, analysis.timestamp);
        state.confidence = analysis.confidence;
        warn!(
            "{}: CRISIS triggered from {} (confidence {:.2}): {}",
            symbol, from, analysis.confidence, analysis.rationale
        );

        let event = TransitionEvent::new(TransitionEventType::CrisisTriggered, &state, analysis.confidence);
        self.settled = Some(RegimeTag::Crisis);
        self.active = Some(state);
        Some(event)
    }

    fn open_candidate(
        &mut self,
        symbol: &str,
        prior_dominant: Option<RegimeTag>,
        analysis: &RegimeAnalysis,
        settings: &TransitionSettings,
    ) -> Option<TransitionEvent> {
        let regime = analysis.regime;
        let baseline = match self.settled.or(prior_dominant) {
            Some(baseline) => baseline,
            None => {
                debug!("{}: baseline regime established as {}", symbol, regime);
                self.settled = Some(regime);
                return None;
            }
        };

        if baseline == regime {
            self.settled = Some(baseline);
            return None;
        }

        let mut state = TransitionState::candidate(symbol, baseline, regime, settings.scaling_steps, analysis.timestamp);
        state.confidence = analysis.confidence;
        self.settled = Some(baseline);

        if state.confirmation_count >= settings.confirmation_periods {
            return Some(self.confirm(state, analysis));
        }

        info!(
            "{}: transition signal {} -> {} (confidence {:.2})",
            symbol, baseline, regime, analysis.confidence
        );
        let event = TransitionEvent::new(TransitionEventType::SignalDetected, &state, analysis.confidence);
        self.active = Some(state);
        Some(event)
    }

    fn update_candidate(
        &mut self,
        mut state: TransitionState,
        analysis: &RegimeAnalysis,
        settings: &TransitionSettings,
        at: DateTime<Utc>,
    ) -> Option<TransitionEvent> {
        state.last_update_time = at;
        state.confidence = analysis.confidence;

        if analysis.regime == state.to_regime {
            state.confirmation_count += 1;
            if state.confirmation_count >= settings.confirmation_periods {
                return Some(self.confirm(state, analysis));
            }
            debug!(
                "{}: {} -> {} confirmation {}/{}",
                state.symbol, state.from_regime, state.to_regime, state.confirmation_count, settings.confirmation_periods
            );
            self.active = Some(state);
            return None;
        }

        if analysis.regime == state.from_regime {
            info!(
                "{}: transition {} -> {} cancelled, reverted to {}",
                state.symbol, state.from_regime, state.to_regime, state.from_regime
            );
            return Some(TransitionEvent::new(TransitionEventType::Cancelled, &state, analysis.confidence));
        }

        // A third regime replaces the candidate, keeping the original baseline.
        info!(
            "{}: transition {} -> {} cancelled, restarting toward {}",
            state.symbol, state.from_regime, state.to_regime, analysis.regime
        );
        let mut replacement = TransitionState::candidate(
            &state.symbol,
            state.from_regime,
            analysis.regime,
            settings.scaling_steps,
            at,
        );
        replacement.confidence = analysis.confidence;
        if replacement.confirmation_count >= settings.confirmation_periods {
            return Some(self.confirm(replacement, analysis));
        }
        let event = TransitionEvent::new(TransitionEventType::SignalDetected, &replacement, analysis.confidence);
        self.active = Some(replacement);
        Some(event)
    }

    fn confirm(&mut self, mut state: TransitionState, analysis: &RegimeAnalysis) -> TransitionEvent {
        state.confirm(analysis.timestamp);
        state.confidence = analysis.confidence;
        info!(
            "{}: transition {} -> {} CONFIRMED after {} periods, scaling {}",
            state.symbol, state.from_regime, state.to_regime, state.confirmation_count, state.scaling_progress
        );
        let event = TransitionEvent::new(TransitionEventType::Confirmed, &state, analysis.confidence);
        self.settled = Some(state.to_regime);
        self.active = Some(state);
        event
    }
}

/// Most frequent regime; ties go to the one seen most recently.
fn dominant_regime(regimes: impl Iterator<Item = RegimeTag>) -> Option<RegimeTag> {
    let mut tally: HashMap<RegimeTag, (usize, usize)> = HashMap::new();
    for (i, regime) in regimes.enumerate() {
        let entry = tally.entry(regime).or_insert((0, i));
        entry.0 += 1;
        entry.1 = i;
    }
    tally
        .into_iter()
        .max_by_key(|(_, (count, last_seen))| (*count, *last_seen))
        .map(|(regime, _)| regime)
}

/// Tracks regime history and transitions for every symbol.
///
/// Each symbol's history and transition state sit behind a single map entry,
/// so updates to one symbol are serialized while different symbols proceed
/// independently.
pub struct RegimeTransitionManager {
    analyzer: Arc<RegimeAnalyzer>,
    settings: TransitionSettings,
    symbols: DashMap<String, SymbolTransitions>,
}

impl Default for RegimeTransitionManager {
    fn default() -> Self {
        Self::new(Arc::new(RegimeAnalyzer::default()), &RegimeConfig::default())
    }
}

impl RegimeTransitionManager {
    pub fn new(analyzer: Arc<RegimeAnalyzer>, config: &RegimeConfig) -> Self {
        Self {
            analyzer,
            settings: config.transition.clone(),
            symbols: DashMap::new(),
        }
    }

    pub fn analyzer(&self) -> &Arc<RegimeAnalyzer> {
        &self.analyzer
    }

    pub fn settings(&self) -> &TransitionSettings {
        &self.settings
    }

    /// Records the analysis in the symbol's history and evaluates transition logic.
    pub fn process_regime_update(&self, symbol: &str, analysis: &RegimeAnalysis) -> Option<TransitionEvent> {
        let mut entry = self.symbols.entry(symbol.to_string()).or_default();
        entry.apply(symbol, analysis, &self.settings)
    }

    /// Analyzes `bars` and feeds the result straight into [`Self::process_regime_update`].
    pub fn update_and_detect_transition(&self, symbol: &str, bars: &[PriceBar]) -> Option<TransitionEvent> {
        let analysis = self.analyzer.analyze_regime(symbol, bars);
        self.process_regime_update(symbol, &analysis)
    }

    /// Takes one scaling step for a confirmed transition. Call once per period.
    /// Returns a `Completed` event on the step that reaches full scaling.
    pub fn advance_transition_scaling(&self, symbol: &str) -> Option<TransitionEvent> {
        let mut entry = self.symbols.get_mut(symbol)?;
        let state = entry.active.as_mut()?;

        if !state.advance(Utc::now()) {
            debug!("{}: scaling at {}", symbol, state.scaling_progress);
            return None;
        }

        info!("{}: transition {} -> {} COMPLETED", symbol, state.from_regime, state.to_regime);
        let confidence = state.confidence;
        Some(TransitionEvent::new(TransitionEventType::Completed, state, confidence))
    }

    pub fn get_transition_state(&self, symbol: &str) -> Option<TransitionState> {
        self.symbols.get(symbol).and_then(|s| s.active.clone())
    }

    pub fn is_in_transition(&self, symbol: &str) -> bool {
        self.symbols
            .get(symbol)
            .map(|s| s.active.is_some())
            .unwrap_or(false)
    }

    /// 1.0 when settled, otherwise the active transition's progress.
    pub fn get_transition_scaling_factor(&self, symbol: &str) -> Decimal {
        self.symbols
            .get(symbol)
            .and_then(|s| s.active.as_ref().map(|t| t.scaling_progress))
            .unwrap_or(Decimal::ONE)
    }

    pub fn blend_position_size(&self, symbol: &str, old_regime_size: Decimal, new_regime_size: Decimal) -> Decimal {
        blend(old_regime_size, new_regime_size, self.get_transition_scaling_factor(symbol))
    }

    /// Applies the per-regime multipliers to `base_size`, blending across an active transition.
    pub fn regime_adjusted_size(&self, symbol: &str, base_size: Decimal) -> Decimal {
        let Some(entry) = self.symbols.get(symbol) else {
            return base_size;
        };
        match (&entry.active, entry.settled) {
            (Some(state), _) => blend_regime_size(base_size, state.from_regime, state.to_regime, state.scaling_progress),
            (None, Some(regime)) => base_size * regime.position_scale_factor(),
            (None, None) => base_size,
        }
    }

    pub fn current_regime(&self, symbol: &str) -> Option<RegimeTag> {
        self.symbols.get(symbol).and_then(|s| s.settled)
    }

    /// Most recent `limit` snapshots, oldest first.
    pub fn get_regime_history(&self, symbol: &str, limit: usize) -> Vec<RegimeSnapshot> {
        self.symbols
            .get(symbol)
            .map(|s| {
                let skip = s.history.len().saturating_sub(limit);
                s.history.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    pub fn get_dominant_regime(&self, symbol: &str, lookback: usize) -> Option<RegimeTag> {
        self.symbols.get(symbol).and_then(|s| s.dominant(lookback))
    }

    pub fn regime_distribution(&self, symbol: &str) -> HashMap<RegimeTag, usize> {
        let mut counts = HashMap::new();
        if let Some(s) = self.symbols.get(symbol) {
            for snapshot in &s.history {
                *counts.entry(snapshot.regime).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Serializes the symbol's snapshot history to JSON for external storage.
    pub fn export_history(&self, symbol: &str) -> Result<String> {
        let history = self.get_regime_history(symbol, self.settings.history_capacity);
        Ok(serde_json::to_string(&history)?)
    }

    /// Replaces the symbol's history with previously exported snapshots.
    /// Only the most recent entries up to the history capacity are kept.
    /// Returns the number of snapshots retained.
    pub fn import_history(&self, symbol: &str, json: &str) -> Result<usize> {
        let snapshots: Vec<RegimeSnapshot> = serde_json::from_str(json)?;
        let mut entry = self.symbols.entry(symbol.to_string()).or_default();
        entry.history.clear();
        for snapshot in snapshots {
            entry.record(snapshot, self.settings.history_capacity);
        }
        if entry.settled.is_none() && entry.active.is_none() {
            entry.settled = entry.dominant(entry.history.len());
        }
        info!("{}: restored {} regime snapshots", symbol, entry.history.len());
        Ok(entry.history.len())
    }

    pub fn clear_transition_data(&self, symbol: &str) {
        if self.symbols.remove(symbol).is_some() {
            info!("{}: transition data cleared", symbol);
        }
    }

    pub fn clear_all_transition_data(&self) {
        let count = self.symbols.len();
        self.symbols.clear();
        info!("All transition data cleared ({} symbols)", count);
    }
}
