//! Market regime classification with hysteresis-controlled transitions.
//!
//! [`RegimeAnalyzer`] turns a symbol's daily bars into a [`RegimeAnalysis`].
//! [`RegimeTransitionManager`] feeds successive analyses through a per-symbol
//! state machine that requires repeated confirmation before switching regimes,
//! then scales exposure into the new regime over several periods. Crisis
//! signals bypass confirmation.

pub mod config;
pub mod error;
pub mod indicators;
pub mod regime;
pub mod types;

pub use crate::config::{
    AnalyzerSettings, ClassifierThresholds, RegimeConfig, SensitivityProfile, TransitionSettings,
};
pub use error::{RegimeError, Result};
pub use regime::{classify, RegimeAnalyzer, RegimeTransitionManager};
pub use types::{
    PriceBar, RegimeAnalysis, RegimeSnapshot, RegimeTag, TransitionEvent, TransitionEventType,
    TransitionState,
};
