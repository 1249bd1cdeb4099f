use serde::{Deserialize, Serialize};

use super::runtime::TransitionSettings;

/// How eagerly a symbol is allowed to switch regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensitivityProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl SensitivityProfile {
    pub fn name(&self) -> &str {
        match self {
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Aggressive => "Aggressive",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Conservative => "Five confirming days, ten-step blend. Fewest whipsaws, slowest reaction.",
            Self::Moderate => "Three confirming days, five-step blend.",
            Self::Aggressive => "Two confirming days, three-step blend. Reacts fast, whipsaws more.",
        }
    }

    pub fn transition_settings(&self) -> TransitionSettings {
        match self {
            Self::Conservative => TransitionSettings::conservative(),
            Self::Moderate => TransitionSettings::moderate(),
            Self::Aggressive => TransitionSettings::aggressive(),
        }
    }
}

impl TransitionSettings {
    pub fn conservative() -> Self {
        Self {
            min_confidence: 0.7,
            confirmation_periods: 5,
            scaling_steps: 10,
            history_capacity: 30,
        }
    }

    pub fn moderate() -> Self {
        Self {
            min_confidence: 0.6,
            confirmation_periods: 3,
            scaling_steps: 5,
            history_capacity: 30,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            min_confidence: 0.55,
            confirmation_periods: 2,
            scaling_steps: 3,
            history_capacity: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegimeConfig;

    #[test]
    fn test_profiles_are_valid() {
        for profile in [
            SensitivityProfile::Conservative,
            SensitivityProfile::Moderate,
            SensitivityProfile::Aggressive,
        ] {
            let config = RegimeConfig {
                transition: profile.transition_settings(),
                ..RegimeConfig::default()
            };
            assert!(config.validate().is_ok(), "{} profile invalid", profile.name());
        }
    }

    #[test]
    fn test_moderate_is_default() {
        assert_eq!(TransitionSettings::default(), SensitivityProfile::Moderate.transition_settings());
    }

    #[test]
    fn test_conservative_is_slower() {
        let c = TransitionSettings::conservative();
        let a = TransitionSettings::aggressive();
        assert!(c.confirmation_periods > a.confirmation_periods);
        assert!(c.scaling_steps > a.scaling_steps);
        assert!(c.min_confidence > a.min_confidence);
    }
}
