use ::config::{Config, Environment, File};
use std::path::Path;
use tracing::{info, warn};

use super::runtime::RegimeConfig;
use crate::error::{RegimeError, Result};

pub const CONFIG_FILE_NAME: &str = "regime.toml";
pub const ENV_PREFIX: &str = "REGIME";

fn env_overrides() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl RegimeConfig {
    /// Layers `<config_dir>/regime.toml` (optional) and `REGIME_<SECTION>__<KEY>`
    /// environment variables over the defaults, then validates the result.
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        Self::load_layered(config_dir.as_ref(), env_overrides())
    }

    fn load_layered(config_dir: &Path, env: Environment) -> Result<Self> {
        let path = config_dir.join(CONFIG_FILE_NAME);

        let config: RegimeConfig = Config::builder()
            .add_source(File::from(path.as_path()).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.checked()
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RegimeConfig = toml::from_str(s)?;
        config.checked()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn checked(self) -> Result<Self> {
        if let Err(errors) = self.validate() {
            warn!("Rejected regime configuration: {}", errors.join(", "));
            return Err(RegimeError::InvalidConfig(errors));
        }
        info!(
            "Regime config loaded: min_confidence={}, confirmation_periods={}, scaling_steps={}",
            self.transition.min_confidence,
            self.transition.confirmation_periods,
            self.transition.scaling_steps
        );
        Ok(self)
    }
}
