//! Sandbox configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `blastwave.ron` file (if exists), or the file given with `--config`
//! 3. Environment variables prefixed with `BLASTWAVE_`
//!
//! Example environment variable: `BLASTWAVE_SIMULATION__FIXED_STEP=0.01`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blastwave_core::BlastwaveConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SandboxConfig {
    #[serde(default)]
    pub simulation: BlastwaveConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// Scenario run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks to simulate when the scenario does not say
    pub ticks: usize,
    /// Seed for damage rolls
    pub seed: u64,
    /// Reaction set to load instead of the bundled one
    #[serde(default)]
    pub reactions: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 3000,
            seed: 0,
            reactions: None,
        }
    }
}

impl SandboxConfig {
    /// Load configuration with layered priority
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("blastwave")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("simulation.fixed_step", 0.02)?
            .set_default("run.ticks", 3000_i64)?
            .set_default("run.seed", 0_i64)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (BLASTWAVE_RUN__TICKS, etc.)
            .add_source(Environment::with_prefix("BLASTWAVE").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SandboxConfig::default();
        assert_eq!(config.run.ticks, 3000);
        assert_eq!(config.simulation.fixed_step, 0.02);
        assert!(config.run.reactions.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(
            file,
            "(simulation: (fixed_step: 0.01, blast: (max_radius: 800.0)), run: (ticks: 50, seed: 9))"
        )
        .unwrap();

        let config = SandboxConfig::load(Some(file.path())).expect("Failed to load config");
        assert_eq!(config.simulation.fixed_step, 0.01);
        assert_eq!(config.simulation.blast.max_radius, 800.0);
        assert_eq!(config.simulation.blast.baseline_pool_size, 32);
        assert_eq!(config.run.ticks, 50);
        assert_eq!(config.run.seed, 9);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = SandboxConfig::load(Some(Path::new("does/not/exist.ron")));
        assert!(result.is_err());
    }
}
