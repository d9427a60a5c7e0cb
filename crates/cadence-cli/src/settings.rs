//! CLI settings: defaults, then an optional TOML file, then `CADENCE__*`
//! environment variables (e.g. `CADENCE__PLANNER__SCAN_DAYS=30`).

use std::path::{Path, PathBuf};

use anyhow::Context;
use cadence_core::PlannerConfig;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// JSON snapshot backing the in-memory store.
    pub db_path: PathBuf,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub planner: PlannerConfig,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("cadence.json"),
            log_level: "warn".to_string(),
            planner: PlannerConfig::default(),
        }
    }
}

pub fn load(file: Option<&Path>) -> anyhow::Result<CliSettings> {
    let mut builder = Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix("CADENCE")
            .separator("__")
            .try_parsing(true),
    );

    let settings: CliSettings = builder
        .build()
        .context("reading configuration")?
        .try_deserialize()
        .context("decoding configuration")?;
    settings
        .planner
        .validate()
        .context("validating planner configuration")?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn no_sources_gives_defaults() {
        let settings = load(None).unwrap();
        assert_eq!(settings.planner, PlannerConfig::default());
    }

    #[test]
    fn file_overrides_selected_values() {
        let path = std::env::temp_dir().join(format!("cadence-settings-{}.toml", std::process::id()));
        fs::write(
            &path,
            "db_path = \"/tmp/plan.json\"\n\n[planner]\nbuffer_threshold_days = 7\n",
        )
        .unwrap();

        let settings = load(Some(&path)).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(settings.db_path, PathBuf::from("/tmp/plan.json"));
        assert_eq!(settings.planner.buffer_threshold_days, 7);
        assert_eq!(settings.planner.horizon_months, 15);
    }

    #[test]
    fn invalid_planner_values_are_rejected() {
        let path = std::env::temp_dir().join(format!("cadence-bad-{}.toml", std::process::id()));
        fs::write(&path, "[planner]\nscan_days = 0\n").unwrap();

        let result = load(Some(&path));
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
