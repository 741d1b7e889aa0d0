//! Layered planner configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`SITE_SCHEDULE_*`, `__` separates sections)
//! 2. An explicit TOML file passed to [`PlannerConfig::load_from`]
//! 3. `./site-schedule.toml` in the working directory
//! 4. Built-in defaults
//!
//! `SITE_SCHEDULE_SCHEDULING__MAX_SUBTASK_DAYS=5` maps to
//! `scheduling.max_subtask_days`.

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SITE_SCHEDULE_";
pub const LOCAL_CONFIG_FILE: &str = "site-schedule.toml";

const fn default_max_subtask_days() -> i64 {
    3
}

/// What to do with a dependency id that matches no task in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDependencyPolicy {
    /// Drop the edge and log a warning; the task starts as if the
    /// dependency were absent.
    #[default]
    Ignore,
    /// Fail the computation with `ScheduleError::MissingDependency`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Longest sub-task the generator creates when splitting a phase.
    #[serde(default = "default_max_subtask_days")]
    pub max_subtask_days: i64,

    #[serde(default)]
    pub missing_dependencies: MissingDependencyPolicy,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_subtask_days: default_max_subtask_days(),
            missing_dependencies: MissingDependencyPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

impl PlannerConfig {
    /// Defaults, local file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment())
    }

    /// Like [`load`](Self::load) with `path` layered above the local file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let figment = Self::base_figment()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment)
    }

    pub fn figment() -> Figment {
        Self::base_figment().merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn base_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }
        figment
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduling.max_subtask_days < 1 {
            return Err(ConfigError::InvalidValue {
                field: "scheduling.max_subtask_days".into(),
                reason: format!(
                    "must be at least 1 (got {})",
                    self.scheduling.max_subtask_days
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_correct() {
        let config = PlannerConfig::default();
        assert_eq!(config.scheduling.max_subtask_days, 3);
        assert_eq!(
            config.scheduling.missing_dependencies,
            MissingDependencyPolicy::Ignore
        );
    }

    #[test]
    fn figment_builds_without_files() {
        Jail::expect_with(|_jail| {
            let config = PlannerConfig::load().expect("defaults extract");
            assert_eq!(config, PlannerConfig::default());
            Ok(())
        });
    }

    #[test]
    fn local_file_and_env_layer_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                [scheduling]
                max_subtask_days = 5
                missing_dependencies = "reject"
                "#,
            )?;
            let config = PlannerConfig::load().expect("file config");
            assert_eq!(config.scheduling.max_subtask_days, 5);
            assert_eq!(
                config.scheduling.missing_dependencies,
                MissingDependencyPolicy::Reject
            );

            jail.set_env("SITE_SCHEDULE_SCHEDULING__MAX_SUBTASK_DAYS", "2");
            let config = PlannerConfig::load().expect("env config");
            assert_eq!(config.scheduling.max_subtask_days, 2);
            Ok(())
        });
    }

    #[test]
    fn explicit_file_is_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[scheduling]\nmax_subtask_days = 4\n")?;
            let config = PlannerConfig::load_from("custom.toml").expect("explicit file");
            assert_eq!(config.scheduling.max_subtask_days, 4);
            Ok(())
        });
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("SITE_SCHEDULE_SCHEDULING__MAX_SUBTASK_DAYS", "0");
            let err = PlannerConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
            Ok(())
        });
    }
}
