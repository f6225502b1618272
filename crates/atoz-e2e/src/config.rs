//! Run configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `atoz-e2e.toml` in the working directory, or the file given with `--config`
//! 3. `ATOZ_E2E_*` environment variables (`ATOZ_E2E_BASE_URL`, `ATOZ_E2E_WORKERS`, ...)
//! 4. command-line flags

use crate::error::ConfigError;
use crate::runner::RunnerOptions;
use crate::scenario::{Selection, Suite};
use crate::scenarios::CatalogueOptions;
use atoz_browser::{TestBrowserConfig, WaitConfig};
use figment::{
    providers::{Env, Format as _, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "atoz-e2e.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "ATOZ_E2E_";

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Site under test.
    pub base_url: String,
    /// Scenarios executing at once.
    pub workers: usize,
    /// Bound on each wait (load, visibility, URL), in milliseconds.
    pub step_timeout_ms: u64,
    /// Polling interval of every wait, in milliseconds.
    pub poll_interval_ms: u64,
    /// Bound on a whole scenario, in milliseconds.
    pub scenario_timeout_ms: u64,
    pub headless: bool,
    /// Chrome executable; auto-detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    /// Suites to run; empty means all.
    pub suites: Vec<Suite>,
    /// Case-insensitive substring of scenario ids to run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Write the JSON report here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_report: Option<PathBuf>,
    /// Write failure screenshots here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
    /// Loads per reload-stability scenario.
    pub stability_reloads: u32,
    pub skip_health_check: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1313".to_string(),
            workers: 4,
            step_timeout_ms: 10_000,
            poll_interval_ms: 100,
            scenario_timeout_ms: 120_000,
            headless: true,
            chrome_path: None,
            window_width: 1280,
            window_height: 720,
            suites: Vec::new(),
            filter: None,
            json_report: None,
            artifacts_dir: None,
            stability_reloads: 3,
            skip_health_check: false,
        }
    }
}

/// Values given on the command line; `None` leaves lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suites: Option<Vec<Suite>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_report: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Loads and validates the layered configuration.
    ///
    /// # Errors
    ///
    /// `NotFound` when `config_path` names a missing file, `Extract` when a
    /// layer does not deserialize, `InvalidValue` when validation fails.
    pub fn load(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Extract(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values for consistency.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, value: String, hint: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            hint: hint.to_string(),
        };

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid(
                "base_url",
                self.base_url.clone(),
                "use an absolute http:// or https:// URL",
            ));
        }
        if self.workers == 0 {
            return Err(invalid("workers", "0".into(), "run at least one scenario at a time"));
        }
        if self.step_timeout_ms == 0 {
            return Err(invalid("step_timeout_ms", "0".into(), "waits need a positive timeout"));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.step_timeout_ms {
            return Err(invalid(
                "poll_interval_ms",
                self.poll_interval_ms.to_string(),
                "must be positive and no larger than step_timeout_ms",
            ));
        }
        if self.scenario_timeout_ms < self.step_timeout_ms {
            return Err(invalid(
                "scenario_timeout_ms",
                self.scenario_timeout_ms.to_string(),
                "must be at least step_timeout_ms",
            ));
        }
        if self.stability_reloads < 2 {
            return Err(invalid(
                "stability_reloads",
                self.stability_reloads.to_string(),
                "comparing loads needs at least 2",
            ));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(invalid(
                "window_width/window_height",
                format!("{}x{}", self.window_width, self.window_height),
                "window dimensions must be positive",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn wait(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.step_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    #[must_use]
    pub fn browser_config(&self) -> TestBrowserConfig {
        let mut config = TestBrowserConfig::new()
            .with_window_size(self.window_width, self.window_height)
            .with_wait(self.wait());
        if !self.headless {
            config = config.visible();
        }
        if let Some(path) = &self.chrome_path {
            config = config.with_chrome_path(path.clone());
        }
        config
    }

    #[must_use]
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            workers: self.workers,
            wait: self.wait(),
            scenario_timeout: Duration::from_millis(self.scenario_timeout_ms),
            artifacts_dir: self.artifacts_dir.clone(),
            skip_health_check: self.skip_health_check,
        }
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection {
            suites: self.suites.clone(),
            filter: self.filter.clone(),
        }
    }

    #[must_use]
    pub fn catalogue_options(&self) -> CatalogueOptions {
        CatalogueOptions {
            stability_reloads: self.stability_reloads,
        }
    }
}
