//! Client configuration management.
//!
//! The config file holds the account email, the target thermostat serial,
//! the browser-captured OAuth material, and the display unit preference.
//! It is loaded once at startup and never mutated by the client.
//!
//! Configuration is stored at `~/.config/nestctl/config.toml` unless an
//! explicit path is given.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::TemperatureUnit;

/// Application name used for the config directory path
const APP_NAME: &str = "nestctl";

/// Config file name
const CONFIG_FILE: &str = "config.toml";

/// Vendor-enforced safe temperature range in Celsius. The vendor can change
/// these without notice, so they are defaults for the `[limits]` section
/// rather than hard limits.
const DEFAULT_MIN_TEMPERATURE_C: f64 = 9.0;
const DEFAULT_MAX_TEMPERATURE_C: f64 = 32.0;

/// HTTP request timeout in seconds. 30s allows for slow API responses while
/// still failing fast enough to be usable interactively.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub credentials: Credentials,
    #[serde(default)]
    pub device: DeviceSection,
    pub oauth: OauthSection,
    pub units: UnitsSection,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub http: HttpSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Account email address
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceSection {
    /// Thermostat serial number
    pub serial: Option<String>,
}

/// Browser-derived authentication material. Obtaining these values is a
/// manual procedure documented in the README; the vendor offers no
/// programmatic credential issuance.
#[derive(Debug, Clone, Deserialize)]
pub struct OauthSection {
    pub cookie: String,
    pub login_hint: String,
    pub client_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitsSection {
    /// `f` or `c` (full words accepted). Affects display and input
    /// conversion only; the wire unit is always Celsius.
    pub temperature: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    /// Operating modes the vendor accepts for writes
    pub modes: Vec<String>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_temperature_c: DEFAULT_MIN_TEMPERATURE_C,
            max_temperature_c: DEFAULT_MAX_TEMPERATURE_C,
            modes: ["cool", "heat", "range", "off"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn validate(&self) -> Result<()> {
        if self.credentials.email.trim().is_empty() {
            bail!("[credentials] email must not be empty");
        }
        if self.oauth.cookie.trim().is_empty() {
            bail!("[oauth] cookie must not be empty - see the README for the capture procedure");
        }
        if self.oauth.login_hint.trim().is_empty() || self.oauth.client_id.trim().is_empty() {
            bail!("[oauth] login_hint and client_id must not be empty");
        }
        if self.limits.min_temperature_c >= self.limits.max_temperature_c {
            bail!(
                "[limits] min_temperature_c ({}) must be below max_temperature_c ({})",
                self.limits.min_temperature_c,
                self.limits.max_temperature_c
            );
        }
        self.temp_unit()?;
        Ok(())
    }

    /// The configured display unit, with `fahrenheit`/`celsius` and mixed
    /// case normalized the same way the config file historically allowed.
    pub fn temp_unit(&self) -> Result<TemperatureUnit> {
        self.units
            .temperature
            .parse()
            .map_err(|_| anyhow::anyhow!(
                "Invalid [units] temperature={:?} - must be 'c' or 'f'",
                self.units.temperature
            ))
    }

    /// The serial from `[device]`, for operations that did not name one.
    pub fn serial(&self) -> Result<&str> {
        self.device
            .serial
            .as_deref()
            .context("No [device] serial configured and none was given")
    }
}
