//! Client library for the private Nest thermostat web API.
//!
//! The vendor offers no public API or credential issuance: authentication
//! bootstraps from a browser-captured OAuth cookie (see the README), which
//! is exchanged for a short-lived session token. Device state is read and
//! written through the same undocumented endpoints the vendor's web app
//! uses, so the wire coupling is isolated inside `api::client`.
//!
//! - `config`: the TOML config file with credentials and preferences
//! - `auth`: single-flight session token management
//! - `api`: the device client and error taxonomy
//! - `models`: thermostat state snapshots

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiError, NestClient};
pub use auth::{Session, SessionManager};
pub use config::Config;
pub use models::{DeviceState, HvacState, Mode, TemperatureUnit};
