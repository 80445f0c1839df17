//! Data models for thermostat state.
//!
//! - `DeviceState`: live snapshot of one thermostat
//! - `Mode`, `HvacState`: operating mode and current HVAC activity
//! - `TemperatureUnit`: display/input unit preference
//! - `DeviceValue`, `SharedValue`: raw bucket values as the vendor sends them

pub mod device;

pub use device::{DeviceState, DeviceValue, HvacState, Mode, SharedValue, TemperatureUnit};
