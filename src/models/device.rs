//! Domain models for thermostat state.
//!
//! The vendor reports device state as two "buckets" keyed by serial number:
//! `device.<serial>` (hardware info, humidity, fan timer) and
//! `shared.<serial>` (temperatures and HVAC state). `DeviceState` is the
//! client-facing snapshot assembled from both. Wire temperatures are always
//! Celsius; display conversion happens at the presentation layer.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::utils::format::{celsius_to_fahrenheit, fahrenheit_to_celsius};

/// Temperature unit preference for display and input values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a value in this unit to the wire unit (Celsius)
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => fahrenheit_to_celsius(value),
        }
    }

    /// Convert a wire (Celsius) value to this unit for display
    pub fn from_celsius(self, value_c: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value_c,
            TemperatureUnit::Fahrenheit => celsius_to_fahrenheit(value_c),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "c"),
            TemperatureUnit::Fahrenheit => write!(f, "f"),
        }
    }
}

/// Thermostat operating mode.
///
/// The vendor defines this set and can extend it without notice, so unknown
/// wire values parse into `Other` instead of failing the whole status fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Cool,
    Heat,
    /// Maintain a low/high temperature range ("heat-cool")
    Range,
    Off,
    Other(String),
}

impl Mode {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "cool" => Mode::Cool,
            "heat" => Mode::Heat,
            "range" => Mode::Range,
            "off" => Mode::Off,
            other => Mode::Other(other.to_string()),
        }
    }

    pub fn wire_value(&self) -> &str {
        match self {
            Mode::Cool => "cool",
            Mode::Heat => "heat",
            Mode::Range => "range",
            Mode::Off => "off",
            Mode::Other(value) => value,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_value())
    }
}

/// What the HVAC system is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacState {
    Cooling,
    Heating,
    FanRunning,
    Off,
}

impl fmt::Display for HvacState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HvacState::Cooling => "cooling",
            HvacState::Heating => "heating",
            HvacState::FanRunning => "fan running",
            HvacState::Off => "off",
        };
        write!(f, "{}", s)
    }
}

/// Raw `device.<serial>` bucket value - only the fields we use
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceValue {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_humidity: Option<f64>,
    /// Epoch seconds at which the fan timer ends; 0 when the fan is off
    #[serde(default)]
    pub fan_timer_timeout: Option<i64>,
}

/// Raw `shared.<serial>` bucket value
#[derive(Debug, Clone, Deserialize)]
pub struct SharedValue {
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub target_temperature_type: String,
    #[serde(default)]
    pub target_temperature_low: Option<f64>,
    #[serde(default)]
    pub target_temperature_high: Option<f64>,
    #[serde(default)]
    pub hvac_ac_state: bool,
    #[serde(default)]
    pub hvac_heater_state: bool,
    #[serde(default)]
    pub hvac_fan_state: bool,
    #[serde(default)]
    pub can_heat: bool,
    #[serde(default)]
    pub can_cool: bool,
}

/// A point-in-time snapshot of one thermostat. Every read is a live fetch;
/// nothing here is cached by the client.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub serial: String,
    pub name: String,
    /// Measured temperature in Celsius
    pub current_temperature: f64,
    /// Target temperature in Celsius
    pub target_temperature: f64,
    /// Low/high bounds in Celsius, when the device reports a range
    pub target_range: Option<(f64, f64)>,
    pub mode: Mode,
    pub hvac: HvacState,
    pub humidity: Option<f64>,
    pub can_heat: bool,
    pub can_cool: bool,
    /// Epoch seconds at which a manually started fan stops, if running
    pub fan_timer_timeout: Option<i64>,
}

impl DeviceState {
    pub fn from_buckets(serial: &str, device: &DeviceValue, shared: &SharedValue) -> Self {
        let hvac = if shared.hvac_ac_state {
            HvacState::Cooling
        } else if shared.hvac_heater_state {
            HvacState::Heating
        } else if shared.hvac_fan_state {
            HvacState::FanRunning
        } else {
            HvacState::Off
        };
        let target_range = match (shared.target_temperature_low, shared.target_temperature_high) {
            (Some(low), Some(high)) => Some((low, high)),
            _ => None,
        };
        Self {
            serial: serial.to_string(),
            name: device.name.clone().unwrap_or_else(|| "Thermostat".to_string()),
            current_temperature: shared.current_temperature,
            target_temperature: shared.target_temperature,
            target_range,
            mode: Mode::from_wire(&shared.target_temperature_type),
            hvac,
            humidity: device.current_humidity,
            can_heat: shared.can_heat,
            can_cool: shared.can_cool,
            fan_timer_timeout: device.fan_timer_timeout.filter(|&t| t > 0),
        }
    }

    pub fn current_temperature_in(&self, unit: TemperatureUnit) -> f64 {
        unit.from_celsius(self.current_temperature)
    }

    pub fn target_temperature_in(&self, unit: TemperatureUnit) -> f64 {
        unit.from_celsius(self.target_temperature)
    }

    pub fn running(&self) -> bool {
        self.hvac != HvacState::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_value(json: &str) -> SharedValue {
        serde_json::from_str(json).expect("Failed to parse shared bucket value")
    }

    #[test]
    fn test_state_from_buckets() {
        let device: DeviceValue = serde_json::from_str(
            r#"{"name": "Hallway", "current_humidity": 42.0, "fan_timer_timeout": 0, "battery_level": 3.9}"#,
        )
        .unwrap();
        let shared = shared_value(
            r#"{
                "current_temperature": 21.5,
                "target_temperature": 20.0,
                "target_temperature_type": "heat",
                "target_temperature_low": 19.0,
                "target_temperature_high": 24.0,
                "hvac_ac_state": false,
                "hvac_heater_state": true,
                "hvac_fan_state": true,
                "can_heat": true,
                "can_cool": false
            }"#,
        );

        let state = DeviceState::from_buckets("02AA01AC481501RE", &device, &shared);
        assert_eq!(state.name, "Hallway");
        assert_eq!(state.mode, Mode::Heat);
        assert_eq!(state.hvac, HvacState::Heating);
        assert_eq!(state.target_range, Some((19.0, 24.0)));
        assert_eq!(state.humidity, Some(42.0));
        assert_eq!(state.fan_timer_timeout, None);
        assert!(state.running());
    }

    #[test]
    fn test_unknown_mode_is_preserved() {
        // The mode set is vendor-defined and open; a new value must not
        // break status parsing
        let mode = Mode::from_wire("eco");
        assert_eq!(mode, Mode::Other("eco".to_string()));
        assert_eq!(mode.wire_value(), "eco");
    }

    #[test]
    fn test_hvac_precedence() {
        let shared = shared_value(
            r#"{
                "current_temperature": 24.0,
                "target_temperature": 22.0,
                "target_temperature_type": "cool",
                "hvac_ac_state": true,
                "hvac_fan_state": true
            }"#,
        );
        let state = DeviceState::from_buckets("S", &DeviceValue::default(), &shared);
        assert_eq!(state.hvac, HvacState::Cooling);
        assert_eq!(state.name, "Thermostat");
        assert_eq!(state.target_range, None);
    }

    #[test]
    fn test_display_conversion() {
        let shared = shared_value(
            r#"{"current_temperature": 20.0, "target_temperature": 20.0, "target_temperature_type": "heat"}"#,
        );
        let state = DeviceState::from_buckets("S", &DeviceValue::default(), &shared);
        assert_eq!(state.current_temperature_in(TemperatureUnit::Celsius), 20.0);
        assert_eq!(state.current_temperature_in(TemperatureUnit::Fahrenheit), 68.0);
    }
}
