pub mod format;

pub use format::{celsius_to_fahrenheit, fahrenheit_to_celsius, format_duration, format_temperature};
