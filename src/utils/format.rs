/// Convert a temperature in Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(deg_c: f64) -> f64 {
    (deg_c * 9.0 / 5.0) + 32.0
}

/// Convert a temperature in Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(deg_f: f64) -> f64 {
    (deg_f - 32.0) * 5.0 / 9.0
}

/// Format a temperature for display with one decimal place
pub fn format_temperature(value: f64) -> String {
    format!("{:.1}", value)
}

/// Format a duration in seconds as HH:MM:SS (with a leading day count if needed)
pub fn format_duration(seconds: u64) -> String {
    let (minutes, s) = (seconds / 60, seconds % 60);
    let (hours, m) = (minutes / 60, minutes % 60);
    let (d, h) = (hours / 24, hours % 24);
    if d > 0 {
        format!("{}d{:02}:{:02}:{:02}", d, h, m, s)
    } else {
        format!("{:02}:{:02}:{:02}", h, m, s)
    }
}
