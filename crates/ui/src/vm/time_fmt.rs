/// Two-decimal rendering used for scores and durations ("50.00", "12.35").
#[must_use]
pub fn format_fixed2(value: f64) -> String {
    format!("{value:.2}")
}

#[must_use]
pub fn format_duration(seconds: Option<f64>) -> String {
    seconds.map_or_else(|| "-".to_string(), |s| format!("{} seconds", format_fixed2(s)))
}
