//! Human readable distances, durations and arrival times
use chrono::{DateTime, Duration, TimeZone};
use std::fmt::Display;

/// Format a distance in meters, switching to kilometers at 1 km
pub fn format_distance(meters: f64) -> String {
    let meters = meters.max(0.0);
    let rounded = meters.round();
    if rounded < 1000.0 {
        format!("{} m", rounded as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Format a duration in seconds as whole minutes, or hours and minutes past the hour
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 60.0 {
        return "< 1 min".to_string();
    }
    let minutes = (seconds / 60.0).floor() as i64;
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Wall clock arrival time (HH:MM) when leaving at `departure`
pub fn format_arrival<Tz>(departure: DateTime<Tz>, seconds: f64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let travel = Duration::seconds(seconds.max(0.0).round() as i64);
    (departure + travel).format("%H:%M").to_string()
}
