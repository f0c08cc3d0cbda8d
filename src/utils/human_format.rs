//! Human-readable formatting for time values

use std::time::Duration;

/// Marker written where a channel has no measured response time
pub const NOT_AVAILABLE: &str = "N/A";

/// Response time as seconds with two decimals (`"0.42s"`), or `"N/A"`
pub fn format_response_time(response_time: Option<Duration>) -> String {
    match response_time {
        Some(d) => format!("{:.2}s", d.as_secs_f64()),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Formats an elapsed duration for stage summaries
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();

    if millis == 0 {
        return format!("{}µs", duration.as_micros());
    }

    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        let seconds = duration.as_secs_f64();
        if seconds >= 10.0 {
            format!("{seconds:.1}s")
        } else {
            format!("{seconds:.2}s")
        }
    } else {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if seconds == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m{seconds}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_response_time() {
        assert_eq!(format_response_time(Some(Duration::from_millis(420))), "0.42s");
        assert_eq!(format_response_time(Some(Duration::from_millis(1234))), "1.23s");
        assert_eq!(format_response_time(None), "N/A");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_millis(15_500)), "15.5s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m5s");
    }
}
