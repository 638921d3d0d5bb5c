//! Human readable time formatting

/// Format seconds as `H:MM:SS`, or `MM:SS` under an hour.
///
/// Fractions of a second are dropped, so a timer shows `00:00` only once it
/// has fully run out.
pub fn format_time(total_seconds: f64) -> String {
    let total = if total_seconds.is_finite() && total_seconds > 0.0 {
        total_seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
