const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size with one decimal, e.g. `1536 -> "1.5 KB"`.
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    // floor(log1024(n)) by repeated division, which stays exact at unit boundaries.
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;

    // `{}` on f64 already drops a trailing ".0".
    format!("{} {}", rounded, UNITS[unit])
}

/// `M:SS` for a second count; `"00:00"` when the value is unknown.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "00:00".to_string();
    }
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}
