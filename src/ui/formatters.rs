use chrono::{DateTime, Local, Utc};
use humansize::{format_size, BINARY};

/// Format a byte count in human-readable binary units (KiB, MiB, GiB)
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Format a power reading, or "N/A" when the driver gave none
pub fn format_watts(watts: Option<f32>) -> String {
    match watts {
        Some(w) => format!("{:.1} W", w),
        None => "N/A".to_string(),
    }
}

/// Format a sample timestamp in local time (YYYY-MM-DD HH:MM:SS)
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a memory usage line: "used / total (pct%)"
pub fn format_usage(used: u64, total: u64) -> String {
    let percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    format!(
        "{} / {} ({:.1}%)",
        format_bytes(used),
        format_bytes(total),
        percent
    )
}
