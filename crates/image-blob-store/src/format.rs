//! Human-readable byte sizes

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count using 1024-based units, e.g. `1.50 KB`
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, UNITS[unit])
}
