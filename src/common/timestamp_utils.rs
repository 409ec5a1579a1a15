use chrono::{DateTime, Local};

// Get current local timestamp as a formatted string
pub fn current_local_timestamp_str(format_str: &str) -> String {
    let now: DateTime<Local> = Local::now();
    now.format(format_str).to_string()
}

// Date portion used for the daily log file name, e.g. "2024-01-01"
pub fn current_local_date_str() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
