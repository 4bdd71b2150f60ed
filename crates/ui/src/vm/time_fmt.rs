use chrono::{DateTime, Utc};

/// Calendar date shown on lesson cards.
#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// "1 video", "3 videos".
#[must_use]
pub fn count_label(count: u32, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}
