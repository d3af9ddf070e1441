use chrono::NaiveDate;

/// Placeholder shown for fields the API left out
pub const NOT_AVAILABLE: &str = "N/A";

/// Date layouts the API has been seen to return, tried in order by `format_date_us`
const API_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];

/// Truncate a string to `max_chars` characters, adding ellipsis if anything was cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning "N/A" if None or blank
pub fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Treat blank operator input as "not supplied"
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Format an API date string as MM/DD/YYYY.
/// Unrecognized input is returned unchanged.
pub fn format_date_us(date: &str) -> String {
    let date = date.trim();
    if date.is_empty() || date == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_string();
    }

    // Timestamps like 2024-01-01T00:00:00 carry the date in the first 10 chars
    let candidate = if date.len() > 10 && date.as_bytes().get(10) == Some(&b'T') {
        &date[..10]
    } else {
        date
    };

    API_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| date.to_string())
}
