//! Parsing of operator-entered dates.
//!
//! Accepted input layouts are an explicit, ordered list rather than a guess:
//! the first layout that parses wins. The default list contains no
//! day-first layout, so "01/02/2020" is always January 2nd.

use chrono::NaiveDate;

use crate::api::ApiError;

/// Layouts accepted when no list is configured: US month-first, then ISO.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Layout the eligibility API expects on the wire.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    formats: Vec<String>,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl DateFormats {
    /// Build from a configured list. An empty list falls back to the defaults.
    pub fn new(formats: Vec<String>) -> Self {
        if formats.is_empty() {
            Self::default()
        } else {
            Self { formats }
        }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Parse operator input, trying each layout in order.
    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        let input = input.trim();
        self.formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
    }

    /// Parse a named field, producing an `InvalidInput` error that lists the
    /// accepted layouts.
    pub fn parse_field(&self, field: &str, input: &str) -> Result<NaiveDate, ApiError> {
        if input.trim().is_empty() {
            return Err(ApiError::InvalidInput(format!("{} is required", field)));
        }
        self.parse(input).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "Invalid {} '{}'. Accepted formats: {}",
                field,
                input.trim(),
                self.describe()
            ))
        })
    }

    /// Human-readable list of accepted layouts, e.g. "MM/DD/YYYY, YYYY-MM-DD"
    pub fn describe(&self) -> String {
        self.formats
            .iter()
            .map(|f| {
                f.replace("%m", "MM")
                    .replace("%d", "DD")
                    .replace("%Y", "YYYY")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Render a date the way the API expects it.
pub fn to_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formats_parse_us_and_iso() {
        let formats = DateFormats::default();
        let expected = NaiveDate::from_ymd_opt(1990, 1, 15);
        assert_eq!(formats.parse("01/15/1990"), expected);
        assert_eq!(formats.parse("1990-01-15"), expected);
        assert_eq!(formats.parse(" 01/15/1990 "), expected);
    }

    #[test]
    fn test_default_formats_are_month_first() {
        let formats = DateFormats::default();
        assert_eq!(formats.parse("01/02/2020"), NaiveDate::from_ymd_opt(2020, 1, 2));
        // Day-first input is rejected rather than reinterpreted
        assert_eq!(formats.parse("15/01/1990"), None);
    }

    #[test]
    fn test_configured_order_wins() {
        let formats = DateFormats::new(vec!["%d/%m/%Y".to_string(), "%m/%d/%Y".to_string()]);
        assert_eq!(formats.parse("01/02/2020"), NaiveDate::from_ymd_opt(2020, 2, 1));
    }

    #[test]
    fn test_empty_list_falls_back_to_defaults() {
        assert_eq!(DateFormats::new(vec![]), DateFormats::default());
    }

    #[test]
    fn test_parse_field_errors() {
        let formats = DateFormats::default();
        let err = formats.parse_field("date of birth", "").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(ref m) if m.contains("required")));

        let err = formats.parse_field("date of birth", "1990/13/45").unwrap_err();
        match err {
            ApiError::InvalidInput(m) => {
                assert!(m.contains("MM/DD/YYYY"));
                assert!(m.contains("YYYY-MM-DD"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_to_api_date() {
        let date = NaiveDate::from_ymd_opt(1990, 1, 5).unwrap();
        assert_eq!(to_api_date(date), "1990-01-05");
    }
}
