//! Submittal date handling
//!
//! The project date arrives as free text. Recognized dates are normalized to the
//! long form used on the cover page; anything else is printed as given.

use chrono::{Local, NaiveDate};

/// Parse the project date field
///
/// Supported formats:
/// - `"today"` → current local date
/// - `"2024-11-20"` → ISO format
/// - `"11/20/2024"` → US format
pub fn parse_project_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if text.eq_ignore_ascii_case("today") {
        return Some(Local::now().date_naive());
    }

    // Browsers send date inputs as ISO; some callers send full timestamps
    let date_part = text.split('T').next().unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .ok()
}

/// Format a date in the standard format: "Month day, year"
/// Example: "November 20, 2024"
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Text to print for the project date
pub fn display_date(text: &str) -> String {
    match parse_project_date(text) {
        Some(date) => format_date(&date),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_iso_date() {
        let date = parse_project_date("2024-11-20").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 11, 20));
    }

    #[test]
    fn test_parse_timestamp_keeps_date() {
        let date = parse_project_date("2024-11-20T15:04:05.000Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 11, 20).unwrap());
    }

    #[test]
    fn test_parse_us_date() {
        let date = parse_project_date("11/20/2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 11, 20).unwrap());
    }

    #[test]
    fn test_parse_today() {
        assert_eq!(parse_project_date("Today"), Some(Local::now().date_naive()));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_project_date(""), None);
        assert_eq!(parse_project_date("2024-13-01"), None);
        assert_eq!(parse_project_date("next week"), None);
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(format_date(&date), "January 7, 2026");
    }

    #[test]
    fn test_display_date_falls_back_to_text() {
        assert_eq!(display_date("2024-11-20"), "November 20, 2024");
        assert_eq!(display_date("  Q3 2025 "), "Q3 2025");
        assert_eq!(display_date(""), "");
    }
}
