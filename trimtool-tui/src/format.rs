//! Display formatting shared by pages.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

/// `"2024-05-01T10:00:00"` → `"May 1, 2024, 10:00 AM"`.
///
/// Timestamps with an offset are shown in local time; naive ones are taken
/// as local already. Missing values give `"N/A"`, unparseable ones
/// `"Invalid Date"`.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(dt) = date.and_hms_opt(0, 0, 0)
    {
        return dt.format(DATE_FORMAT).to_string();
    }

    log::debug!("unparseable date {:?}", raw);
    "Invalid Date".to_string()
}

/// `1234567` → `"1,234,567"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Cuts `text` to at most `width` terminal cells, ending in `…` when cut.
pub fn truncate(text: &str, width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if unicode_width::UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_naive() {
        assert_eq!(
            format_date(Some("2024-05-01T10:00:00")),
            "May 1, 2024, 10:00 AM"
        );
        assert_eq!(
            format_date(Some("2023-12-24T21:05:33.123456")),
            "Dec 24, 2023, 09:05 PM"
        );
        assert_eq!(format_date(Some("2022-02-03")), "Feb 3, 2022, 12:00 AM");
    }

    #[test]
    fn test_format_date_missing_or_bad() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("  ")), "N/A");
        assert_eq!(format_date(Some("yesterday")), "Invalid Date");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Camry", 10), "Camry");
        assert_eq!(truncate("Land Cruiser", 6), "Land …");
        assert_eq!(truncate("abc", 0), "");
    }
}
