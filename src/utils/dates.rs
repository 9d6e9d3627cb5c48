use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Formats tried after the declared chart date format fails.
const FALLBACK_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Time zone used to turn epoch milliseconds into calendar dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateZone {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl FromStr for DateZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "utc" | "z" | "" => Ok(DateZone::Utc),
            "local" => Ok(DateZone::Local),
            _ => FixedOffset::from_str(trimmed)
                .map(DateZone::Fixed)
                .map_err(|_| format!("Invalid DATE_TIMEZONE '{}': expected UTC, local or +HH:MM", s)),
        }
    }
}

impl fmt::Display for DateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateZone::Utc => write!(f, "UTC"),
            DateZone::Local => write!(f, "local"),
            DateZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Converts epoch milliseconds to the calendar date in `zone`.
pub fn epoch_millis_to_date(millis: i64, zone: DateZone) -> Option<NaiveDate> {
    let utc: DateTime<Utc> = DateTime::from_timestamp_millis(millis)?;
    let date = match zone {
        DateZone::Utc => utc.date_naive(),
        DateZone::Local => utc.with_timezone(&Local).date_naive(),
        DateZone::Fixed(offset) => utc.with_timezone(&offset).date_naive(),
    };
    Some(date)
}

/// `DD/MM/YYYY` rendering of an epoch-millisecond timestamp.
pub fn format_epoch_millis(millis: i64, zone: DateZone) -> Option<String> {
    epoch_millis_to_date(millis, zone).map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
}

/// Parses a chart axis date with the declared format first, then the common fallbacks.
pub fn parse_axis_date(text: &str, declared_format: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, declared_format) {
        return Some(date);
    }
    for format in FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_epoch_millis_utc() {
        assert_eq!(
            format_epoch_millis(1_700_000_000_000, DateZone::Utc).as_deref(),
            Some("14/11/2023")
        );
    }

    #[test]
    fn test_format_epoch_millis_fixed_offset_crosses_midnight() {
        // 2023-11-14T22:13:20Z
        let zone: DateZone = "+02:00".parse().unwrap();
        assert_eq!(
            format_epoch_millis(1_700_000_000_000, zone).as_deref(),
            Some("15/11/2023")
        );
    }

    #[test]
    fn test_date_zone_parsing() {
        assert_eq!("UTC".parse::<DateZone>().unwrap(), DateZone::Utc);
        assert_eq!("Local".parse::<DateZone>().unwrap(), DateZone::Local);
        assert!("Europe/Paris".parse::<DateZone>().is_err());
    }

    #[test]
    fn test_parse_axis_date_fallbacks() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_axis_date("01/03/2024", "%d/%m/%Y"), Some(expected));
        assert_eq!(parse_axis_date("2024-03-01", "%d/%m/%Y"), Some(expected));
        assert_eq!(parse_axis_date("2024-03-01T10:00:00+01:00", "%d/%m/%Y"), Some(expected));
        assert_eq!(parse_axis_date("mars 2024", "%d/%m/%Y"), None);
    }
}
