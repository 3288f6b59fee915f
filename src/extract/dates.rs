//! Posting date resolution
//!
//! Sites expose dates in three shapes, tried in this order by the adapters:
//! an ISO timestamp in structured metadata, a French absolute timestamp in a
//! `title` attribute, and a relative phrase such as "il y a 3 h".

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(?:j|d|jours?|days?)\b").expect("days regex is valid")
    })
}

fn hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(?:h|hrs?|heures?|hours?)\b").expect("hours regex is valid")
    })
}

fn minutes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(?:min|mins|minutes?)\b").expect("minutes regex is valid")
    })
}

fn french_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s+(\w+)\s+(\d{4}),?\s+(\d{1,2}):(\d{2})(?::(\d{2}))?")
            .expect("french timestamp regex is valid")
    })
}

const FRENCH_MONTHS: &[&str] = &[
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Resolves a relative age phrase against `now`
///
/// Day, hour and minute components are read independently and subtracted
/// from `now`. Returns `None` when the phrase carries no non-zero component
/// or when the age does not fit chrono's range.
///
/// # Examples
///
/// ```
/// use brickscout::extract::resolve_relative;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap();
/// let posted = resolve_relative("il y a 2 h", now).unwrap();
/// assert_eq!(posted, Utc.with_ymd_and_hms(2024, 3, 12, 10, 0, 0).unwrap());
/// ```
pub fn resolve_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    // A component that is present but unreadable voids the whole phrase
    let component = |re: &Regex| -> Option<i64> {
        match re.captures(text) {
            Some(caps) => caps[1].parse::<i64>().ok(),
            None => Some(0),
        }
    };

    let days = component(days_re())?;
    let hours = component(hours_re())?;
    let minutes = component(minutes_re())?;

    if days == 0 && hours == 0 && minutes == 0 {
        return None;
    }

    let age = Duration::try_days(days)?
        .checked_add(&Duration::try_hours(hours)?)?
        .checked_add(&Duration::try_minutes(minutes)?)?;
    now.checked_sub_signed(age)
}

/// Parses a French absolute timestamp such as `"12 mars 2024, 14:05:00"`
///
/// The time is read as UTC.
pub fn parse_french_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let caps = french_timestamp_re().captures(text)?;

    let day: u32 = caps[1].parse().ok()?;
    let month_name = caps[2].to_lowercase();
    let month = FRENCH_MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let year: i32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    let second: u32 = caps.get(6).map_or(Some(0), |s| s.as_str().parse().ok())?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Parses an ISO 8601 / RFC 3339 timestamp into UTC
pub fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_hours() {
        assert_eq!(
            resolve_relative("il y a 3 h", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(
            resolve_relative("il y a 2 j", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_relative_minutes() {
        assert_eq!(
            resolve_relative("15 min", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 11, 45, 0).unwrap())
        );
    }

    #[test]
    fn test_relative_combined() {
        assert_eq!(
            resolve_relative("1 j 2 h 30 min", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 11, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_relative_english() {
        assert_eq!(
            resolve_relative("3 days ago", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap())
        );
        assert_eq!(
            resolve_relative("5 hours ago", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 7, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_relative_depends_only_on_injected_now() {
        let later = now() + Duration::hours(1);
        let a = resolve_relative("2 h", now()).unwrap();
        let b = resolve_relative("2 h", later).unwrap();
        assert_eq!(b - a, Duration::hours(1));
    }

    #[test]
    fn test_relative_unrecognized() {
        assert_eq!(resolve_relative("", now()), None);
        assert_eq!(resolve_relative("Hier", now()), None);
        assert_eq!(resolve_relative("il y a 0 h", now()), None);
    }

    #[test]
    fn test_relative_out_of_range_age() {
        assert_eq!(resolve_relative("il y a 100000000 j", now()), None);
        assert_eq!(resolve_relative("il y a 999999999999999 j", now()), None);
        assert_eq!(resolve_relative("il y a 9999999999999999 h", now()), None);
        assert_eq!(resolve_relative("il y a 99999999999999999999999 min", now()), None);
    }

    #[test]
    fn test_relative_unreadable_component_voids_phrase() {
        assert_eq!(resolve_relative("99999999999999999999 j 2 h", now()), None);
    }

    #[test]
    fn test_french_timestamp() {
        assert_eq!(
            parse_french_timestamp("12 mars 2024, 14:05:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 14, 5, 0).unwrap())
        );
    }

    #[test]
    fn test_french_timestamp_accented_month() {
        assert_eq!(
            parse_french_timestamp("Publié le 3 février 2024, 08:30:15"),
            Some(Utc.with_ymd_and_hms(2024, 2, 3, 8, 30, 15).unwrap())
        );
        assert_eq!(
            parse_french_timestamp("15 août 2023, 23:59"),
            Some(Utc.with_ymd_and_hms(2023, 8, 15, 23, 59, 0).unwrap())
        );
    }

    #[test]
    fn test_french_timestamp_invalid() {
        assert_eq!(parse_french_timestamp("12 march 2024, 14:05:00"), None);
        assert_eq!(parse_french_timestamp("31 février 2024, 10:00:00"), None);
        assert_eq!(parse_french_timestamp("il y a 3 h"), None);
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(
            parse_iso("2024-03-12T14:05:00+01:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 13, 5, 0).unwrap())
        );
        assert_eq!(parse_iso("yesterday"), None);
    }
}
