use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// What a failed (or absent) parse resolves to. The budget domain always
/// needs a concrete transaction date, so it falls back to today; a task due
/// date is genuinely optional, so the task domain falls back to no date.
/// The policy is an explicit call-site parameter, not two divergent parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFallback {
    /// Absent or unparseable input yields today's date.
    Today,
    /// Absent or unparseable input yields no date.
    Unset,
}

fn in_days_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"in\s+(\d+)\s+days?").unwrap())
}

/// Parse a natural-language date expression relative to an injected `today`.
///
/// Recognized, case-insensitive: `today`/`now`, `yesterday`, `tomorrow`,
/// `next week`, `in N day(s)`, then `YYYY-MM-DD`, `DD/MM/YYYY`, and a few
/// spelled-out formats. Anything else resolves per `fallback`.
pub fn parse(text: Option<&str>, today: NaiveDate, fallback: DateFallback) -> Option<NaiveDate> {
    let fallback_date = match fallback {
        DateFallback::Today => Some(today),
        DateFallback::Unset => None,
    };

    let raw = match text {
        Some(t) if !t.trim().is_empty() => t.trim().to_lowercase(),
        _ => return fallback_date,
    };

    match raw.as_str() {
        "today" | "now" => return Some(today),
        "yesterday" => return Some(today - Duration::days(1)),
        "tomorrow" => return Some(today + Duration::days(1)),
        "next week" => return Some(today + Duration::days(7)),
        _ => {}
    }

    if raw.contains("day") {
        if let Some(caps) = in_days_pattern().captures(&raw) {
            if let Ok(days) = caps[1].parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y", "%B %d %Y", "%B %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&raw, format) {
            return Some(date);
        }
    }

    fallback_date
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn relative_keywords_use_injected_today() {
        let today = day(2024, 5, 15);
        assert_eq!(parse(Some("Today"), today, DateFallback::Unset), Some(today));
        assert_eq!(parse(Some("now"), today, DateFallback::Unset), Some(today));
        assert_eq!(
            parse(Some("yesterday"), today, DateFallback::Unset),
            Some(day(2024, 5, 14))
        );
        assert_eq!(
            parse(Some("tomorrow"), today, DateFallback::Unset),
            Some(day(2024, 5, 16))
        );
        assert_eq!(
            parse(Some("next week"), today, DateFallback::Unset),
            Some(day(2024, 5, 22))
        );
    }

    #[test]
    fn in_n_days_adds_n_for_any_today() {
        for today in [day(2024, 5, 15), day(2023, 12, 30), day(2024, 2, 27)] {
            assert_eq!(
                parse(Some("in 3 days"), today, DateFallback::Today),
                Some(today + Duration::days(3))
            );
        }
        let today = day(2024, 5, 15);
        assert_eq!(
            parse(Some("in 1 day"), today, DateFallback::Unset),
            Some(day(2024, 5, 16))
        );
    }

    #[test]
    fn explicit_formats_parse_strictly() {
        let today = day(2024, 5, 15);
        assert_eq!(
            parse(Some("2024-06-01"), today, DateFallback::Unset),
            Some(day(2024, 6, 1))
        );
        assert_eq!(
            parse(Some("01/06/2024"), today, DateFallback::Unset),
            Some(day(2024, 6, 1))
        );
        assert_eq!(
            parse(Some("june 1 2024"), today, DateFallback::Unset),
            Some(day(2024, 6, 1))
        );
    }

    #[test]
    fn fallback_policy_decides_failures() {
        let today = day(2024, 5, 15);
        assert_eq!(parse(None, today, DateFallback::Today), Some(today));
        assert_eq!(parse(None, today, DateFallback::Unset), None);
        assert_eq!(parse(Some("  "), today, DateFallback::Today), Some(today));
        assert_eq!(parse(Some("gibberish"), today, DateFallback::Today), Some(today));
        assert_eq!(parse(Some("gibberish"), today, DateFallback::Unset), None);
    }
}
