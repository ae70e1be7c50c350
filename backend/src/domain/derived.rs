//! Derived catalog fields.
//!
//! Age is computed from the roster's date strings at load time; in-park
//! status lives on [`shared::RedPanda::is_in_park`]. Neither is ever stored.

use chrono::{Datelike, Local, NaiveDate};

const DATE_FORMAT: &str = "%Y/%m/%d";

/// Parse a roster date string (`yyyy/mm/dd`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Age label like `7歳`, measured to the death date, or to today while the
/// animal is alive. An unparseable or empty birth date yields an empty
/// label rather than an error.
pub fn age_label(birth_date: &str, death_date: &str) -> String {
    let Some(birth) = parse_date(birth_date) else {
        return String::new();
    };
    let end = if death_date.trim().is_empty() {
        Local::now().date_naive()
    } else {
        match parse_date(death_date) {
            Some(date) => date,
            None => return String::new(),
        }
    };
    format!("{}歳", whole_years_between(birth, end))
}

fn whole_years_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let mut years = end.year() - start.year();
    if (end.month(), end.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_between_fixed_dates() {
        assert_eq!(age_label("2020/01/01", "2022/05/01"), "2歳");
        assert_eq!(age_label("2020/06/01", "2022/05/01"), "1歳");
        // exact anniversary counts the full year
        assert_eq!(age_label("2020/01/01", "2022/01/01"), "2歳");
    }

    #[test]
    fn test_age_is_deterministic_and_idempotent() {
        let first = age_label("2016/06/23", "2023/10/09");
        let second = age_label("2016/06/23", "2023/10/09");
        assert_eq!(first, second);
        assert_eq!(first, "7歳");
    }

    #[test]
    fn test_age_while_alive_uses_today() {
        let label = age_label("2016/06/23", "");
        assert!(label.ends_with('歳'));
        assert!(!label.is_empty());
    }

    #[test]
    fn test_blank_or_malformed_birth_yields_empty() {
        assert_eq!(age_label("", ""), "");
        assert_eq!(age_label("  ", "2022/05/01"), "");
        assert_eq!(age_label("not a date", ""), "");
    }

    #[test]
    fn test_malformed_death_yields_empty() {
        assert_eq!(age_label("2020/01/01", "soon"), "");
    }

    #[test]
    fn test_parse_date_accepts_unpadded_components() {
        assert_eq!(parse_date("2020/1/5"), NaiveDate::from_ymd_opt(2020, 1, 5));
        assert_eq!(parse_date("2020/01/05"), NaiveDate::from_ymd_opt(2020, 1, 5));
        assert_eq!(parse_date(""), None);
    }
}
