//! Fuzzy dates - calendar values that keep their precision
//!
//! Authority files routinely state only a year ("1947"), a year range
//! ("1857-1859") or a full date ("1911-01-22"). A `FuzzyDate` keeps the value
//! as stated instead of forcing it onto a specific calendar day, while still
//! exposing the earliest/latest day it may denote for sorting.

use std::fmt;

/// How precisely a fuzzy date is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatePrecision {
    /// Only the year is known
    Year,

    /// Year and month are known
    Month,

    /// The full calendar date is known
    Day,

    /// A span of years
    Range,
}

/// A date value retaining its uncertainty
///
/// # Examples
///
/// ```
/// use lodestar_domain::{DatePrecision, FuzzyDate};
///
/// let date = FuzzyDate::parse("1911-01-22T00:00:00Z").unwrap();
/// assert_eq!(date.as_str(), "1911-01-22");
/// assert_eq!(date.precision(), DatePrecision::Day);
///
/// let year = FuzzyDate::parse("1947").unwrap();
/// assert_eq!(year.precision(), DatePrecision::Year);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuzzyDate {
    text: String,
    precision: DatePrecision,
    earliest: (i32, u8, u8),
    latest: (i32, u8, u8),
}

impl FuzzyDate {
    /// Parse a raw date string
    ///
    /// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, year ranges `YYYY-YYYY`,
    /// `xsd:dateTime` values (the time part is dropped), German `DD.MM.YYYY`
    /// and GND-style `XX.XX.YYYY`. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        let s = s.strip_prefix('+').unwrap_or(s);
        let s = match s.find('T') {
            Some(idx) => &s[..idx],
            None => s,
        };
        if s.is_empty() {
            return None;
        }

        if s.contains('.') {
            return Self::parse_dotted(s);
        }

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let parts: Vec<&str> = body.split('-').collect();

        match parts.as_slice() {
            [year] => Some(Self::year(parse_year(year, negative)?)),
            [year, second] if second.len() >= 3 => {
                let from = parse_year(year, negative)?;
                let to = parse_year(second, false)?;
                Self::range(from, to)
            }
            [year, month] => Self::month(parse_year(year, negative)?, parse_number(month)?),
            [year, month, day] => Self::day(
                parse_year(year, negative)?,
                parse_number(month)?,
                parse_number(day)?,
            ),
            _ => None,
        }
    }

    fn parse_dotted(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [day, month, year] => {
                let year = parse_year(year, false)?;
                match (parse_number(day), parse_number(month)) {
                    (Some(day), Some(month)) => Self::day(year, month, day),
                    (None, Some(month)) if is_unknown(day) => Self::month(year, month),
                    (None, None) if is_unknown(day) && is_unknown(month) => Some(Self::year(year)),
                    _ => None,
                }
            }
            [month, year] => {
                let year = parse_year(year, false)?;
                if is_unknown(month) {
                    return Some(Self::year(year));
                }
                Self::month(year, parse_number(month)?)
            }
            _ => None,
        }
    }

    /// A year-precision date
    pub fn year(year: i32) -> Self {
        Self {
            text: format_year(year),
            precision: DatePrecision::Year,
            earliest: (year, 1, 1),
            latest: (year, 12, 31),
        }
    }

    /// A month-precision date; `None` for an invalid month
    pub fn month(year: i32, month: u8) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self {
            text: format!("{}-{:02}", format_year_padded(year), month),
            precision: DatePrecision::Month,
            earliest: (year, month, 1),
            latest: (year, month, days_in_month(year, month)),
        })
    }

    /// A full calendar date; `None` if the day does not exist
    pub fn day(year: i32, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self {
            text: format!("{}-{:02}-{:02}", format_year_padded(year), month, day),
            precision: DatePrecision::Day,
            earliest: (year, month, day),
            latest: (year, month, day),
        })
    }

    /// A span of years; `None` if `to` precedes `from`
    pub fn range(from: i32, to: i32) -> Option<Self> {
        if to < from {
            return None;
        }
        Some(Self {
            text: format!("{}-{}", format_year(from), format_year(to)),
            precision: DatePrecision::Range,
            earliest: (from, 1, 1),
            latest: (to, 12, 31),
        })
    }

    /// Normalized textual form
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Precision of the value
    pub fn precision(&self) -> DatePrecision {
        self.precision
    }

    /// Earliest day the value may denote, as `(year, month, day)`
    pub fn earliest(&self) -> (i32, u8, u8) {
        self.earliest
    }

    /// Latest day the value may denote, as `(year, month, day)`
    pub fn latest(&self) -> (i32, u8, u8) {
        self.latest
    }
}

impl fmt::Display for FuzzyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for FuzzyDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid fuzzy date: {}", s))
    }
}

fn is_unknown(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|c| c == 'X' || c == 'x')
}

fn parse_number(part: &str) -> Option<u8> {
    if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn parse_year(part: &str, negative: bool) -> Option<i32> {
    if part.is_empty() || part.len() > 4 || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i32 = part.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", -year)
    } else {
        year.to_string()
    }
}

fn format_year_padded(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", -year)
    } else {
        format!("{:04}", year)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_date() {
        let date = FuzzyDate::parse("1990-07-29").unwrap();
        assert_eq!(date.as_str(), "1990-07-29");
        assert_eq!(date.precision(), DatePrecision::Day);
        assert_eq!(date.earliest(), date.latest());
    }

    #[test]
    fn test_xsd_datetime_drops_time() {
        let date = FuzzyDate::parse("+1847-05-14T00:00:00Z").unwrap();
        assert_eq!(date.as_str(), "1847-05-14");
    }

    #[test]
    fn test_year_keeps_precision() {
        let date = FuzzyDate::parse("1873").unwrap();
        assert_eq!(date.as_str(), "1873");
        assert_eq!(date.precision(), DatePrecision::Year);
        assert_eq!(date.earliest(), (1873, 1, 1));
        assert_eq!(date.latest(), (1873, 12, 31));
    }

    #[test]
    fn test_year_range() {
        let date = FuzzyDate::parse("1857-1859").unwrap();
        assert_eq!(date.as_str(), "1857-1859");
        assert_eq!(date.precision(), DatePrecision::Range);
        assert!(FuzzyDate::parse("1859-1857").is_none());
    }

    #[test]
    fn test_year_month() {
        let date = FuzzyDate::parse("1947-05").unwrap();
        assert_eq!(date.precision(), DatePrecision::Month);
        assert_eq!(date.latest(), (1947, 5, 31));
    }

    #[test]
    fn test_german_dotted_forms() {
        assert_eq!(FuzzyDate::parse("22.01.1911").unwrap().as_str(), "1911-01-22");
        assert_eq!(FuzzyDate::parse("XX.XX.1947").unwrap().as_str(), "1947");
        assert_eq!(FuzzyDate::parse("XX.05.1947").unwrap().as_str(), "1947-05");
    }

    #[test]
    fn test_negative_year() {
        let date = FuzzyDate::parse("-44").unwrap();
        assert_eq!(date.as_str(), "-0044");
        assert_eq!(date.earliest().0, -44);
    }

    #[test]
    fn test_invalid_dates() {
        assert!(FuzzyDate::parse("").is_none());
        assert!(FuzzyDate::parse("unknown").is_none());
        assert!(FuzzyDate::parse("1911-13-01").is_none());
        assert!(FuzzyDate::parse("1900-02-29").is_none());
        assert!(FuzzyDate::parse("2000-02-29").is_some());
    }
}
