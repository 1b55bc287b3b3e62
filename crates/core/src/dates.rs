//! Rewrites date-like substrings in user input to ISO `YYYY-MM-DD`

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").expect("date pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    MonthFirst,
    DayFirst,
}

/// One accepted input layout, e.g. `m/d/yy`
#[derive(Debug, Clone, Copy)]
struct DateFormat {
    order: FieldOrder,
    separator: char,
    year_digits: usize,
}

/// Tried in order; the first layout that yields a real calendar date wins.
const DATE_FORMATS: [DateFormat; 6] = [
    DateFormat { order: FieldOrder::MonthFirst, separator: '/', year_digits: 2 },
    DateFormat { order: FieldOrder::MonthFirst, separator: '/', year_digits: 4 },
    DateFormat { order: FieldOrder::DayFirst, separator: '/', year_digits: 2 },
    DateFormat { order: FieldOrder::DayFirst, separator: '/', year_digits: 4 },
    DateFormat { order: FieldOrder::MonthFirst, separator: '-', year_digits: 4 },
    DateFormat { order: FieldOrder::MonthFirst, separator: '-', year_digits: 2 },
];

impl DateFormat {
    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let mut parts = raw.split(self.separator);
        let (first, second, year) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let first = short_field(first)?;
        let second = short_field(second)?;
        let (month, day) = match self.order {
            FieldOrder::MonthFirst => (first, second),
            FieldOrder::DayFirst => (second, first),
        };

        if year.len() != self.year_digits || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut year: i32 = year.parse().ok()?;
        if self.year_digits == 2 {
            // Same pivot as strptime's %y: 69-99 is the 1900s, 00-68 the 2000s
            year += if year >= 69 { 1900 } else { 2000 };
        } else if year == 0 {
            // Four-digit year zero does not exist
            return None;
        } else if year < 100 {
            year += 2000;
        }

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Parse a one- or two-digit month/day field
fn short_field(raw: &str) -> Option<u32> {
    if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parse a single date-like string with the first format that accepts it
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|format| format.parse(raw))
}

/// Replace every recognizable date in `text` with its ISO form.
///
/// Matches that no format accepts are left as they are.
pub fn normalize_dates(text: &str) -> String {
    DATE_PATTERN
        .replace_all(text, |caps: &Captures| match parse_date(&caps[0]) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
