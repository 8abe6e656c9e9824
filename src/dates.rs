use std::sync::OnceLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::models::Cell;
use crate::normalize::normalize;

const SERIAL_MIN: u64 = 10_000;
const SERIAL_MAX: u64 = 80_000;

// Text dates outside this window are rejected, matching the range a nanosecond
// timestamp can hold.
const MIN_TEXT_YEAR: i32 = 1678;
const MAX_TEXT_YEAR: i32 = 2261;

const MONTH_NAMES: [(&str, u32); 24] = [
    ("janeiro", 1),
    ("january", 1),
    ("fevereiro", 2),
    ("february", 2),
    ("marco", 3),
    ("march", 3),
    ("abril", 4),
    ("april", 4),
    ("maio", 5),
    ("may", 5),
    ("junho", 6),
    ("june", 6),
    ("julho", 7),
    ("july", 7),
    ("agosto", 8),
    ("august", 8),
    ("setembro", 9),
    ("september", 9),
    ("outubro", 10),
    ("october", 10),
    ("novembro", 11),
    ("november", 11),
    ("dezembro", 12),
    ("december", 12),
];

struct Shapes {
    day_month_year: Regex,
    month_year: Regex,
    word_year: Regex,
    iso: Regex,
}

fn shapes() -> &'static Shapes {
    static SHAPES: OnceLock<Shapes> = OnceLock::new();
    SHAPES.get_or_init(|| Shapes {
        day_month_year: Regex::new(r"^([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{2,4})$")
            .expect("valid date pattern"),
        month_year: Regex::new(r"^([0-9]{1,2})[/-]([0-9]{2,4})$").expect("valid date pattern"),
        word_year: Regex::new(r"^([A-Za-zÀ-ÿ]{3,})[/-]([0-9]{2,4})$")
            .expect("valid date pattern"),
        iso: Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid date pattern"),
    })
}

/// Resolve a header or cell value to the calendar date it denotes, if any.
pub fn classify(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(n) => {
            if *n >= SERIAL_MIN as f64 && *n <= SERIAL_MAX as f64 {
                serial_to_date(*n)
            } else {
                None
            }
        }
        Cell::Text(s) => classify_str(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

pub fn classify_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        let n: u64 = s.parse().ok()?;
        return if (SERIAL_MIN..=SERIAL_MAX).contains(&n) {
            serial_to_date(n as f64)
        } else {
            None
        };
    }
    if s.chars().any(char::is_whitespace) {
        return None;
    }
    readings(s)
        .into_iter()
        .filter(|(y, _, _)| (MIN_TEXT_YEAR..=MAX_TEXT_YEAR).contains(y))
        .find_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
}

/// Spreadsheet serial (days since 1899-12-30, fraction ignored) to a date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.trunc();
    if !days.is_finite() {
        return None;
    }
    if days >= 0.0 {
        base.checked_add_days(Days::new(days as u64))
    } else {
        base.checked_sub_days(Days::new(days.abs() as u64))
    }
}

/// Candidate (year, month, day) readings of a date-shaped string, preferred first.
/// Strings that match no shape yield nothing.
fn readings(s: &str) -> Vec<(i32, u32, u32)> {
    let shapes = shapes();
    if let Some(c) = shapes.day_month_year.captures(s) {
        let (Some(a), Some(b), Some(y)) = (number(&c[1]), number(&c[2]), year(&c[3])) else {
            return Vec::new();
        };
        // day-first, then month-first
        return vec![(y, b, a), (y, a, b)];
    }
    if let Some(c) = shapes.month_year.captures(s) {
        let (Some(m), Some(y)) = (number(&c[1]), year(&c[2])) else {
            return Vec::new();
        };
        return vec![(y, m, 1)];
    }
    if let Some(c) = shapes.word_year.captures(s) {
        let (Some(m), Some(y)) = (month_from_word(&c[1]), year(&c[2])) else {
            return Vec::new();
        };
        return vec![(y, m, 1)];
    }
    if let Some(c) = shapes.iso.captures(s) {
        let (Some(y), Some(a), Some(b)) = (number(&c[1]), number(&c[2]), number(&c[3])) else {
            return Vec::new();
        };
        return vec![(y as i32, a, b), (y as i32, b, a)];
    }
    Vec::new()
}

fn number(s: &str) -> Option<u32> {
    s.parse().ok()
}

/// Two-digit years pivot at 69: 00-68 are 20xx, 69-99 are 19xx.
///
/// The pivot is fixed, unlike a window sliding with the current year, so `jan/70`
/// is always 1970 and a sheet classifies the same way every year it is read.
fn year(s: &str) -> Option<i32> {
    let n: i32 = s.parse().ok()?;
    if s.len() == 2 {
        Some(if n <= 68 { 2000 + n } else { 1900 + n })
    } else {
        Some(n)
    }
}

/// Portuguese or English month name, or any prefix of at least three letters.
fn month_from_word(word: &str) -> Option<u32> {
    let w = normalize(word);
    if w.chars().count() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .find(|(name, _)| name.starts_with(&w))
        .map(|(_, m)| *m)
}
