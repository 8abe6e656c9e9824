use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Shown in place of an undefined ratio.
pub const NO_DATA: &str = "n/d";

/// Format a number pt-BR style with two decimals: 1.234,56
pub fn units(val: f64) -> String {
    let negative = val < 0.0;
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if negative && !is_zero {
        format!("-{grouped},{dec_part}")
    } else {
        format!("{grouped},{dec_part}")
    }
}

/// Ratio as a percentage with a decimal comma: 0.1234 -> 12,34%
pub fn percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.2}%", r * 100.0).replace('.', ","),
        None => NO_DATA.to_string(),
    }
}

/// Short month header: 2024-01-01 -> jan/24
pub fn month_label(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{month}/{:02}", date.year().rem_euclid(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_formatting() {
        assert_eq!(units(1234.56), "1.234,56");
        assert_eq!(units(-500.0), "-500,00");
        assert_eq!(units(0.0), "0,00");
        assert_eq!(units(1000000.99), "1.000.000,99");
        assert_eq!(units(42.1), "42,10");
        assert_eq!(units(-0.001), "0,00");
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(Some(0.1234)), "12,34%");
        assert_eq!(percent(Some(0.1)), "10,00%");
        assert_eq!(percent(Some(1.5)), "150,00%");
        assert_eq!(percent(None), "n/d");
    }

    #[test]
    fn test_month_label() {
        let d = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        assert_eq!(month_label(d(2024, 1)), "jan/24");
        assert_eq!(month_label(d(2023, 12)), "dez/23");
        assert_eq!(month_label(d(2005, 3)), "mar/05");
    }
}
