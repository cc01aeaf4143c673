//! Display formatting for phones and dates (pt-BR conventions).

use chrono::NaiveDate;

use crate::domain::types::strip_non_digits;

/// Formats a stored phone: `(XX) X XXXX-XXXX` for 11 digits, `(XX) XXXX-XXXX`
/// for 10 digits. Anything else is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits = strip_non_digits(phone);
    match digits.len() {
        11 => format!(
            "({}) {} {}-{}",
            &digits[..2],
            &digits[2..3],
            &digits[3..7],
            &digits[7..]
        ),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}

/// Progressive mask applied while a phone is being typed. Input beyond eleven
/// digits is dropped.
pub fn format_phone_input(value: &str) -> String {
    let mut digits = strip_non_digits(value);
    digits.truncate(11);

    match digits.len() {
        0..=2 => digits,
        3 => format!("({}) {}", &digits[..2], &digits[2..]),
        4..=7 => format!("({}) {} {}", &digits[..2], &digits[2..3], &digits[3..]),
        _ => format!(
            "({}) {} {}-{}",
            &digits[..2],
            &digits[2..3],
            &digits[3..7],
            &digits[7..]
        ),
    }
}

/// Formats a date as `dd/mm/aaaa`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parses the date-only portion of an ISO date or date-time string.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_mobile_and_landline_numbers() {
        assert_eq!(format_phone("11987654321"), "(11) 9 8765-4321");
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
        assert_eq!(format_phone("12345"), "12345");
    }

    #[test]
    fn input_mask_grows_with_digits() {
        assert_eq!(format_phone_input("1"), "1");
        assert_eq!(format_phone_input("119"), "(11) 9");
        assert_eq!(format_phone_input("1198765"), "(11) 9 8765");
        assert_eq!(format_phone_input("11987654321"), "(11) 9 8765-4321");
        assert_eq!(format_phone_input("119876543219999"), "(11) 9 8765-4321");
    }

    #[test]
    fn dates_use_brazilian_order() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 1).expect("valid date");
        assert_eq!(format_date(date), "01/05/1990");
    }

    #[test]
    fn iso_parsing_ignores_time_of_day() {
        let expected = NaiveDate::from_ymd_opt(1985, 12, 31);
        assert_eq!(parse_iso_date("1985-12-31"), expected);
        assert_eq!(parse_iso_date("1985-12-31T23:59:00"), expected);
        assert_eq!(parse_iso_date("31/12/1985"), None);
        assert_eq!(parse_iso_date(""), None);
    }
}
