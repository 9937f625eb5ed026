//! Date and amount token parsing shared by every extractor.
//!
//! Statement rows usually print dates without a year (`05-15`, `Jul 20`,
//! `1 February`); the caller supplies the year inferred for the statement.

use chrono::NaiveDate;
use log::trace;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month number for a full or abbreviated (3+ letters) English month name.
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().trim_end_matches('.').to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(lower.as_str()))
        .map(|i| i as u32 + 1)
}

fn numeric_short_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})$").expect("numeric short date regex"))
}

fn day_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,9})\.?$").expect("day month regex"))
}

fn month_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]{3,9})\.?\s+(\d{1,2})$").expect("month day regex"))
}

fn numeric_full_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{4}|\d{2})$").expect("numeric full date regex")
    })
}

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("iso date regex"))
}

fn month_day_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})$").expect("month day year regex")
    })
}

fn day_month_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})$").expect("day month year regex")
    })
}

fn num(s: &str) -> Option<u32> {
    s.parse().ok()
}

/// Two-digit years pivot at 70, like `%y`.
fn expand_year(s: &str) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    Some(match s.len() {
        2 if y < 70 => 2000 + y,
        2 => 1900 + y,
        _ => y,
    })
}

/// Parse a date that carries its own year.
pub fn parse_full_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();

    if let Some(c) = numeric_full_re().captures(s) {
        return NaiveDate::from_ymd_opt(expand_year(&c[3])?, num(&c[1])?, num(&c[2])?);
    }
    if let Some(c) = iso_re().captures(s) {
        return NaiveDate::from_ymd_opt(expand_year(&c[1])?, num(&c[2])?, num(&c[3])?);
    }
    if let Some(c) = month_day_year_re().captures(s) {
        return NaiveDate::from_ymd_opt(expand_year(&c[3])?, month_from_name(&c[1])?, num(&c[2])?);
    }
    if let Some(c) = day_month_year_re().captures(s) {
        return NaiveDate::from_ymd_opt(expand_year(&c[3])?, month_from_name(&c[2])?, num(&c[1])?);
    }
    None
}

/// Parse a statement date token.
///
/// Year-less forms (`MM-DD`, `M/DD`, `DD Month`, `Month DD`) take `year`;
/// forms with their own year keep it. Impossible dates yield `None`.
pub fn parse_date(text: &str, year: i32) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(c) = numeric_short_re().captures(s) {
        return NaiveDate::from_ymd_opt(year, num(&c[1])?, num(&c[2])?);
    }
    if let Some(c) = day_month_re().captures(s) {
        return NaiveDate::from_ymd_opt(year, month_from_name(&c[2])?, num(&c[1])?);
    }
    if let Some(c) = month_day_re().captures(s) {
        return NaiveDate::from_ymd_opt(year, month_from_name(&c[1])?, num(&c[2])?);
    }
    parse_full_date(s)
}

/// Parse a printed amount into a non-negative magnitude.
///
/// Currency symbols, thousands separators, spaces, sign characters and
/// accounting parentheses are dropped; `.26` reads as `0.26`. Anything
/// unparseable is zero. Direction is never taken from the sign.
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '+' | '(' | ')') && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.trim_matches('-');
    let cleaned = if cleaned.starts_with('.') {
        format!("0{cleaned}")
    } else {
        cleaned.to_string()
    };

    match Decimal::from_str(&cleaned) {
        Ok(value) => value.abs(),
        Err(_) => {
            trace!("unparseable amount {text:?}");
            Decimal::ZERO
        }
    }
}

/// A printed money amount: `$1,234.56`, `-15.00`, `550.90-`, `.26`.
///
/// Group 1 is the amount itself; the leading group only anchors the token
/// so adjacent amounts separated by one space are all found.
pub fn amount_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[\s(])([-+]?\$?\s?(?:\d{1,3}(?:,\d{3})+|\d+)?\.\d{2}\b-?)")
            .expect("amount token regex")
    })
}

const MONTH_NAME: &str = concat!(
    r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?",
    r"|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?"
);

/// Any date token `parse_date` understands, anywhere in a line.
pub fn date_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)\b(?:\d{{4}}-\d{{1,2}}-\d{{1,2}}|\d{{1,2}}[-/]\d{{1,2}}(?:[-/](?:\d{{4}}|\d{{2}}))?|(?:{m})\.?\s+\d{{1,2}}(?:,?\s+\d{{4}})?|\d{{1,2}}\s+(?:{m})\.?(?:,?\s+\d{{4}})?)\b",
            m = MONTH_NAME
        );
        Regex::new(&pattern).expect("date token regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_short_numeric_forms() {
        assert_eq!(parse_date("05-15", 2003), Some(d(2003, 5, 15)));
        assert_eq!(parse_date("5-15", 2003), Some(d(2003, 5, 15)));
        assert_eq!(parse_date("5/15", 2003), Some(d(2003, 5, 15)));
        assert_eq!(parse_date("10/03", 2024), Some(d(2024, 10, 3)));
    }

    #[test]
    fn test_month_name_forms() {
        assert_eq!(parse_date("1 February", 2024), Some(d(2024, 2, 1)));
        assert_eq!(parse_date("Jul 20", 2024), Some(d(2024, 7, 20)));
        assert_eq!(parse_date("Sept. 3", 2024), Some(d(2024, 9, 3)));
    }

    #[test]
    fn test_full_forms_keep_their_year() {
        assert_eq!(parse_date("05/15/2003", 1999), Some(d(2003, 5, 15)));
        assert_eq!(parse_date("03/14/16", 1999), Some(d(2016, 3, 14)));
        assert_eq!(parse_date("May 3, 2003", 1999), Some(d(2003, 5, 3)));
        assert_eq!(parse_date("2016-04-29", 1999), Some(d(2016, 4, 29)));
        assert_eq!(parse_date("4 March 2019", 1999), Some(d(2019, 3, 4)));
    }

    #[test]
    fn test_impossible_dates_are_none() {
        assert_eq!(parse_date("02-30", 2003), None);
        assert_eq!(parse_date("13/01", 2003), None);
        assert_eq!(parse_date("Foo 12", 2003), None);
        assert_eq!(parse_date("", 2003), None);
        assert_eq!(parse_full_date("05-15"), None);
    }

    #[test]
    fn test_month_from_name() {
        assert_eq!(month_from_name("May"), Some(5));
        assert_eq!(month_from_name("sept"), Some(9));
        assert_eq!(month_from_name("DECEMBER"), Some(12));
        assert_eq!(month_from_name("ma"), None);
        assert_eq!(month_from_name("Total"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$3,615.08"), dec!(3615.08));
        assert_eq!(parse_amount("-15.00"), dec!(15.00));
        assert_eq!(parse_amount("550.90-"), dec!(550.90));
        assert_eq!(parse_amount("- $14.05"), dec!(14.05));
        assert_eq!(parse_amount(".26"), dec!(0.26));
        assert_eq!(parse_amount("(45.00)"), dec!(45.00));
        assert_eq!(parse_amount("n/a"), Decimal::ZERO);
    }

    #[test]
    fn test_amount_tokens_adjacent() {
        let found: Vec<&str> = amount_token_re()
            .captures_iter("10/02 POS PURCHASE 4.23 65.73")
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(found, vec!["4.23", "65.73"]);
    }

    #[test]
    fn test_amount_token_ignores_longer_decimals() {
        assert!(amount_token_re().captures("rate 1.2345").is_none());
    }

    #[test]
    fn test_date_token_finds_month_names() {
        let m = date_token_re().find("Posted Jul 20 at store").unwrap();
        assert_eq!(m.as_str(), "Jul 20");
        let m = date_token_re().find("on 05/15/2003 paid").unwrap();
        assert_eq!(m.as_str(), "05/15/2003");
    }
}
