//! Statement-level field extractors.
//!
//! Each field has an ordered list of patterns; the first pattern that
//! matches decides the value. Extractors never fail, a miss is `None`.

use chrono::NaiveDate;
use log::trace;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::dates::{parse_amount, parse_full_date};

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("field pattern"))
        .collect()
}

/// Last participating capture group of the first regex in `res` that matches.
fn first_capture<'t>(res: &[Regex], text: &'t str) -> Option<&'t str> {
    res.iter().find_map(|re| {
        let caps = re.captures(text)?;
        (1..caps.len()).rev().find_map(|i| caps.get(i)).map(|m| m.as_str())
    })
}

fn account_number_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        compile_all(&[
            // spaced or dashed digit groups, possibly on the following line;
            // a short trailing group ("2 of 3") is not part of the number
            r"(?i)Account\s+Number:?[ \t]*\r?\n?[ \t]*(\d+(?:[ \t-]\d{3,})*)",
            r"(?i)(?:VIP|Interest|Checking|Savings)\s+(?:Interest\s+)?(?:Checking|Savings)?\s+(\d{10,})",
            r"(?i)Primary\s+Account\s+Number:\s*(\d{6,})",
            r"(?i)Account\s*#\s*(\d{6,})",
            r"(?i)\bAcct\s*#?\s*(\d{6,})",
            r"(?i)Account:\s*(\d{6,})",
        ])
    })
}

/// Account number with whitespace and dashes removed.
pub fn extract_account_number(text: &str) -> Option<String> {
    let raw = first_capture(account_number_res(), text)?;
    let digits: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    trace!("account number {raw:?} -> {digits}");
    Some(digits)
}

fn holder_name_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        compile_all(&[
            // mailing block under a barcode line: "0001234 1 AB 0.123 1 2\nJAMES C MORRISON\n123 ..."
            r"(?m)\d{6,}[ \t]+\d+[ \t]+\w+[ \t]+[\d.]+[ \t]+\w+[ \t]+\w+[ \t]*\r?\n[ \t]*([A-Z][A-Z &'.]+?)[ \t]*\r?\n[ \t]*\d+[ \t]+",
            // ALL CAPS name directly above a street address
            r"(?m)^[ \t]*([A-Z]+(?:[ \t]+[A-Z]\.?)?[ \t]+[A-Z]+)[ \t]*\r?\n[ \t]*\d+[ \t]+[A-Z]",
            // name block after a ZIP+4 line
            r"\d{5}-\d{4}[ \t]*\r?\n[ \t]*([A-Z][a-z]+[ \t]+[A-Z][a-z]+)[ \t]*\r?\n[ \t]*\d+",
            // "Bonita M Browy"
            r"(?m)^[ \t]*([A-Z][a-z]+[ \t]+[A-Z]\.?[ \t]+[A-Z][a-z]+)[ \t]*$",
            // joint holders over two lines followed by an address
            r"(?m)^[ \t]*([A-Z][a-z]+[^\n]*?[A-Z][a-z]+)[ \t]*\r?\n[ \t]*[A-Z][a-z]+[^\n]*?[A-Z][a-z]+[ \t]*\r?\n[ \t]*\d+[ \t]+[A-Z]",
        ])
    })
}

const NOT_A_NAME: &[&str] = &[
    "bank",
    "statement",
    "primary",
    "account",
    "summary",
    "commerce",
    "sample",
    "deposit",
    "deposits",
    "credit",
    "credits",
    "withdrawal",
    "withdrawals",
    "balance",
    "page",
    "date",
    "total",
    "checking",
    "savings",
    "transaction",
    "transactions",
    "description",
    "check",
    "checks",
    "paid",
    "debits",
    "fees",
    "interest",
    "activity",
    "detail",
    "period",
];

fn plausible_name(candidate: &str) -> bool {
    let candidate = candidate.trim();
    candidate.chars().count() >= 6
        && !candidate
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| NOT_A_NAME.contains(&word.to_lowercase().as_str()))
}

/// Account holder name, skipping candidates that are statement vocabulary
/// or shorter than six characters.
pub fn extract_account_holder_name(text: &str) -> Option<String> {
    holder_name_res().iter().find_map(|re| {
        re.captures_iter(text).find_map(|caps| {
            let name = caps.get(1)?.as_str().trim();
            if plausible_name(name) {
                Some(name.to_string())
            } else {
                trace!("rejected holder name candidate {name:?}");
                None
            }
        })
    })
}

fn statement_date_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        compile_all(&[
            r"(?i)Ending\s+Balance\s+(\d{1,2}/\d{1,2}/\d{2,4})",
            r"(?i)Statement\s+Date:?\s*([A-Za-z]+\.?\s+\d{1,2},?\s*\d{4})",
            r"(?i)Statement\s+Date:?\s*(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})",
            r"(?i)\bDate:\s*([A-Za-z]+\s+\d{1,2},\s*\d{4})",
            r"(?i)\bAs\s+of\s+([A-Za-z]+\s+\d{1,2},\s*\d{4})",
        ])
    })
}

fn period_start_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        compile_all(&[
            r"(?i)Beginning\s+Balance\s+on\s+([A-Za-z]+\s+\d{1,2},\s*\d{4})",
            r"(?i)Beginning\s+Balance[^\n]*?(\d{1,2}[-/]\d{1,2}[-/]\d{4})",
            r"(?i)\bFrom\s+([A-Za-z]+\s+\d{1,2},\s*\d{4})",
            r"(?i)Period:?\s*([A-Za-z]+\s+\d{1,2},\s*\d{4})\s*(?:-|to|through)",
            r"(?i)Period:?\s*(\d{1,2}/\d{1,2}/\d{2,4})\s*(?:-|to|through)",
        ])
    })
}

fn period_end_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        compile_all(&[
            r"(?i)Ending\s+Balance\s+on\s+([A-Za-z]+\s+\d{1,2},\s*\d{4})",
            r"(?i)Ending\s+Balance[^\n]*?(\d{1,2}[-/]\d{1,2}[-/]\d{4})",
            r"(?i)\bThrough\s+([A-Za-z]+\s+\d{1,2},\s*\d{4})",
            r"(?i)Period:?\s*[A-Za-z]+\s+\d{1,2},\s*\d{4}\s*(?:-|to|through)\s*([A-Za-z]+\s+\d{1,2},\s*\d{4})",
            r"(?i)Period:?\s*\d{1,2}/\d{1,2}/\d{2,4}\s*(?:-|to|through)\s*(\d{1,2}/\d{1,2}/\d{2,4})",
        ])
    })
}

/// Strictly the first matching pattern decides, even if its date is invalid.
fn first_date(res: &[Regex], text: &str) -> Option<NaiveDate> {
    parse_full_date(first_capture(res, text)?)
}

pub fn extract_statement_date(text: &str) -> Option<NaiveDate> {
    first_date(statement_date_res(), text)
}

pub fn extract_period_start(text: &str) -> Option<NaiveDate> {
    first_date(period_start_res(), text)
}

pub fn extract_period_end(text: &str) -> Option<NaiveDate> {
    first_date(period_end_res(), text)
}

/// Balance following `keyword` (`"Beginning"`, `"Ending"`), allowing words
/// such as a date between the keyword and the amount.
pub fn extract_balance(text: &str, keyword: &str) -> Option<Decimal> {
    first_capture(&balance_res(keyword), text).map(parse_amount)
}

/// Compiled once per keyword.
fn balance_res(keyword: &str) -> Arc<Vec<Regex>> {
    static CACHE: OnceLock<Mutex<HashMap<String, Arc<Vec<Regex>>>>> = OnceLock::new();
    let mut cache = CACHE
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(keyword.to_string())
        .or_insert_with(|| {
            let kw = regex::escape(keyword);
            let patterns = [
                format!(r"(?i)\b{kw}\s+Balance[^\n]*?\$\s*(\d[\d,]*\.\d{{2}})"),
                format!(r"(?i)\b{kw}\s+Balance[^\n]*?(\d[\d,]*\.\d{{2}})"),
                format!(r"(?i)\b{kw}[^\n]*?Balance[^\n]*?\$\s*(\d[\d,]*\.\d{{2}})"),
                format!(r"(?i)\b{kw}[^\n]*?\$\s*(\d[\d,]*\.\d{{2}})"),
            ];
            let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
            Arc::new(compile_all(&patterns))
        })
        .clone()
}

/// Which summary total to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTotal {
    Deposits,
    Withdrawals,
    AtmWithdrawals,
    Checks,
    Fees,
}

const TAIL: &str = r"[^\n]*?[+-]?[ \t]*\$?[ \t]*(\d[\d,]*\.\d{2})";

fn summary_res(total: SummaryTotal) -> &'static [Regex] {
    static DEPOSITS: OnceLock<Vec<Regex>> = OnceLock::new();
    static WITHDRAWALS: OnceLock<Vec<Regex>> = OnceLock::new();
    static ATM: OnceLock<Vec<Regex>> = OnceLock::new();
    static CHECKS: OnceLock<Vec<Regex>> = OnceLock::new();
    static FEES: OnceLock<Vec<Regex>> = OnceLock::new();

    let (cell, heads): (&OnceLock<Vec<Regex>>, &[&str]) = match total {
        SummaryTotal::Deposits => (
            &DEPOSITS,
            &[
                r"(?im)^[ \t]*(?:Total[ \t]+)?Deposits?[ \t]*(?:&|and|8|I)[ \t]*(?:Other[ \t]+)?Credits\b",
                r"(?im)^[ \t]*(?:Total[ \t]+)?Deposits\b",
                r"(?im)^[ \t]*(?:Total[ \t]+)?Credits\b",
            ],
        ),
        SummaryTotal::Withdrawals => (
            &WITHDRAWALS,
            &[
                r"(?im)^[ \t]*(?:Total[ \t]+)?(?:Other[ \t]+)?Withdrawals?[ \t]*(?:&|and|8)[ \t]*(?:Other[ \t]+)?Debits\b",
                r"(?im)^[ \t]*(?:Total[ \t]+)?(?:Other[ \t]+)?Withdrawals\b",
                r"(?im)^[ \t]*(?:Total[ \t]+)?Debits\b",
            ],
        ),
        SummaryTotal::AtmWithdrawals => (
            &ATM,
            &[
                r"(?im)^[ \t]*(?:Total[ \t]+)?ATM[ \t]+Withdrawals\b",
                r"(?im)^[ \t]*(?:Total[ \t]+)?ATM\b",
            ],
        ),
        SummaryTotal::Checks => (
            &CHECKS,
            &[
                r"(?im)^[ \t]*(?:Total[ \t]+)?Checks[ \t]+Paid\b",
                r"(?im)^[ \t]*(?:Total[ \t]+)?Checks\b",
            ],
        ),
        SummaryTotal::Fees => (
            &FEES,
            &[
                r"(?im)^[ \t]*(?:Total[ \t]+)?(?:Monthly[ \t]+)?(?:Service[ \t]+)?Fees\b",
                r"(?im)^[ \t]*(?:Total[ \t]+)?Service[ \t]+Charges?\b",
            ],
        ),
    };

    cell.get_or_init(|| {
        heads
            .iter()
            .map(|head| Regex::new(&format!("{head}{TAIL}")).expect("summary pattern"))
            .collect()
    })
}

/// Summary total from the account summary block; absent means zero.
pub fn extract_summary_total(text: &str, total: SummaryTotal) -> Decimal {
    first_capture(summary_res(total), text)
        .map(parse_amount)
        .unwrap_or(Decimal::ZERO)
}

fn known_bank_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)\b(U\.?\s?S\.?\s+Bank|Capital\s+One|JPMorgan\s+Chase|Chase|Wells\s+Fargo|",
            r"Bank\s+of\s+America|Citibank|PNC\s+Bank|TD\s+Bank|Commerce\s+Bank)\b"
        ))
        .expect("known bank regex")
    })
}

fn generic_bank_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*((?:[A-Z][A-Za-z&.]+[ \t]+)+Bank)\b").expect("generic bank regex")
    })
}

/// Issuing bank: a known name anywhere, else a `<Capitalized words> Bank` line.
pub fn extract_bank_name(text: &str) -> Option<String> {
    if let Some(m) = known_bank_re().find(text) {
        return Some(m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));
    }
    generic_bank_re()
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .find(|name| {
            !name
                .split_whitespace()
                .any(|w| matches!(w.to_lowercase().as_str(), "statement" | "account" | "your"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SUMMARY: &str = "\
Commerce Bank
Primary Account Number: 123456789
JAMES C MORRISON
1234 MAIN ST
Beginning Balance on May 3, 2003 $7,126.11
Deposits & Other Credits +3,615.08
ATM Withdrawals & Debits -0.00
Total Checks Paid $305.00
Ending Balance on June 2, 2003 $10,436.19
";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_account_number_primary() {
        assert_eq!(extract_account_number(SUMMARY).as_deref(), Some("123456789"));
    }

    #[test]
    fn test_account_number_strips_spaces_and_dashes() {
        let text = "Account Number: 1 047 9846-7080\nStatement Period";
        assert_eq!(extract_account_number(text).as_deref(), Some("104798467080"));
    }

    #[test]
    fn test_account_number_on_next_line() {
        let text = "Account Number:\n  6 5750 1234\nPage 1";
        assert_eq!(extract_account_number(text).as_deref(), Some("657501234"));
    }

    #[test]
    fn test_account_number_stops_before_page_counter() {
        let text = "Account Number: 123456789 2 of 3\n";
        assert_eq!(extract_account_number(text).as_deref(), Some("123456789"));
    }

    #[test]
    fn test_account_number_missing() {
        assert_eq!(extract_account_number("no numbers here"), None);
    }

    #[test]
    fn test_holder_name_all_caps_above_address() {
        assert_eq!(extract_account_holder_name(SUMMARY).as_deref(), Some("JAMES C MORRISON"));
    }

    #[test]
    fn test_holder_name_rejects_vocabulary() {
        let text = "BANK STATEMENT\n100 Main St\n";
        assert_eq!(extract_account_holder_name(text), None);
    }

    #[test]
    fn test_holder_name_skips_section_heading() {
        let text = "CHECKS PAID\n1001 CHECK\nJAMES C MORRISON\n1234 MAIN ST\n";
        assert_eq!(extract_account_holder_name(text).as_deref(), Some("JAMES C MORRISON"));
    }

    #[test]
    fn test_holder_name_middle_initial() {
        let text = "Statement\nBonita M Browy\n42 Elm Road\n";
        assert_eq!(extract_account_holder_name(text).as_deref(), Some("Bonita M Browy"));
    }

    #[test]
    fn test_dates_from_balance_lines() {
        assert_eq!(extract_period_start(SUMMARY), Some(d(2003, 5, 3)));
        assert_eq!(extract_period_end(SUMMARY), Some(d(2003, 6, 2)));
        assert_eq!(extract_statement_date(SUMMARY), None);
    }

    #[test]
    fn test_statement_date_forms() {
        assert_eq!(
            extract_statement_date("Statement Date: March 31, 2024"),
            Some(d(2024, 3, 31))
        );
        assert_eq!(extract_statement_date("Statement Date 03/31/24"), Some(d(2024, 3, 31)));
        assert_eq!(extract_statement_date("As of July 1, 2016"), Some(d(2016, 7, 1)));
    }

    #[test]
    fn test_period_range() {
        let text = "Statement Period: 04/01/2024 to 04/30/2024";
        assert_eq!(extract_period_start(text), Some(d(2024, 4, 1)));
        assert_eq!(extract_period_end(text), Some(d(2024, 4, 30)));
    }

    #[test]
    fn test_balances_across_intervening_words() {
        assert_eq!(extract_balance(SUMMARY, "Beginning"), Some(dec!(7126.11)));
        assert_eq!(extract_balance(SUMMARY, "Ending"), Some(dec!(10436.19)));
        assert_eq!(extract_balance("Ending Balance 125.50", "Ending"), Some(dec!(125.50)));
        assert_eq!(extract_balance("nothing", "Ending"), None);
    }

    #[test]
    fn test_summary_totals() {
        assert_eq!(extract_summary_total(SUMMARY, SummaryTotal::Deposits), dec!(3615.08));
        assert_eq!(extract_summary_total(SUMMARY, SummaryTotal::Checks), dec!(305.00));
        assert_eq!(extract_summary_total(SUMMARY, SummaryTotal::AtmWithdrawals), Decimal::ZERO);
        assert_eq!(extract_summary_total(SUMMARY, SummaryTotal::Fees), Decimal::ZERO);
    }

    #[test]
    fn test_atm_line_is_not_a_withdrawals_total() {
        let text = "ATM Withdrawals $60.00\nOther Withdrawals $25.10\n";
        assert_eq!(extract_summary_total(text, SummaryTotal::AtmWithdrawals), dec!(60.00));
        assert_eq!(extract_summary_total(text, SummaryTotal::Withdrawals), dec!(25.10));
    }

    #[test]
    fn test_atm_debits_line_is_not_a_withdrawals_total() {
        let text = "Withdrawals & Debits -10.00\nATM Withdrawals & Debits -30.00\n";
        assert_eq!(extract_summary_total(text, SummaryTotal::Withdrawals), dec!(10.00));
        assert_eq!(extract_summary_total(text, SummaryTotal::AtmWithdrawals), dec!(30.00));

        let atm_only = "ATM Withdrawals & Debits -30.00\n";
        assert_eq!(extract_summary_total(atm_only, SummaryTotal::Withdrawals), Decimal::ZERO);
    }

    #[test]
    fn test_fees_only_from_summary_lines() {
        let prose = "Avoid monthly fees by keeping $1,500.00 on deposit\n";
        assert_eq!(extract_summary_total(prose, SummaryTotal::Fees), Decimal::ZERO);
        assert_eq!(
            extract_summary_total("Service Fees $12.00\n", SummaryTotal::Fees),
            dec!(12.00)
        );
        assert_eq!(
            extract_summary_total("  Total Service Charges 4.50\n", SummaryTotal::Fees),
            dec!(4.50)
        );
    }

    #[test]
    fn test_balance_keyword_cache_is_per_keyword() {
        let text = "Beginning Balance $1.00\nEnding Balance $2.00\n";
        assert_eq!(extract_balance(text, "Ending"), Some(dec!(2.00)));
        assert_eq!(extract_balance(text, "Beginning"), Some(dec!(1.00)));
        assert_eq!(extract_balance(text, "Ending"), Some(dec!(2.00)));
    }

    #[test]
    fn test_bank_name() {
        assert_eq!(extract_bank_name(SUMMARY).as_deref(), Some("Commerce Bank"));
        assert_eq!(
            extract_bank_name("Member FDIC\nSmall Town Bank\n").as_deref(),
            Some("Small Town Bank")
        );
        assert_eq!(extract_bank_name("capital one, N.A.").as_deref(), Some("capital one"));
        assert_eq!(extract_bank_name("plain text"), None);
    }
}
