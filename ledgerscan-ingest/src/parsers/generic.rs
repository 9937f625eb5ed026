//! Last-resort line scanner for layouts no specific extractor recognizes.
//!
//! Any line holding both a date token and an amount token is a candidate,
//! unless it looks like page furniture or a balance/summary line.

use ledgerscan_core::{Direction, Transaction, TransactionKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::dates::{amount_token_re, date_token_re, parse_amount, parse_date};
use crate::parsers::{mentions, mentions_word, squash};

fn noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^\s*(?:-+\s*)?page\s+\d+|",
            r"\b(?:beginning|ending|opening|closing|previous|new)\s+balance\b|",
            r"\bbalance\s+(?:forward|brought|carried)\b|",
            r"\bstatement\s+(?:period|date)\b|",
            r"\b(?:sub)?total\b|",
            r"\baccount\s+(?:number|summary)\b|",
            r"\bpayment\s+due\b|\bminimum\s+payment\b|\bcredit\s+limit\b"
        ))
        .expect("generic noise regex")
    })
}

const IN_PHRASES: &[&str] = &["transfer from", "transfer in", "direct deposit"];
const OUT_PHRASES: &[&str] = &["transfer to", "transfer out", "service charge"];

const OUT_WORDS: &[&str] = &[
    "withdrawal",
    "withdrawals",
    "payment",
    "payments",
    "debit",
    "purchase",
    "fee",
    "fees",
    "check",
    "checks",
    "atm",
    "pos",
];
const IN_WORDS: &[&str] = &[
    "deposit",
    "deposits",
    "credit",
    "refund",
    "interest",
    "salary",
    "payroll",
    "paycheck",
];

/// Phrases first, then whole-word keywords with outgoing beating incoming;
/// no keyword means out.
fn infer_direction(desc: &str) -> Direction {
    if mentions(desc, IN_PHRASES) {
        Direction::In
    } else if mentions(desc, OUT_PHRASES) || mentions_word(desc, OUT_WORDS) {
        Direction::Out
    } else if mentions_word(desc, IN_WORDS) {
        Direction::In
    } else {
        Direction::Out
    }
}

fn infer_kind(desc: &str, direction: Direction) -> TransactionKind {
    match direction {
        Direction::In if mentions_word(desc, &["interest"]) => TransactionKind::Interest,
        Direction::In if mentions_word(desc, &["transfer"]) => TransactionKind::Transfer,
        Direction::In => TransactionKind::Deposit,
        Direction::Out if mentions_word(desc, &["transfer"]) => TransactionKind::Transfer,
        Direction::Out if mentions_word(desc, &["atm"]) => TransactionKind::AtmWithdrawal,
        Direction::Out if mentions_word(desc, &["check", "checks"]) => TransactionKind::Check,
        Direction::Out if mentions_word(desc, &["fee", "fees"]) || mentions(desc, &["service charge"]) => {
            TransactionKind::Fee
        }
        Direction::Out if mentions(desc, &["debit card"]) || mentions_word(desc, &["purchase", "pos"]) => {
            TransactionKind::DebitCard
        }
        Direction::Out => TransactionKind::Withdrawal,
    }
}

fn scan_line(line: &str, year: i32) -> Option<Transaction> {
    if noise_re().is_match(line) {
        return None;
    }

    let date_match = date_token_re().find(line)?;
    let amount_match = amount_token_re()
        .captures_iter(line)
        .filter_map(|c| c.get(1))
        .find(|m| m.end() <= date_match.start() || m.start() >= date_match.end())?;
    let date = parse_date(date_match.as_str(), year)?;

    // Drop the date and every amount token; what is left describes the row.
    let mut remainder = String::with_capacity(line.len());
    remainder.push_str(&line[..date_match.start()]);
    remainder.push(' ');
    remainder.push_str(&line[date_match.end()..]);
    let remainder = amount_token_re().replace_all(&remainder, " ");
    let description = squash(&remainder);

    let direction = infer_direction(&description);
    let kind = infer_kind(&description, direction);
    Some(
        Transaction::new(kind, date, parse_amount(amount_match.as_str()))
            .with_description(description)
            .with_direction(direction),
    )
}

pub fn parse_generic_text(text: &str, year: i32) -> Vec<Transaction> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| scan_line(line, year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_page_footer_is_noise() {
        assert!(parse_generic_text("Page 1 of 3", 2024).is_empty());
        assert!(parse_generic_text("--- Page 2 ---\n", 2024).is_empty());
    }

    #[test]
    fn test_scans_date_and_amount_lines() {
        let text = "\
03/04 GROCERY OUTLET #88 $54.12
03/05 Mobile deposit 250.00 1,304.12
Ending Balance 03/31 $1,249.00
random words without numbers
";
        let txns = parse_generic_text(text, 2024);
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].transaction_date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(txns[0].amount, dec!(54.12));
        assert_eq!(txns[0].description, "GROCERY OUTLET #88");
        assert_eq!(txns[0].direction, Direction::Out);

        assert_eq!(txns[1].amount, dec!(250.00));
        assert_eq!(txns[1].description, "Mobile deposit");
        assert_eq!(txns[1].direction, Direction::In);
        assert_eq!(txns[1].kind, TransactionKind::Deposit);
    }

    #[test]
    fn test_out_keywords_win() {
        let txns = parse_generic_text("Jul 20 Credit card payment $300.00", 2024);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].direction, Direction::Out);
        assert_eq!(txns[0].transaction_date, NaiveDate::from_ymd_opt(2024, 7, 20).unwrap());
    }

    #[test]
    fn test_transfer_from_checking_is_incoming_transfer() {
        let txns = parse_generic_text("03/05 Transfer from checking 50.00", 2024);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].kind, TransactionKind::Transfer);
        assert_eq!(txns[0].direction, Direction::In);

        let out = parse_generic_text("03/06 Transfer to checking 20.00", 2024);
        assert_eq!(out[0].kind, TransactionKind::Transfer);
        assert_eq!(out[0].direction, Direction::Out);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let txns = parse_generic_text("03/07 Check 1042 75.00\n03/08 COFFEE BAR 4.25", 2024);
        assert_eq!(txns[0].kind, TransactionKind::Check);
        assert_eq!(txns[1].kind, TransactionKind::Withdrawal);
    }

    #[test]
    fn test_empty_description_uses_label() {
        let txns = parse_generic_text("05/15/2003 $12.00", 1999);
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Withdrawal");
        assert_eq!(txns[0].transaction_date, NaiveDate::from_ymd_opt(2003, 5, 15).unwrap());
    }

    #[test]
    fn test_invalid_date_is_skipped() {
        assert!(parse_generic_text("02/30 Something 10.00", 2024).is_empty());
    }
}
