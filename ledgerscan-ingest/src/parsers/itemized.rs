//! Itemized-sections layout.
//!
//! One statement prints each activity type in its own block: reference
//! deposits, "Withdrawals & Debits", a check register, multi-line ATM
//! records and "Card Purchases". The blocks are parsed independently and
//! concatenated in that order as a single strategy.
//!
//! Expected withdrawal / card purchase rows:
//!   Withdrawals & Debits
//!   05-20 $25.10
//!   05-22 ONLINE TRANSFER 100.00

use ledgerscan_core::{Direction, Transaction, TransactionKind};
use regex::Regex;
use std::sync::OnceLock;

use crate::dates::{parse_amount, parse_date};
use crate::parsers::atm_withdrawals::parse_atm_withdrawals_text;
use crate::parsers::check_register::parse_check_register_text;
use crate::parsers::reference_deposits::parse_reference_deposits_text;
use crate::parsers::sections;

fn withdrawals_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:Other[ \t]+)?Withdrawals[ \t]*(?:&|and|8)[ \t]*(?:Other[ \t]+)?Debits[ \t]*$")
            .expect("withdrawals header regex")
    })
}

fn withdrawals_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:Total|ATM|Deposit|Check|Date[ \t]+Paid|(?:Debit[ \t]+)?Card[ \t]+Purchases)")
            .expect("withdrawals terminator regex")
    })
}

fn card_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:Debit[ \t]+)?Card[ \t]+Purchases[ \t]*$").expect("card purchases header regex")
    })
}

fn card_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:Total|ATM|Deposit|Check|Date[ \t]+Paid|(?:Other[ \t]+)?Withdrawals)")
            .expect("card purchases terminator regex")
    })
}

fn pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2}[-/]\d{1,2})\s+(?:(.*?)\s+)?\$?(\d[\d,]*\.\d{2})-?$").expect("date amount pair regex")
    })
}

/// `<date> [description] <amount>` rows in every section under `header`.
fn parse_pairs(
    text: &str,
    year: i32,
    header: &Regex,
    end: &Regex,
    kind: TransactionKind,
) -> Vec<Transaction> {
    sections(text, header, &[end])
        .into_iter()
        .flat_map(str::lines)
        .filter_map(|line| {
            let caps = pair_re().captures(line.trim())?;
            let date = parse_date(&caps[1], year)?;
            let description = caps.get(2).map_or("", |m| m.as_str());
            Some(
                Transaction::new(kind, date, parse_amount(&caps[3]))
                    .with_description(description)
                    .with_direction(Direction::Out),
            )
        })
        .collect()
}

pub fn parse_withdrawal_pairs_text(text: &str, year: i32) -> Vec<Transaction> {
    parse_pairs(
        text,
        year,
        withdrawals_header_re(),
        withdrawals_end_re(),
        TransactionKind::Withdrawal,
    )
}

pub fn parse_card_purchases_text(text: &str, year: i32) -> Vec<Transaction> {
    parse_pairs(text, year, card_header_re(), card_end_re(), TransactionKind::DebitCard)
}

pub fn parse_itemized_sections_text(text: &str, year: i32) -> Vec<Transaction> {
    let mut out = parse_reference_deposits_text(text, year);
    out.extend(parse_withdrawal_pairs_text(text, year));
    out.extend(parse_check_register_text(text, year));
    out.extend(parse_atm_withdrawals_text(text, year));
    out.extend(parse_card_purchases_text(text, year));
    out
}
