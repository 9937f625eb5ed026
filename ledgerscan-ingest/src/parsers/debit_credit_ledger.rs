//! Two-column debit/credit ledger with a running balance.
//!
//!   Date  Description               Debit    Credit   Balance
//!   10/02 POS PURCHASE              4.23              65.73
//!   10/03 PREAUTHORIZEDCREDIT                763.01   828.74
//!         CHECK1234                 9.98              818.76
//!
//! Blank columns vanish in extracted text, so the number of amounts left on
//! a row decides how it is read:
//!   3 amounts: debit, credit, balance
//!   2 amounts: amount and balance; the description decides the column
//!   1 amount:  amount only
//! Rows without a date reuse the previous row's date.

use chrono::NaiveDate;
use ledgerscan_core::{Direction, Transaction, TransactionKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::dates::{month_from_name, parse_amount, parse_date};
use crate::parsers::{mentions, section};

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)Date[ \t]+Description[ \t]+",
            r"(?:Debits?[ \t]+Credits?|Money[ \t]+out[ \t]+Money[ \t]+in|Withdrawals[ \t]+Deposits)",
            r"[ \t]+Balance[^\n]*\n"
        ))
        .expect("ledger header regex")
    })
}

fn end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)\n[ \t]*\n|^[ \t]*(?:---[ \t]*)?Page\b|Activity\s+for|^[ \t]*---")
            .expect("ledger terminator regex")
    })
}

const AMOUNT: &str = r"(?:\d[\d,]*\.\d{2}|\.\d{2})";

fn dated_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?P<date>\d{{1,2}}[/-]\d{{1,2}}|\d{{1,2}}\s+[A-Za-z]{{3,9}})\s+(?P<desc>.+?)\s+(?P<a>{AMOUNT})(?:\s+(?P<b>{AMOUNT}))?(?:\s+(?P<c>{AMOUNT}))?$"
        );
        Regex::new(&pattern).expect("ledger dated row regex")
    })
}

fn undated_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?P<desc>[A-Za-z].*?)\s+(?P<a>{AMOUNT})(?:\s+(?P<b>{AMOUNT}))?(?:\s+(?P<c>{AMOUNT}))?$"
        );
        Regex::new(&pattern).expect("ledger undated row regex")
    })
}

fn is_carried_balance(desc: &str) -> bool {
    mentions(
        desc,
        &["brought forward", "carried forward", "opening balance", "closing balance", "beginning balance"],
    )
}

/// Kind and direction from description keywords, `None` when nothing matches.
pub(crate) fn keyword_kind(desc: &str) -> Option<(TransactionKind, Direction)> {
    let lower = desc.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let found = if has(&["interest"]) {
        (TransactionKind::Interest, Direction::In)
    } else if has(&["deposit", "salary", "payroll", "money in", "refund"])
        || (lower.contains("credit") && !lower.contains("credit card"))
    {
        (TransactionKind::Deposit, Direction::In)
    } else if has(&["check", "cheque"]) {
        (TransactionKind::Check, Direction::Out)
    } else if has(&["atm", "cash", "withdrawal"]) {
        (TransactionKind::AtmWithdrawal, Direction::Out)
    } else if has(&["pos ", "purchase", "card payment"]) {
        (TransactionKind::DebitCard, Direction::Out)
    } else if has(&["fee", "service charge"]) {
        (TransactionKind::Fee, Direction::Out)
    } else if has(&["debit", "insurance", "rent", "bill"]) {
        (TransactionKind::Withdrawal, Direction::Out)
    } else if has(&["payment"]) {
        (TransactionKind::Deposit, Direction::In)
    } else {
        return None;
    };
    Some(found)
}

struct Row<'a> {
    date: NaiveDate,
    desc: &'a str,
    amounts: Vec<Decimal>,
}

fn build(row: Row<'_>, previous_balance: &mut Option<Decimal>) -> Option<Transaction> {
    let Row { date, desc, amounts } = row;

    let (amount, balance, column) = match amounts.as_slice() {
        [debit, credit, balance] => {
            let column = if credit.is_zero() {
                Some(Direction::Out)
            } else if debit.is_zero() {
                Some(Direction::In)
            } else {
                None
            };
            let amount = match column.or(keyword_kind(desc).map(|(_, d)| d)) {
                Some(Direction::In) => *credit,
                _ => *debit,
            };
            (amount, Some(*balance), column)
        }
        [amount, balance] => (*amount, Some(*balance), None),
        [amount] => (*amount, None, None),
        _ => return None,
    };

    let (kind, direction) = match (keyword_kind(desc), column) {
        (Some((kind, dir)), None) => (kind, dir),
        (Some((kind, dir)), Some(col)) if dir == col => (kind, dir),
        (_, Some(Direction::In)) => (TransactionKind::Deposit, Direction::In),
        (_, Some(Direction::Out)) => (TransactionKind::Withdrawal, Direction::Out),
        (None, None) => {
            // keywords gave nothing; fall back on the running balance
            let rose = matches!((*previous_balance, balance), (Some(p), Some(b)) if b > p);
            if rose {
                (TransactionKind::Deposit, Direction::In)
            } else if amounts.len() == 1 {
                (TransactionKind::Other, Direction::Out)
            } else {
                (TransactionKind::Withdrawal, Direction::Out)
            }
        }
    };

    if balance.is_some() {
        *previous_balance = balance;
    }

    let mut txn = Transaction::new(kind, date, amount)
        .with_description(desc)
        .with_direction(direction);
    if let Some(balance) = balance {
        txn = txn.with_balance(balance);
    }
    if kind == TransactionKind::Check {
        let digits: String = desc.chars().filter(char::is_ascii_digit).collect();
        if !digits.is_empty() {
            txn = txn.with_check_number(digits);
        }
    }
    Some(txn)
}

fn amounts_of(caps: &regex::Captures<'_>) -> Vec<Decimal> {
    ["a", "b", "c"]
        .iter()
        .filter_map(|name| caps.name(name))
        .map(|m| parse_amount(m.as_str()))
        .collect()
}

pub fn parse_debit_credit_ledger_text(text: &str, year: i32) -> Vec<Transaction> {
    let Some(body) = section(text, header_re(), &[end_re()]) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut last_date: Option<NaiveDate> = None;
    let mut previous_balance: Option<Decimal> = None;

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (date, caps) = if let Some(caps) = dated_row_re().captures(line) {
            let token = &caps["date"];
            let is_month_form = token.chars().any(|c| c.is_ascii_alphabetic());
            let month_ok = !is_month_form
                || token.split_whitespace().nth(1).and_then(month_from_name).is_some();
            let date = if month_ok { parse_date(token, year) } else { None };
            match date {
                Some(date) => {
                    last_date = Some(date);
                    (date, caps)
                }
                None => continue,
            }
        } else if let Some(caps) = undated_row_re().captures(line) {
            match last_date {
                Some(date) => (date, caps),
                None => continue,
            }
        } else {
            continue;
        };

        let desc = caps.name("desc").map_or("", |m| m.as_str()).trim();
        let amounts = amounts_of(&caps);
        if is_carried_balance(desc) {
            previous_balance = amounts.last().copied();
            continue;
        }
        if let Some(txn) = build(Row { date, desc, amounts }, &mut previous_balance) {
            out.push(txn);
        }
    }

    out
}
