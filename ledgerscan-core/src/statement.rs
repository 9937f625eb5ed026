//! The statement aggregate: metadata, balances, summary totals and the
//! extracted transactions, plus its validation and output projections.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::error::{Result, StatementError};
use crate::money::{balance_tolerance, format_usd};
use crate::transaction::Transaction;

/// Result of parsing one statement document.
///
/// Built once by the parser; every metadata field is optional because
/// extraction may miss it without failing the whole parse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BankStatement {
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub account_holder_name: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub statement_date: Option<NaiveDate>,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,

    #[serde(default)]
    pub beginning_balance: Decimal,
    #[serde(default)]
    pub ending_balance: Decimal,

    #[serde(default)]
    pub total_deposits: Decimal,
    #[serde(default)]
    pub total_withdrawals: Decimal,
    #[serde(default)]
    pub total_atm_withdrawals: Decimal,
    #[serde(default)]
    pub total_checks: Decimal,
    #[serde(default)]
    pub total_fees: Decimal,

    /// Extraction order, not necessarily chronological.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Advisory reconciliation of the summary totals against the ending balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub expected_ending: Decimal,
    pub actual_ending: Decimal,
    pub difference: Decimal,
    pub balanced: bool,
}

/// One CSV row per transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvRow {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Transaction Date")]
    pub transaction_date: String,
    #[serde(rename = "Posted Date")]
    pub posted_date: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Direction")]
    pub direction: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Merchant")]
    pub merchant: String,
    #[serde(rename = "Check Number")]
    pub check_number: String,
    #[serde(rename = "Reference Number")]
    pub reference_number: String,
}

impl BankStatement {
    /// `beginning + deposits - withdrawals - atm - checks - fees` against `ending`.
    pub fn balance_report(&self) -> BalanceReport {
        let expected_ending = self.beginning_balance + self.total_deposits
            - self.total_withdrawals
            - self.total_atm_withdrawals
            - self.total_checks
            - self.total_fees;
        let difference = (expected_ending - self.ending_balance).abs();

        BalanceReport {
            expected_ending,
            actual_ending: self.ending_balance,
            difference,
            balanced: difference <= balance_tolerance(),
        }
    }

    /// True when the summary totals reconcile within one cent.
    pub fn validate(&self) -> bool {
        self.balance_report().balanced
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_csv_rows(&self) -> Vec<CsvRow> {
        self.transactions
            .iter()
            .map(|t| CsvRow {
                kind: t.kind.label().to_string(),
                transaction_date: t.transaction_date.to_string(),
                posted_date: t.posted_date.map(|d| d.to_string()).unwrap_or_default(),
                amount: format!("{:.2}", t.amount),
                direction: format!("{:?}", t.direction).to_lowercase(),
                description: t.description.clone(),
                category: t.category.to_string(),
                merchant: t.merchant.clone(),
                check_number: t.check_number.clone().unwrap_or_default(),
                reference_number: t.reference_number.clone().unwrap_or_default(),
            })
            .collect()
    }

    /// CSV document with a header row. Quoting of commas, quotes and
    /// newlines is handled by the writer.
    pub fn to_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in self.to_csv_rows() {
            wtr.serialize(row)?;
        }
        if self.transactions.is_empty() {
            wtr.write_record(CSV_HEADER)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| StatementError::Csv(e.into_error().into()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn to_summary_text(&self) -> String {
        let mut out = String::new();
        let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
        let date = |d: Option<NaiveDate>| or_dash(d.map(|d| d.to_string()));

        let _ = writeln!(out, "=== Bank Statement Summary ===");
        if let Some(bank) = &self.bank_name {
            let _ = writeln!(out, "Bank: {bank}");
        }
        let _ = writeln!(out, "Account: {}", or_dash(self.account_number.clone()));
        let _ = writeln!(out, "Account Holder: {}", or_dash(self.account_holder_name.clone()));
        let _ = writeln!(out, "Statement Date: {}", date(self.statement_date));
        let _ = writeln!(out, "Period: {} to {}", date(self.period_start), date(self.period_end));

        let _ = writeln!(out, "\n--- Balances ---");
        let _ = writeln!(out, "Beginning Balance: {}", format_usd(self.beginning_balance));
        let _ = writeln!(out, "Ending Balance:    {}", format_usd(self.ending_balance));

        let _ = writeln!(out, "\n--- Activity ---");
        let _ = writeln!(out, "Total Deposits:        {}", format_usd(self.total_deposits));
        let _ = writeln!(out, "Total Withdrawals:     {}", format_usd(self.total_withdrawals));
        let _ = writeln!(out, "Total ATM Withdrawals: {}", format_usd(self.total_atm_withdrawals));
        let _ = writeln!(out, "Total Checks:          {}", format_usd(self.total_checks));
        if self.total_fees > Decimal::ZERO {
            let _ = writeln!(out, "Total Fees:            {}", format_usd(self.total_fees));
        }

        let _ = writeln!(out, "\n--- Transactions ---");
        let _ = writeln!(out, "Total Transactions: {}", self.transactions.len());

        let report = self.balance_report();
        let _ = writeln!(out, "\n--- Validation ---");
        if report.balanced {
            let _ = writeln!(out, "Balance Check: PASSED");
        } else {
            let _ = writeln!(
                out,
                "Balance Check: FAILED (expected {}, off by {})",
                format_usd(report.expected_ending),
                format_usd(report.difference)
            );
        }
        out
    }
}

const CSV_HEADER: [&str; 10] = [
    "Type",
    "Transaction Date",
    "Posted Date",
    "Amount",
    "Direction",
    "Description",
    "Category",
    "Merchant",
    "Check Number",
    "Reference Number",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionKind;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> BankStatement {
        BankStatement {
            account_number: Some("1234567890".to_string()),
            account_holder_name: Some("Jane Customer".to_string()),
            statement_date: Some(d(2003, 6, 1)),
            beginning_balance: dec!(7126.11),
            ending_balance: dec!(10436.19),
            total_deposits: dec!(3615.08),
            total_checks: dec!(305.00),
            transactions: vec![
                Transaction::new(TransactionKind::Deposit, d(2003, 5, 15), dec!(3615.08))
                    .with_reference_number("130012345"),
                Transaction::new(TransactionKind::Check, d(2003, 5, 12), dec!(75.00))
                    .with_check_number("1001")
                    .with_description("Check #1001"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_balanced_statement() {
        let stmt = sample();
        let report = stmt.balance_report();
        assert_eq!(report.expected_ending, dec!(10436.19));
        assert!(report.balanced);
        assert!(stmt.validate());
    }

    #[test]
    fn test_validate_reports_mismatch() {
        let stmt = BankStatement {
            ending_balance: dec!(10435.19),
            ..sample()
        };
        let report = stmt.balance_report();
        assert_eq!(report.difference, dec!(1.00));
        assert!(!stmt.validate());
        // advisory only: the statement is untouched
        assert_eq!(stmt.transactions.len(), 2);
    }

    #[test]
    fn test_validate_within_tolerance() {
        let stmt = BankStatement {
            ending_balance: dec!(10436.20),
            ..sample()
        };
        assert!(stmt.validate());
    }

    #[test]
    fn test_json_round_trip() {
        let stmt = sample();
        let json = stmt.to_json().unwrap();
        let back = BankStatement::from_json(&json).unwrap();
        assert_eq!(back.account_number, stmt.account_number);
        assert_eq!(back.beginning_balance, stmt.beginning_balance);
        assert_eq!(back.ending_balance, stmt.ending_balance);
        assert_eq!(back.transactions.len(), 2);
        assert_eq!(back, stmt);
    }

    #[test]
    fn test_json_escapes_description() {
        let mut stmt = sample();
        stmt.transactions[0] = stmt.transactions[0]
            .clone()
            .with_description("Deposit \"branch\"\nline two");
        let json = stmt.to_json().unwrap();
        assert!(json.contains(r#"Deposit \"branch\"\nline two"#));
        let back = BankStatement::from_json(&json).unwrap();
        assert_eq!(back.transactions[0].description, "Deposit \"branch\"\nline two");
    }

    #[test]
    fn test_csv_quotes_embedded_commas_and_quotes() {
        let mut stmt = sample();
        stmt.transactions[1] = stmt.transactions[1]
            .clone()
            .with_description("Check #1001, \"rent\"");
        let csv = stmt.to_csv().unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("Type,Transaction Date,Posted Date,Amount"));
        assert!(csv.contains(r#""Check #1001, ""rent""""#));

        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][5], "Check #1001, \"rent\"");
        assert_eq!(&records[0][3], "3615.08");
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let stmt = BankStatement::default();
        let csv = stmt.to_csv().unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_summary_text() {
        let summary = sample().to_summary_text();
        assert!(summary.contains("Account: 1234567890"));
        assert!(summary.contains("Beginning Balance: $7,126.11"));
        assert!(summary.contains("Total Transactions: 2"));
        assert!(summary.contains("Balance Check: PASSED"));
        assert!(!summary.contains("Total Fees"));
    }
}
