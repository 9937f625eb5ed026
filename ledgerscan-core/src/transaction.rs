//! Transaction model: one posted movement on a statement.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::categorizer::{Category, categorize};

/// Closed set of transaction kinds a statement line can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    AtmWithdrawal,
    Check,
    DebitCard,
    CreditCard,
    Fee,
    Interest,
    Transfer,
    Other,
}

impl TransactionKind {
    /// Label used for synthesized descriptions and CSV output.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::AtmWithdrawal => "ATM Withdrawal",
            TransactionKind::Check => "Check",
            TransactionKind::DebitCard => "Debit Card",
            TransactionKind::CreditCard => "Credit Card",
            TransactionKind::Fee => "Fee",
            TransactionKind::Interest => "Interest",
            TransactionKind::Transfer => "Transfer",
            TransactionKind::Other => "Other",
        }
    }

    /// Direction implied by the kind alone. Transfers default to money in;
    /// the extractor that creates one overrides this when it knows better.
    pub fn default_direction(&self) -> Direction {
        match self {
            TransactionKind::Deposit | TransactionKind::Interest | TransactionKind::Transfer => {
                Direction::In
            }
            _ => Direction::Out,
        }
    }
}

/// Whether a transaction increases (`In`) or decreases (`Out`) the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// One posted transaction.
///
/// `amount` is always a non-negative magnitude; `direction` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub direction: Direction,
    pub transaction_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub merchant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Running balance printed next to the row, when the layout has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

impl Transaction {
    /// Start a transaction with a synthesized description (the kind's label).
    pub fn new(kind: TransactionKind, transaction_date: NaiveDate, amount: Decimal) -> Self {
        let description = kind.label().to_string();
        let categorized = categorize(&description);
        Self {
            kind,
            direction: kind.default_direction(),
            transaction_date,
            posted_date: None,
            amount: amount.abs(),
            description,
            category: categorized.category,
            merchant: categorized.merchant,
            check_number: None,
            reference_number: None,
            location: None,
            balance: None,
        }
    }

    /// Replace the description and re-derive category and merchant.
    /// Blank text keeps the synthesized label.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        let description = description.trim();
        if description.is_empty() {
            return self;
        }
        let categorized = categorize(description);
        self.description = description.to_string();
        self.category = categorized.category;
        self.merchant = categorized.merchant;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_posted_date(mut self, posted_date: Option<NaiveDate>) -> Self {
        self.posted_date = posted_date;
        self
    }

    pub fn with_check_number(mut self, check_number: impl Into<String>) -> Self {
        self.check_number = Some(check_number.into());
        self
    }

    pub fn with_reference_number(mut self, reference_number: impl Into<String>) -> Self {
        self.reference_number = Some(reference_number.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Posted date, defaulting to the transaction date.
    pub fn posted_on(&self) -> NaiveDate {
        self.posted_date.unwrap_or(self.transaction_date)
    }

    /// Amount with the direction applied: positive in, negative out.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::In => self.amount,
            Direction::Out => -self.amount,
        }
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::In
    }
}
