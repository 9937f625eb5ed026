//! Deterministic keyword categorizer for transaction descriptions.
//!
//! Rules are checked top to bottom against the lowercased description and
//! the first hit wins. No match means `Category::Other`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Semantic spending/income category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Income,
    Transfer,
    Groceries,
    Dining,
    Gas,
    Shopping,
    Utilities,
    Housing,
    Insurance,
    Fees,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Transfer => "Transfer",
            Category::Groceries => "Groceries",
            Category::Dining => "Dining",
            Category::Gas => "Gas",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Housing => "Housing",
            Category::Insurance => "Insurance",
            Category::Fees => "Fees",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorization result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorized {
    pub category: Category,
    pub merchant: String,
}

const RULES: &[(Category, &[&str])] = &[
    (Category::Income, &["income", "salary", "paycheck", "payroll", "direct deposit"]),
    (Category::Transfer, &["transfer in", "deposit"]),
    (
        Category::Groceries,
        &["grocery", "supermarket", "food", "kroger", "safeway", "publix", "aldi", "trader joe"],
    ),
    (Category::Dining, &["restaurant", "dining", "coffee", "starbucks", "cafe"]),
    (Category::Gas, &["gas", "fuel", "petrol", "exxon", "shell", "chevron", "texaco"]),
    (Category::Shopping, &["amazon", "walmart", "target", "costco"]),
    (Category::Utilities, &["utility", "electric", "water", "internet", "phone bill"]),
    (Category::Housing, &["rent", "mortgage"]),
    (Category::Insurance, &["insurance"]),
    (Category::Fees, &["service charge", "overdraft", "monthly fee", "maintenance fee"]),
    (Category::Transfer, &["transfer out", "withdrawal"]),
];

/// Categorize a free-text description and pull out a best-effort merchant.
pub fn categorize(description: &str) -> Categorized {
    let desc = description.to_lowercase();

    let category = RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| desc.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default();

    Categorized {
        category,
        merchant: extract_merchant(description),
    }
}

fn boilerplate_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^(?:debit card purchase|pos purchase|debit purchase|credit card|purchase|",
            r"payment to|transfer to|transfer from|from)\s*-?\s*"
        ))
        .expect("merchant prefix regex")
    })
}

fn card_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s+(?:card\s*)?(?:x+|\*+)?\d{4,}\s*$").expect("merchant suffix regex")
    })
}

/// Strip boilerplate and card suffixes, then keep text up to the first `-`, `#` or `*`.
pub fn extract_merchant(description: &str) -> String {
    let cleaned = boilerplate_prefix_re().replace(description.trim(), "");
    let cleaned = card_suffix_re().replace(&cleaned, "");
    cleaned
        .split(['-', '#', '*'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_income() {
        assert_eq!(categorize("ACME CORP PAYROLL").category, Category::Income);
        assert_eq!(categorize("Direct Deposit - Employer").category, Category::Income);
        assert_eq!(categorize("RENTAL INCOME UNIT 4").category, Category::Income);
    }

    #[test]
    fn test_categorize_groceries() {
        let result = categorize("Debit Card Purchase - Safeway #1234");
        assert_eq!(result.category, Category::Groceries);
        assert_eq!(result.merchant, "Safeway");
    }

    #[test]
    fn test_categorize_gas_brand() {
        assert_eq!(categorize("EXXONMOBIL 4432 HOUSTON").category, Category::Gas);
        assert_eq!(categorize("Card payment - High St Petrol Station").category, Category::Gas);
    }

    #[test]
    fn test_first_rule_wins() {
        // "direct deposit" is income even though "deposit" alone is a transfer.
        assert_eq!(categorize("DIRECT DEPOSIT").category, Category::Income);
        assert_eq!(categorize("Mobile deposit").category, Category::Transfer);
    }

    #[test]
    fn test_categorize_defaults_to_other() {
        let result = categorize("Check #1001");
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.merchant, "Check");
    }

    #[test]
    fn test_merchant_strips_card_suffix() {
        assert_eq!(extract_merchant("POS PURCHASE CORNER DELI 5512"), "CORNER DELI");
        assert_eq!(extract_merchant("Transfer to Savings xxxx1234"), "Savings");
        assert_eq!(extract_merchant("AMAZON*MKTP US"), "AMAZON");
    }

    #[test]
    fn test_merchant_may_be_empty() {
        assert_eq!(extract_merchant("#4411"), "");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Groceries.to_string(), "Groceries");
        assert_eq!(Category::default(), Category::Other);
    }
}
