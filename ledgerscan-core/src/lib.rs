//! ledgerscan-core: statement/transaction data model, categorizer and output projections.

pub mod categorizer;
pub mod error;
pub mod money;
pub mod statement;
pub mod transaction;

pub use categorizer::{Categorized, Category, categorize, extract_merchant};
pub use error::{Result, StatementError};
pub use money::{balance_tolerance, format_usd};
pub use statement::{BalanceReport, BankStatement, CsvRow};
pub use transaction::{Direction, Transaction, TransactionKind};
