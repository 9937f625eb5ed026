//! Currency formatting for human-readable output.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tolerance used when reconciling statement balances (one cent).
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Format an amount as `$1,234.56` (negative amounts as `-$1,234.56`).
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
