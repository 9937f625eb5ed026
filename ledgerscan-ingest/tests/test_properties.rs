use chrono::Datelike;
use ledgerscan_ingest::{normalize, parse_amount, parse_date};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

const OCR_VOCAB: &[&str] = &[
    "Acccunt", "acccunt", "Amcunt", "Depcsit", "Depcsits", "Descripticn", "Tctal", "quasricns", "ycu",
    "Ref", "N", "br", "b", "r", "R", "e", "f", "u", "m", "Tran", "Trans", "cn", "Balance", "Mayr", "May",
    "ca!!!", "ca11", "call", "I", "y", "c", "10l03", "$", "05-15", "$3,615.08", "Deposit", "Nbr",
];

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(OCR_VOCAB).prop_map(str::to_string),
        1 => "[a-z0-9]{1,6}",
        1 => "[A-Za-z]{1,8}",
        1 => "[0-9]{1,2}l[0-9]{1,2}",
    ]
}

proptest! {
    #[test]
    fn test_month_day_takes_inferred_year(
        month in 1u32..=12,
        day in 1u32..=28,
        year in 1970i32..2100,
        dash in any::<bool>(),
        padded in any::<bool>(),
    ) {
        let sep = if dash { "-" } else { "/" };
        let text = if padded {
            format!("{month:02}{sep}{day:02}")
        } else {
            format!("{month}{sep}{day}")
        };
        let date = parse_date(&text, year).unwrap();
        prop_assert_eq!(date.year(), year);
        prop_assert_eq!(date.month(), month);
        prop_assert_eq!(date.day(), day);
    }

    #[test]
    fn test_amount_formats_strip_sign_and_symbols(
        whole in 0u64..100_000_000,
        cents in 0u32..100,
        style in 0usize..5,
    ) {
        let plain = format!("{whole}.{cents:02}");
        let grouped = format!("{}.{cents:02}", group_thousands(whole));
        let text = match style {
            0 => format!("${grouped}"),
            1 => format!("-{grouped}"),
            2 => format!("+{plain}"),
            3 => plain.clone(),
            _ => format!("{grouped}-"),
        };
        prop_assert_eq!(parse_amount(&text), Decimal::from_str(&plain).unwrap());
    }

    #[test]
    fn test_normalize_is_idempotent(parts in prop::collection::vec((token(), any::<bool>()), 0..40)) {
        let text: String = parts
            .iter()
            .map(|(tok, newline)| format!("{tok}{}", if *newline { "\n" } else { " " }))
            .collect();
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }
}

#[test]
fn test_group_thousands_helper() {
    assert_eq!(group_thousands(1234567), "1,234,567");
    assert_eq!(group_thousands(999), "999");
}
