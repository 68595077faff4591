use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use splitledger_config::Config;
use splitledger_core::{CurrencyFormatter, DateFormatter};

/// Formatter implementations backed by the active CLI configuration.
#[derive(Clone)]
pub struct CliFormatters {
    config: Arc<RwLock<Config>>,
}

impl CliFormatters {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self { config }
    }

    /// Formats in the configured currency.
    pub fn money(&self, amount: Decimal) -> String {
        self.format_amount(amount, "")
    }

    pub fn signed(&self, amount: Decimal) -> String {
        self.format_signed(amount, "")
    }
}

impl CurrencyFormatter for CliFormatters {
    fn format_amount(&self, amount: Decimal, currency: &str) -> String {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        let code = if currency.is_empty() {
            config.currency.as_str()
        } else {
            currency
        };
        let precision = config.currency_precision;
        let rounded = amount.round_dp(u32::from(precision));
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.*}", usize::from(precision), rounded.abs());
        let body = group_thousands(&digits);
        match currency_symbol(code) {
            Some(symbol) => format!("{sign}{symbol}{body}"),
            None => format!("{sign}{body} {code}"),
        }
    }
}

impl DateFormatter for CliFormatters {
    fn format_date(&self, date: NaiveDate) -> String {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        let pattern = match config.locale.as_str() {
            "en-US" => "%m/%d/%Y",
            "en-AU" | "en-GB" | "en-NZ" | "en-IE" => "%d/%m/%Y",
            _ => "%Y-%m-%d",
        };
        date.format(pattern).to_string()
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "AUD" | "USD" | "CAD" | "NZD" | "SGD" | "HKD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// Inserts `,` between groups of three integer digits.
fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(digits.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
