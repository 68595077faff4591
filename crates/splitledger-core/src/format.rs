use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Formats money amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: Decimal, currency: &str) -> String;

    /// Formats a balance with an explicit `+`/`-` sign.
    fn format_signed(&self, amount: Decimal, currency: &str) -> String {
        let body = self.format_amount(amount.abs(), currency);
        if amount.is_sign_negative() && !amount.is_zero() {
            format!("-{body}")
        } else {
            format!("+{body}")
        }
    }
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}
