//! Tokenizer for raw split values such as `"50, 30, r"`.

use std::str::FromStr;

use rust_decimal::Decimal;

use splitledger_domain::{parse_list, SplitPolicy};

use crate::SplitError;

/// One parsed entry of a split value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitToken {
    Value(Decimal),
    /// `r`: infer this entry from the others so the total matches.
    Remainder,
}

impl SplitToken {
    pub fn value(self) -> Option<Decimal> {
        match self {
            SplitToken::Value(value) => Some(value),
            SplitToken::Remainder => None,
        }
    }
}

/// Parsed split values, with at most one remainder placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitValues {
    tokens: Vec<SplitToken>,
    remainder_index: Option<usize>,
}

impl SplitValues {
    /// Parses `raw` into exactly `expected` tokens for the given policy.
    ///
    /// Checks run in this order: token count, remainder on a policy that does
    /// not accept it, more than one remainder, non-numeric token.
    pub fn parse(raw: &str, expected: usize, policy: SplitPolicy) -> Result<Self, SplitError> {
        let items: Vec<String> = parse_list(raw)
            .into_iter()
            .map(|item| item.to_ascii_lowercase())
            .collect();
        if items.len() != expected {
            return Err(SplitError::CountMismatch {
                expected,
                found: items.len(),
            });
        }

        let remainder_count = items.iter().filter(|item| item.as_str() == "r").count();
        if remainder_count > 0 && !policy.allows_remainder() {
            return Err(SplitError::RemainderNotSupported(policy));
        }
        if remainder_count > 1 {
            return Err(SplitError::MultipleRemainders);
        }

        let mut tokens = Vec::with_capacity(items.len());
        let mut remainder_index = None;
        for (idx, item) in items.iter().enumerate() {
            if item == "r" {
                remainder_index = Some(idx);
                tokens.push(SplitToken::Remainder);
            } else {
                tokens.push(SplitToken::Value(parse_number(item)?));
            }
        }

        Ok(Self {
            tokens,
            remainder_index,
        })
    }

    pub fn tokens(&self) -> &[SplitToken] {
        &self.tokens
    }

    pub fn has_remainder(&self) -> bool {
        self.remainder_index.is_some()
    }

    /// Sum of the explicit values, ignoring the placeholder.
    pub fn known_total(&self) -> Result<Decimal, SplitError> {
        checked_sum(self.tokens.iter().filter_map(|token| token.value()))
    }

    /// Replaces the placeholder so that all values add up to `target`.
    pub fn resolve(self, target: Decimal) -> Result<Vec<Decimal>, SplitError> {
        let fill = target
            .checked_sub(self.known_total()?)
            .ok_or(SplitError::ValueTooLarge)?;
        Ok(self
            .tokens
            .into_iter()
            .map(|token| token.value().unwrap_or(fill))
            .collect())
    }
}

/// Adds `values`, failing instead of overflowing.
pub(crate) fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal, SplitError> {
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total.checked_add(value).ok_or(SplitError::ValueTooLarge)
    })
}

fn parse_number(item: &str) -> Result<Decimal, SplitError> {
    Decimal::from_str(item)
        .or_else(|_| Decimal::from_scientific(item))
        .map_err(|_| SplitError::NonNumeric(item.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_values_and_single_remainder() {
        let values = SplitValues::parse("50, 30, R", 3, SplitPolicy::Percent).expect("parse");
        assert!(values.has_remainder());
        assert_eq!(
            values.tokens(),
            &[
                SplitToken::Value(dec!(50)),
                SplitToken::Value(dec!(30)),
                SplitToken::Remainder
            ]
        );
        assert_eq!(
            values.resolve(dec!(100)).expect("resolve"),
            vec![dec!(50), dec!(30), dec!(20)]
        );
    }

    #[test]
    fn count_mismatch_is_reported_first() {
        let err = SplitValues::parse("r,r", 3, SplitPolicy::Shares).unwrap_err();
        assert_eq!(
            err,
            SplitError::CountMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn remainder_rejected_for_shares_before_duplicate_check() {
        let err = SplitValues::parse("r,r", 2, SplitPolicy::Shares).unwrap_err();
        assert_eq!(err, SplitError::RemainderNotSupported(SplitPolicy::Shares));
    }

    #[test]
    fn two_remainders_rejected() {
        let err = SplitValues::parse("r,r,1", 3, SplitPolicy::Exact).unwrap_err();
        assert_eq!(err, SplitError::MultipleRemainders);
    }

    #[test]
    fn non_numeric_token_rejected() {
        let err = SplitValues::parse("10,abc", 2, SplitPolicy::Exact).unwrap_err();
        assert_eq!(err, SplitError::NonNumeric("abc".into()));
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let values = SplitValues::parse("1e1,r", 2, SplitPolicy::Exact).expect("parse");
        assert_eq!(values.resolve(dec!(25)).expect("resolve"), vec![dec!(10), dec!(15)]);
    }

    #[test]
    fn totals_past_the_decimal_range_are_rejected() {
        let values = SplitValues::parse(
            "79228162514264337593543950335,79228162514264337593543950335",
            2,
            SplitPolicy::Exact,
        )
        .expect("each token is a finite number");
        assert_eq!(values.known_total(), Err(SplitError::ValueTooLarge));

        let values = SplitValues::parse("-79228162514264337593543950335,r", 2, SplitPolicy::Exact)
            .expect("parse");
        assert_eq!(values.resolve(dec!(1)), Err(SplitError::ValueTooLarge));
    }
}
