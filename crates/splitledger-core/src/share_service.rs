//! Turns an expense amount plus a split policy into per-participant shares.

use std::collections::HashSet;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use splitledger_domain::{Person, ShareMap, SplitPolicy, MINOR_UNITS, SUM_TOLERANCE};

use crate::{
    split_input::{checked_sum, SplitValues},
    SplitError,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub struct ShareService;

impl ShareService {
    /// Computes each participant's owed share of `amount`.
    ///
    /// `raw_values` is ignored for [`SplitPolicy::Equal`].
    pub fn build_shares(
        amount: Decimal,
        participants: &[Person],
        policy: SplitPolicy,
        raw_values: &str,
    ) -> Result<ShareMap, SplitError> {
        ensure_participants(participants)?;

        let count = participants.len();
        match policy {
            SplitPolicy::Equal => {
                let each = amount / Decimal::from(count);
                Ok(participants.iter().map(|p| (p.clone(), each)).collect())
            }
            SplitPolicy::Percent => {
                let percents = SplitValues::parse(raw_values, count, policy)?.resolve(HUNDRED)?;
                let total = checked_sum(percents.iter().copied())?;
                if drift(total, HUNDRED)? > SUM_TOLERANCE {
                    return Err(SplitError::PercentSum(total));
                }
                zip_shares(participants, percents, |pct| {
                    amount.checked_mul(pct)?.checked_div(HUNDRED)
                })
            }
            SplitPolicy::Shares => {
                let weights =
                    SplitValues::parse(raw_values, count, policy)?.resolve(Decimal::ZERO)?;
                let total = checked_sum(weights.iter().copied())?;
                if total <= Decimal::ZERO {
                    return Err(SplitError::NonPositiveWeights);
                }
                zip_shares(participants, weights, |weight| {
                    amount.checked_mul(weight)?.checked_div(total)
                })
            }
            SplitPolicy::Exact => {
                let exact = SplitValues::parse(raw_values, count, policy)?.resolve(amount)?;
                let total = checked_sum(exact.iter().copied())?;
                if drift(total, amount)? > SUM_TOLERANCE {
                    return Err(SplitError::ExactSum { total, amount });
                }
                zip_shares(participants, exact, Some)
            }
        }
    }

    /// Like [`ShareService::build_shares`], then applies the two-party
    /// rounding rule: on an equal split between the payer and one other
    /// person with an odd cent total, the payer's share rounds down and the
    /// other person absorbs the extra cent.
    pub fn build_expense_shares(
        amount: Decimal,
        payer: &Person,
        participants: &[Person],
        policy: SplitPolicy,
        raw_values: &str,
    ) -> Result<ShareMap, SplitError> {
        let mut shares = Self::build_shares(amount, participants, policy, raw_values)?;
        if policy == SplitPolicy::Equal && participants.len() == 2 {
            apply_two_party_rounding(&mut shares, amount, payer, participants);
        }
        Ok(shares)
    }
}

/// Free-function form of [`ShareService::build_shares`].
pub fn build_shares(
    amount: Decimal,
    participants: &[Person],
    policy: SplitPolicy,
    raw_values: &str,
) -> Result<ShareMap, SplitError> {
    ShareService::build_shares(amount, participants, policy, raw_values)
}

fn ensure_participants(participants: &[Person]) -> Result<(), SplitError> {
    if participants.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for person in participants {
        if !seen.insert(person.as_str()) {
            return Err(SplitError::DuplicateParticipant(person.clone()));
        }
    }
    Ok(())
}

fn drift(total: Decimal, target: Decimal) -> Result<Decimal, SplitError> {
    total
        .checked_sub(target)
        .map(|diff| diff.abs())
        .ok_or(SplitError::ValueTooLarge)
}

/// `share` returns `None` when the product leaves the `Decimal` range.
fn zip_shares(
    participants: &[Person],
    values: Vec<Decimal>,
    share: impl Fn(Decimal) -> Option<Decimal>,
) -> Result<ShareMap, SplitError> {
    participants
        .iter()
        .cloned()
        .zip(values)
        .map(|(person, value)| Ok((person, share(value).ok_or(SplitError::ValueTooLarge)?)))
        .collect()
}

fn apply_two_party_rounding(
    shares: &mut ShareMap,
    amount: Decimal,
    payer: &Person,
    participants: &[Person],
) {
    if !participants.contains(payer) {
        return;
    }
    let Some(other) = participants.iter().find(|p| *p != payer) else {
        return;
    };
    let Some(cents) = amount
        .checked_mul(Decimal::from(MINOR_UNITS))
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
    else {
        return;
    };
    if cents.abs() % 2 != 1 {
        return;
    }

    let abs_cents = cents.abs();
    let mut payer_cents = abs_cents / 2;
    let mut other_cents = abs_cents - payer_cents;
    if cents < 0 {
        payer_cents = -payer_cents;
        other_cents = -other_cents;
    }
    shares.insert(payer.clone(), Decimal::new(payer_cents, 2));
    shares.insert(other.clone(), Decimal::new(other_cents, 2));
}
