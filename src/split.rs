//! Split strategies: how the total of an expense is divided among participants.
//!
//! Every strategy yields shares in participant order whose sum is exactly the
//! total. Strategies that divide (equal, percentage, shares) round each share to
//! the cent and put the whole residual on the first participant.

use std::collections::HashSet;

use thiserror::Error;

use crate::Amount;
use crate::model::UserId;

/// Hundredths of a percent making up a whole.
const FULL_BASIS_POINTS: i64 = 10_000;

/// Accepted gap between the sum of percentages and 100, in basis points.
const PERCENT_TOLERANCE_BASIS_POINTS: i64 = 1;

/// Why a split could not produce shares.
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("invalid split: no participants")]
    NoParticipants,

    #[error("invalid split: participant {0} appears more than once")]
    DuplicateParticipant(UserId),

    #[error("invalid split: negative amount {0}")]
    NegativeAmount(Amount),

    #[error("invalid split: shares sum to {actual}, expected {expected}")]
    TotalMismatch { expected: Amount, actual: Amount },

    #[error("invalid split: percentage {1} for participant {0}")]
    InvalidPercentage(UserId, f64),

    #[error("invalid split: percentages sum to {0}, expected 100")]
    PercentageMismatch(f64),

    #[error("invalid split: weight of participant {0} must be positive")]
    InvalidWeight(UserId),

    #[error("invalid split: amounts overflow")]
    Overflow,
}

/// Kind of split, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    Equal,
    Exact,
    Percentage,
    Shares,
}

/// A total amount and the rule used to divide it.
#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    /// Divide evenly.
    Equal {
        total: Amount,
        participants: Vec<UserId>,
    },
    /// Caller-supplied amount per participant.
    Exact {
        total: Amount,
        amounts: Vec<(UserId, Amount)>,
    },
    /// Percentage of the total per participant; must add up to 100.
    Percentage {
        total: Amount,
        percents: Vec<(UserId, f64)>,
    },
    /// Proportional to a positive weight per participant.
    Shares {
        total: Amount,
        weights: Vec<(UserId, u32)>,
    },
}

impl Split {
    pub fn equal(total: Amount, participants: Vec<UserId>) -> Self {
        Split::Equal {
            total,
            participants,
        }
    }

    pub fn exact(total: Amount, amounts: Vec<(UserId, Amount)>) -> Self {
        Split::Exact { total, amounts }
    }

    pub fn percentage(total: Amount, percents: Vec<(UserId, f64)>) -> Self {
        Split::Percentage { total, percents }
    }

    pub fn shares(total: Amount, weights: Vec<(UserId, u32)>) -> Self {
        Split::Shares { total, weights }
    }

    pub fn kind(&self) -> SplitKind {
        match self {
            Split::Equal { .. } => SplitKind::Equal,
            Split::Exact { .. } => SplitKind::Exact,
            Split::Percentage { .. } => SplitKind::Percentage,
            Split::Shares { .. } => SplitKind::Shares,
        }
    }

    pub fn total(&self) -> Amount {
        match self {
            Split::Equal { total, .. }
            | Split::Exact { total, .. }
            | Split::Percentage { total, .. }
            | Split::Shares { total, .. } => *total,
        }
    }

    /// Participants in the order shares are assigned.
    pub fn participants(&self) -> Vec<UserId> {
        match self {
            Split::Equal { participants, .. } => participants.clone(),
            Split::Exact { amounts, .. } => amounts.iter().map(|(id, _)| *id).collect(),
            Split::Percentage { percents, .. } => percents.iter().map(|(id, _)| *id).collect(),
            Split::Shares { weights, .. } => weights.iter().map(|(id, _)| *id).collect(),
        }
    }

    /// Compute every participant's share, requiring exact amounts to match the total to the cent.
    pub fn calculate_shares(&self) -> Result<Vec<(UserId, Amount)>, SplitError> {
        self.calculate_shares_within(Amount::ZERO)
    }

    /// Compute every participant's share.
    ///
    /// `tolerance` is how far the sum of an exact split may drift from the total.
    /// Other strategies always sum to the total exactly.
    pub fn calculate_shares_within(
        &self,
        tolerance: Amount,
    ) -> Result<Vec<(UserId, Amount)>, SplitError> {
        let total = self.total();
        if total.is_negative() {
            return Err(SplitError::NegativeAmount(total));
        }
        check_participants(&self.participants())?;

        match self {
            Split::Equal { participants, .. } => {
                let share = total
                    .mul_ratio(1, participants.len() as i64)
                    .ok_or(SplitError::NoParticipants)?;
                let mut shares: Vec<_> = participants.iter().map(|id| (*id, share)).collect();
                assign_residual(total, &mut shares)?;
                Ok(shares)
            }
            Split::Exact { amounts, .. } => {
                if let Some((_, negative)) = amounts.iter().find(|(_, amt)| amt.is_negative()) {
                    return Err(SplitError::NegativeAmount(*negative));
                }
                let actual = Amount::checked_sum(amounts.iter().map(|(_, amt)| *amt))
                    .ok_or(SplitError::Overflow)?;
                // both sides are non-negative, so the difference cannot overflow
                let drift = (actual - total).cents().unsigned_abs();
                if drift > tolerance.cents().unsigned_abs() {
                    return Err(SplitError::TotalMismatch {
                        expected: total,
                        actual,
                    });
                }
                Ok(amounts.clone())
            }
            Split::Percentage { percents, .. } => {
                let mut basis_points = Vec::with_capacity(percents.len());
                for (id, pct) in percents {
                    if !pct.is_finite() || *pct < 0.0 || *pct > 100.0 {
                        return Err(SplitError::InvalidPercentage(*id, *pct));
                    }
                    basis_points.push((*id, (pct * 100.0).round() as i64));
                }
                let sum: i64 = basis_points.iter().map(|(_, bp)| bp).sum();
                if (sum - FULL_BASIS_POINTS).abs() > PERCENT_TOLERANCE_BASIS_POINTS {
                    return Err(SplitError::PercentageMismatch(sum as f64 / 100.0));
                }
                let mut shares = Vec::with_capacity(basis_points.len());
                for (id, bp) in basis_points {
                    let share = total
                        .mul_ratio(bp, FULL_BASIS_POINTS)
                        .ok_or(SplitError::Overflow)?;
                    shares.push((id, share));
                }
                assign_residual(total, &mut shares)?;
                Ok(shares)
            }
            Split::Shares { weights, .. } => {
                if let Some((id, _)) = weights.iter().find(|(_, w)| *w == 0) {
                    return Err(SplitError::InvalidWeight(*id));
                }
                let sum: i64 = weights.iter().map(|(_, w)| i64::from(*w)).sum();
                let mut shares = Vec::with_capacity(weights.len());
                for (id, weight) in weights {
                    let share = total
                        .mul_ratio(i64::from(*weight), sum)
                        .ok_or(SplitError::Overflow)?;
                    shares.push((*id, share));
                }
                assign_residual(total, &mut shares)?;
                Ok(shares)
            }
        }
    }
}

fn check_participants(participants: &[UserId]) -> Result<(), SplitError> {
    if participants.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(*id) {
            return Err(SplitError::DuplicateParticipant(*id));
        }
    }
    Ok(())
}

/// Put whatever rounding lost or gained on the first participant.
fn assign_residual(total: Amount, shares: &mut [(UserId, Amount)]) -> Result<(), SplitError> {
    let allocated =
        Amount::checked_sum(shares.iter().map(|(_, share)| *share)).ok_or(SplitError::Overflow)?;
    let residual = total.checked_sub(allocated).ok_or(SplitError::Overflow)?;
    if let Some((_, first)) = shares.first_mut() {
        *first = first.checked_add(residual).ok_or(SplitError::Overflow)?;
    }
    Ok(())
}
