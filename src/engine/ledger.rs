use std::collections::HashMap;

use thiserror::Error;

use crate::Amount;
use crate::model::UserId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("user {0} has no ledger row")]
    UnknownUser(UserId),

    #[error("balance of {debtor} towards {creditor} would overflow")]
    Overflow { debtor: UserId, creditor: UserId },
}

/// Net debts between users, one row of outgoing debts per debtor.
///
/// Entries are directed: `(debtor, creditor)` is never netted against
/// `(creditor, debtor)`. A pair whose net amount reaches zero is removed, so
/// no stored entry is ever zero.
#[derive(Debug, Default, Clone)]
pub struct BalanceLedger {
    rows: HashMap<UserId, HashMap<UserId, Amount>>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `user` an empty row. Existing rows are kept as they are.
    pub fn initialize_user(&mut self, user: UserId) {
        self.rows.entry(user).or_default();
    }

    pub fn contains_user(&self, user: UserId) -> bool {
        self.rows.contains_key(&user)
    }

    /// The entry `update_balance` would leave, without applying it.
    pub fn check_update(
        &self,
        debtor: UserId,
        creditor: UserId,
        delta: Amount,
    ) -> Result<Amount, LedgerError> {
        self.balance(debtor, creditor)?
            .checked_add(delta)
            .ok_or(LedgerError::Overflow { debtor, creditor })
    }

    /// Add `delta` to what `debtor` owes `creditor`, pruning the entry if it nets to zero.
    pub fn update_balance(
        &mut self,
        debtor: UserId,
        creditor: UserId,
        delta: Amount,
    ) -> Result<(), LedgerError> {
        let updated = self.check_update(debtor, creditor, delta)?;
        let row = self
            .rows
            .get_mut(&debtor)
            .ok_or(LedgerError::UnknownUser(debtor))?;

        if updated.is_zero() {
            row.remove(&creditor);
        } else {
            row.insert(creditor, updated);
        }
        Ok(())
    }

    /// What `debtor` owes `creditor`, zero if nothing is recorded.
    pub fn balance(&self, debtor: UserId, creditor: UserId) -> Result<Amount, LedgerError> {
        let row = self
            .rows
            .get(&debtor)
            .ok_or(LedgerError::UnknownUser(debtor))?;
        Ok(row.get(&creditor).copied().unwrap_or_default())
    }

    /// Copy of one debtor's row.
    pub fn user_balances(&self, debtor: UserId) -> Result<HashMap<UserId, Amount>, LedgerError> {
        self.rows
            .get(&debtor)
            .cloned()
            .ok_or(LedgerError::UnknownUser(debtor))
    }

    /// Copy of every non-empty row.
    pub fn balances(&self) -> HashMap<UserId, HashMap<UserId, Amount>> {
        self.rows
            .iter()
            .filter(|(_, row)| !row.is_empty())
            .map(|(debtor, row)| (*debtor, row.clone()))
            .collect()
    }

    /// Every `(debtor, creditor, amount)` entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (UserId, UserId, Amount)> + '_ {
        self.rows.iter().flat_map(|(debtor, row)| {
            row.iter()
                .map(move |(creditor, amount)| (*debtor, *creditor, *amount))
        })
    }

    /// Drop the `(debtor, creditor)` entry whatever its value.
    /// Returns whether an entry existed.
    pub fn clear_balance(&mut self, debtor: UserId, creditor: UserId) -> Result<bool, LedgerError> {
        let row = self
            .rows
            .get_mut(&debtor)
            .ok_or(LedgerError::UnknownUser(debtor))?;
        Ok(row.remove(&creditor).is_some())
    }
}
