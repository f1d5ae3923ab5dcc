//! Expense processing engine.
//!
//! The engine turns expenses into directed debts on a [`BalanceLedger`] and
//! lets settlements pay those debts down. It owns its collaborators (user and
//! group registries, ledger) and keeps an append-only history of every
//! recorded expense and settlement.
//! Also supports async stream of operations.

use std::collections::HashSet;

use chrono::Utc;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::model::{
    ExpenseRecord, Group, GroupId, Operation, SettlementRecord, Transaction, TxId, User, UserId,
};
use crate::registry::{GroupRegistry, UserRegistry};
use crate::split::Split;

mod config;
pub use config::{EngineConfig, SelfSharePolicy};

mod ledger;
pub use ledger::{BalanceLedger, LedgerError};

mod error;
pub use error::EngineError;

/// The expense processing engine.
pub struct Engine {
    config: EngineConfig,
    users: UserRegistry,
    groups: GroupRegistry,
    ledger: BalanceLedger,
    /// History in the order operations were recorded
    transactions: Vec<Transaction>,
    /// Track expense and settlement ids for duplicate checking
    tx_ids: HashSet<TxId>,
}

/// Public API
impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_parts(
            config,
            UserRegistry::new(),
            GroupRegistry::new(),
            BalanceLedger::new(),
        )
    }

    /// Build an engine around existing collaborators.
    /// Every registered user gets a ledger row if they lack one.
    pub fn with_parts(
        config: EngineConfig,
        users: UserRegistry,
        groups: GroupRegistry,
        mut ledger: BalanceLedger,
    ) -> Self {
        for user in users.iter() {
            ledger.initialize_user(user.id);
        }
        Self {
            config,
            users,
            groups,
            ledger,
            transactions: Vec::new(),
            tx_ids: HashSet::new(),
        }
    }

    /// Run the engine with the given operation stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = Operation> + Unpin) {
        while let Some(op) = stream.next().await {
            // a failed operation should not stop the engine, it is already logged by `apply`
            let _ = self.apply(op);
        }
    }

    /// Apply a single operation on top of the current engine state
    pub fn apply(&mut self, op: Operation) -> Result<(), EngineError> {
        match op {
            Operation::RegisterUser { id, name } => {
                let result = self.register_user(id, name);
                Self::log_result("user", id, None, &result);
                result?;
            }
            Operation::CreateGroup { id, name, creator } => {
                let result = self.create_group(id, name, creator);
                Self::log_result("group", id, None, &result);
                result?;
            }
            Operation::AddMember { user, group } => {
                let result = self.add_member(user, group);
                Self::log_result("member", user, None, &result);
                result?;
            }
            Operation::Expense {
                id,
                payer,
                group,
                split,
            } => {
                self.add_expense(id, payer, group, split)?;
            }
            Operation::Settlement {
                id,
                amount,
                payer,
                payee,
            } => {
                self.add_settlement(id, amount, payer, payee)?;
            }
        }
        Ok(())
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// Every recorded expense and settlement, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: TxId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id() == id)
    }

    /// What `debtor` currently owes `creditor`.
    pub fn balance(&self, debtor: UserId, creditor: UserId) -> Result<Amount, EngineError> {
        Ok(self.ledger.balance(debtor, creditor)?)
    }

    /// Register a user and give them an empty ledger row.
    pub fn register_user(
        &mut self,
        id: UserId,
        name: impl Into<String>,
    ) -> Result<User, EngineError> {
        let user = self.users.create(id, name)?;
        self.ledger.initialize_user(id);
        Ok(user)
    }

    pub fn create_group(
        &mut self,
        id: GroupId,
        name: impl Into<String>,
        creator: UserId,
    ) -> Result<Group, EngineError> {
        self.users.get(creator)?;
        Ok(self.groups.create(id, name, creator)?)
    }

    pub fn add_member(&mut self, user: UserId, group: GroupId) -> Result<bool, EngineError> {
        self.users.get(user)?;
        Ok(self.groups.add_member(user, group)?)
    }

    pub fn remove_member(&mut self, user: UserId, group: GroupId) -> Result<bool, EngineError> {
        self.users.get(user)?;
        Ok(self.groups.remove_member(user, group)?)
    }

    /// Members of a group in join order.
    pub fn members(&self, group: GroupId) -> Result<Vec<User>, EngineError> {
        let mut members = Vec::new();
        for id in self.groups.members(group)? {
            members.push(self.users.get(id)?.clone());
        }
        Ok(members)
    }

    /// Record an expense of `amount` paid by `payer`, divided evenly.
    ///
    /// With an empty `participants` list and a `group`, the group members share the cost.
    pub fn add_equal_split(
        &mut self,
        id: TxId,
        amount: Amount,
        payer: UserId,
        group: Option<GroupId>,
        participants: &[UserId],
    ) -> Result<ExpenseRecord, EngineError> {
        self.add_expense(id, payer, group, Split::equal(amount, participants.to_vec()))
    }

    /// Record an expense of `amount` paid by `payer`, with an explicit amount per participant.
    pub fn add_exact_split(
        &mut self,
        id: TxId,
        amount: Amount,
        payer: UserId,
        group: Option<GroupId>,
        amounts: Vec<(UserId, Amount)>,
    ) -> Result<ExpenseRecord, EngineError> {
        self.add_expense(id, payer, group, Split::exact(amount, amounts))
    }

    /// Record an expense paid by `payer` and divided by `split`.
    pub fn add_expense(
        &mut self,
        id: TxId,
        payer: UserId,
        group: Option<GroupId>,
        split: Split,
    ) -> Result<ExpenseRecord, EngineError> {
        let amount = split.total();
        let result = self.apply_expense(id, payer, group, split);
        Self::log_result("expense", id, Some(amount), &result);
        result
    }

    /// Record a payment of `amount` from `payer` to `payee`, reducing what `payer` owes.
    pub fn add_settlement(
        &mut self,
        id: TxId,
        amount: Amount,
        payer: UserId,
        payee: UserId,
    ) -> Result<SettlementRecord, EngineError> {
        let result = self.apply_settlement(id, amount, payer, payee);
        Self::log_result("settlement", id, Some(amount), &result);
        result
    }
}

/// Private API
impl Engine {
    /// Small helper to log operation results
    fn log_result<T, E: std::fmt::Display>(
        op: &str,
        id: uuid::Uuid,
        amount: Option<Amount>,
        result: &Result<T, E>,
    ) {
        match (result, amount) {
            (Ok(_), Some(amt)) => {
                info!(id = %id, amount = %amt, "{op} applied");
            }
            (Ok(_), None) => {
                info!(id = %id, "{op} applied");
            }
            (Err(e), Some(amt)) => {
                info!(id = %id, amount = %amt, reason = %e, "{op} skipped");
            }
            (Err(e), None) => {
                info!(id = %id, reason = %e, "{op} skipped");
            }
        }
    }

    fn ensure_unique(&self, id: TxId) -> Result<(), EngineError> {
        if self.tx_ids.contains(&id) {
            return Err(EngineError::DuplicateTxId(id));
        }
        Ok(())
    }

    /// An equal split without participants falls back to the group members.
    fn resolve_participants(
        &self,
        group: Option<GroupId>,
        split: Split,
    ) -> Result<Split, EngineError> {
        let Some(group) = group else {
            return Ok(split);
        };
        let group = self.groups.get(group)?;
        match split {
            Split::Equal {
                total,
                participants,
            } if participants.is_empty() => Ok(Split::equal(total, group.members().to_vec())),
            split => Ok(split),
        }
    }

    /// Apply an expense:
    /// - Ensure the id is unique and every user and the group exist
    /// - Compute all shares before touching the ledger
    /// - Post each share as a debt from the participant to the payer
    /// - Append the record to the history
    fn apply_expense(
        &mut self,
        id: TxId,
        payer: UserId,
        group: Option<GroupId>,
        split: Split,
    ) -> Result<ExpenseRecord, EngineError> {
        self.ensure_unique(id)?;
        self.users.get(payer)?;

        let split = self.resolve_participants(group, split)?;
        for participant in split.participants() {
            self.users.get(participant)?;
        }

        let shares = split.calculate_shares_within(self.config.exact_tolerance)?;

        let post_self_share = self.config.self_share == SelfSharePolicy::Post;
        let postings: Vec<(UserId, Amount)> = shares
            .iter()
            .filter(|(debtor, _)| post_self_share || *debtor != payer)
            .copied()
            .collect();

        // All or nothing: every posting must apply cleanly before the first one lands
        for (debtor, share) in &postings {
            self.ledger.check_update(*debtor, payer, *share)?;
        }

        for (debtor, share) in postings {
            if debtor == payer {
                warn!(id = %id, payer = %payer, share = %share, "posting payer's own share as a self debt");
            }
            self.ledger.update_balance(debtor, payer, share)?;
        }

        let record = ExpenseRecord {
            id,
            amount: split.total(),
            created_at: Utc::now(),
            payer,
            split,
            group,
            shares,
        };
        self.tx_ids.insert(id);
        self.transactions.push(Transaction::Expense(record.clone()));

        Ok(record)
    }

    /// Apply a settlement:
    /// - Ensure the id is unique, the amount positive and both users exist
    /// - Ensure the amount does not exceed what `payer` owes `payee`
    /// - Decrease the debt by the amount
    /// - Append the record to the history
    fn apply_settlement(
        &mut self,
        id: TxId,
        amount: Amount,
        payer: UserId,
        payee: UserId,
    ) -> Result<SettlementRecord, EngineError> {
        self.ensure_unique(id)?;
        if amount <= Amount::ZERO {
            return Err(EngineError::InvalidAmount(amount));
        }
        self.users.get(payer)?;
        self.users.get(payee)?;

        let balance = self.ledger.balance(payer, payee)?;
        if amount > balance {
            return Err(EngineError::SettlementExceedsBalance {
                payer,
                payee,
                balance,
                requested: amount,
            });
        }

        self.ledger.update_balance(payer, payee, -amount)?;

        let record = SettlementRecord {
            id,
            amount,
            created_at: Utc::now(),
            payer,
            payee,
        };
        self.tx_ids.insert(id);
        self.transactions.push(Transaction::Settlement(record.clone()));

        Ok(record)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
