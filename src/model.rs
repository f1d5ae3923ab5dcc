//! Core domain types for the expense ledger.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Amount;
use crate::split::Split;

/// User identifier.
pub type UserId = Uuid;

/// Group identifier.
pub type GroupId = Uuid;

/// Identifier shared by expenses and settlements, unique across both.
pub type TxId = Uuid;

/// A registered user. The name is only used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A named set of users. The creator joins on creation and can never leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    name: String,
    creator: UserId,
    /// Members in join order, creator first.
    members: Vec<UserId>,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>, creator: UserId) -> Self {
        Self {
            id,
            name: name.into(),
            creator,
            members: vec![creator],
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creator(&self) -> UserId {
        self.creator
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// Returns `false` if the user was already a member.
    pub fn add_member(&mut self, user: UserId) -> bool {
        if self.is_member(user) {
            return false;
        }
        self.members.push(user);
        true
    }

    /// Returns `false` if the user is the creator or not a member.
    pub fn remove_member(&mut self, user: UserId) -> bool {
        if user == self.creator {
            return false;
        }
        let before = self.members.len();
        self.members.retain(|member| *member != user);
        self.members.len() != before
    }
}

/// A paid expense and the shares it produced. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub id: TxId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    pub payer: UserId,
    pub split: Split,
    pub group: Option<GroupId>,
    /// Computed share per participant, in participant order.
    pub shares: Vec<(UserId, Amount)>,
}

/// A payment from `payer` to `payee` that reduces what `payer` owes. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRecord {
    pub id: TxId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    pub payer: UserId,
    pub payee: UserId,
}

/// An entry of the engine's append-only history.
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    Expense(ExpenseRecord),
    Settlement(SettlementRecord),
}

impl Transaction {
    pub fn id(&self) -> TxId {
        match self {
            Transaction::Expense(expense) => expense.id,
            Transaction::Settlement(settlement) => settlement.id,
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            Transaction::Expense(expense) => expense.amount,
            Transaction::Settlement(settlement) => settlement.amount,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Transaction::Expense(expense) => expense.created_at,
            Transaction::Settlement(settlement) => settlement.created_at,
        }
    }

    /// The user who paid.
    pub fn created_by(&self) -> UserId {
        match self {
            Transaction::Expense(expense) => expense.payer,
            Transaction::Settlement(settlement) => settlement.payer,
        }
    }
}

/// An operation representing the possible inputs of the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Register a user and give them an empty ledger row.
    RegisterUser { id: UserId, name: String },
    /// Create a group; the creator becomes its first member.
    CreateGroup {
        id: GroupId,
        name: String,
        creator: UserId,
    },
    /// Add an existing user to an existing group.
    AddMember { user: UserId, group: GroupId },
    /// Record an expense paid by `payer` and divided by `split`.
    Expense {
        id: TxId,
        payer: UserId,
        group: Option<GroupId>,
        split: Split,
    },
    /// Record a payment that reduces what `payer` owes `payee`.
    Settlement {
        id: TxId,
        amount: Amount,
        payer: UserId,
        payee: UserId,
    },
}
