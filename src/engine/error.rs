//! Error types for expense processing.

use thiserror::Error;

use super::LedgerError;
use crate::Amount;
use crate::model::{TxId, UserId};
use crate::registry::RegistryError;
use crate::split::SplitError;

/// Top-level error returned by the [`Engine`](super::Engine) operations.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("{0}")]
    Split(#[from] SplitError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error(
        "settlement from {payer} to {payee} of {requested} exceeds the balance of {balance}"
    )]
    SettlementExceedsBalance {
        payer: UserId,
        payee: UserId,
        balance: Amount,
        requested: Amount,
    },

    #[error("amount {0} must be positive")]
    InvalidAmount(Amount),

    #[error("duplicate transaction id {0}")]
    DuplicateTxId(TxId),
}
