pub mod amount;
pub mod csv;
pub mod engine;
pub mod model;
pub mod registry;
pub mod split;

pub use amount::Amount;
pub use engine::{
    BalanceLedger, Engine, EngineConfig, EngineError, LedgerError, SelfSharePolicy,
};
pub use model::{
    ExpenseRecord, Group, GroupId, Operation, SettlementRecord, Transaction, TxId, User, UserId,
};
pub use registry::{GroupRegistry, RegistryError, UserRegistry};
pub use split::{Split, SplitError, SplitKind};
