pub mod account;
pub mod config;
pub mod money;
pub mod record;
pub mod statement;

pub use account::{Account, AccountKind};
pub use config::{Config, ConfigError, ReconcileConfig, TelegramConfig};
pub use money::Money;
pub use record::{
    Category, Department, FuturePrediction, LedgerTransaction, PaymentMode, UnknownLabel,
};
pub use statement::StatementEntry;
