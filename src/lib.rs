pub mod config;
pub mod error;
pub mod event_ledger;

pub use config::{Config, LogFormat};
pub use error::{ApprovalError, LedgerError, LedgerResult, ValidationError};
