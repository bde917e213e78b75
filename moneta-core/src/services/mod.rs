//! Service layer - orchestration on top of the domain
//!
//! The registry owns the banks, the transfer coordinator moves money
//! between them, and the logging service records CLI operations.

pub mod logging;
pub mod registry;
pub mod transfer;

pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use registry::{BankRef, BankRegistry, SharedBank};
pub use transfer::{DelayProfile, TransferCoordinator, TransferReceipt};
