pub mod logger;
pub mod reporter;

pub use logger::{Journal, Outcome, SyncLogEntry};
