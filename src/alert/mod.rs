//! Inbound alert handling: typed payload, validation and deduplication

pub mod dedupe;
pub mod types;
pub mod validator;

pub use dedupe::DedupeGuard;
pub use types::{Alert, SizeRequest, LEGACY_EXCHANGE};
pub use validator::validate_alert;
