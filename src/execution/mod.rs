//! Order execution: alert routing and fill-timeout supervision

pub mod router;
pub mod supervisor;

pub use router::{AlertOutcome, AlertRouter};
pub use supervisor::{supervise, FillOutcome, FillSupervisor};
