//! Position cache, refresh loop and CSV export

pub mod book;
pub mod exporter;
pub mod poller;

pub use book::PositionBook;
pub use exporter::{PositionExporter, CSV_HEADER};
pub use poller::{PositionPoller, RefreshReport};
