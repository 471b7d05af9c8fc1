//! CSV export of the cached positions

use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::common::errors::Result;
use crate::common::types::{Exchange, Position};

/// Column order of every positions file
pub const CSV_HEADER: [&str; 14] = [
    "market",
    "status",
    "side",
    "size",
    "maxSize",
    "entryPrice",
    "exitPrice",
    "createdAt",
    "createdAtHeight",
    "closedAt",
    "sumOpen",
    "sumClose",
    "netFunding",
    "subaccountNumber",
];

/// Writes `positions<Exchange>.csv` files into one directory
#[derive(Debug, Clone)]
pub struct PositionExporter {
    dir: PathBuf,
}

impl PositionExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, exchange: Exchange) -> PathBuf {
        self.dir
            .join(format!("positions{}.csv", exchange.export_name()))
    }

    /// Overwrite the exchange's file with the given positions
    ///
    /// Blocking; the poller runs it through `spawn_blocking`.
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be written
    pub fn export(&self, exchange: Exchange, positions: &[Position]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(exchange);

        let mut writer = Writer::from_writer(File::create(&path)?);
        writer.write_record(CSV_HEADER)?;
        for position in positions {
            writer.write_record(row(position))?;
        }
        writer.flush()?;

        debug!(
            "Exported {} {} positions to {}",
            positions.len(),
            exchange,
            path.display()
        );
        Ok(path)
    }
}

fn row(position: &Position) -> [String; 14] {
    let details = &position.details;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    [
        position.market.clone(),
        details
            .status
            .clone()
            .unwrap_or_else(|| "OPEN".to_string()),
        position.side.to_string().to_uppercase(),
        position.size.to_string(),
        text(&details.max_size),
        position.entry_price.to_string(),
        text(&details.exit_price),
        text(&details.created_at),
        text(&details.created_at_height),
        text(&details.closed_at),
        text(&details.sum_open),
        text(&details.sum_close),
        text(&details.net_funding),
        details
            .subaccount_number
            .map(|n| n.to_string())
            .unwrap_or_default(),
    ]
}
