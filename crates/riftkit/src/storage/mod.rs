//! Local persistence.
//!
//! - **Snapshots**: whole-file JSON documents under the data directory
//!   (friend first-seen times, status history, mail account, seen ids)
//! - **Exports**: CSV/JSON files and console tables for tabular records

mod export;
mod snapshot;

pub use export::{
    CsvExporter, ExportFormat, JsonExporter, Tabular, export_to_path, format_table,
};
pub use snapshot::SnapshotStore;
