//! Harvest Sheets
//!
//! Settings store and spreadsheet proxy client for inventory and harvest
//! tracking. Spreadsheet rows are read and written through a single HTTP
//! action endpoint; short-lived caches absorb repeated scans of the same
//! item.

// Public exports
pub mod contract;
pub use contract::{
    client::SheetsApi, error::SheetsError, ActionReply, HarvestPhoto, Needs, RemovalReport,
    Settings, StorageMode,
};

pub mod module;
pub use module::HarvestSheetsModule;

pub mod config;
pub use config::Config;

pub mod api;
pub mod domain;
pub mod infra;
