//! Contract layer - public API of the harvest sheets client
//!
//! Transport-agnostic models, the error type and the client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::SheetsApi;
pub use error::SheetsError;
pub use model::{
    keys, ActionReply, AppendHarvestParams, AppendStorageParams, BulkUpdateParams,
    ChildrenParams, ExportFolder, Fields, FindBinParams, HarvestLogQuery, HarvestPhoto,
    HeadersParams, ItemKeyParams, ListTabsParams, Needs, PackingParams, RemovalReport,
    RemoveBinStorageParams, Settings, StorageMode, UpdateHarvestParams, UpdateItemParams,
    UpdatePackingParams,
};
