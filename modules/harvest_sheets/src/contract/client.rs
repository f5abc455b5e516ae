//! Client trait used by the UI layer and the CLI
//!
//! Every operation resolves its required settings and arguments before any
//! network traffic; a precondition failure never reaches the proxy.

use super::error::SheetsError;
use super::model::{
    ActionReply, AppendHarvestParams, AppendStorageParams, BulkUpdateParams, ChildrenParams,
    FindBinParams, HarvestLogQuery, HeadersParams, ItemKeyParams, ListTabsParams, PackingParams,
    RemovalReport, RemoveBinStorageParams, UpdateHarvestParams, UpdateItemParams,
    UpdatePackingParams,
};
use async_trait::async_trait;

/// Spreadsheet proxy API
#[async_trait]
pub trait SheetsApi: Send + Sync {
    // ===== Sheet metadata =====

    /// List the tab names of a spreadsheet (cached)
    async fn list_tabs(&self, params: ListTabsParams) -> Result<Vec<String>, SheetsError>;

    /// Read the header row of a sheet
    async fn get_headers(&self, params: HeadersParams) -> Result<Vec<String>, SheetsError>;

    // ===== Items =====

    /// Look up an item row by key (cached)
    async fn get_item(&self, params: ItemKeyParams) -> Result<ActionReply, SheetsError>;

    /// Patch an item row by key
    async fn update_item(&self, params: UpdateItemParams) -> Result<ActionReply, SheetsError>;

    /// Apply one patch to several item rows
    async fn bulk_update_items(
        &self,
        params: BulkUpdateParams,
    ) -> Result<ActionReply, SheetsError>;

    /// Look up an item row together with its harvest entries (cached)
    async fn get_item_and_harvest(
        &self,
        params: ItemKeyParams,
    ) -> Result<ActionReply, SheetsError>;

    // ===== Harvest log =====

    async fn append_harvest_log(
        &self,
        params: AppendHarvestParams,
    ) -> Result<ActionReply, SheetsError>;

    async fn get_harvest_log(&self, params: HarvestLogQuery) -> Result<ActionReply, SheetsError>;

    async fn update_harvest_log(
        &self,
        params: UpdateHarvestParams,
    ) -> Result<ActionReply, SheetsError>;

    // ===== Storage =====

    async fn append_storage(&self, params: AppendStorageParams)
        -> Result<ActionReply, SheetsError>;

    async fn get_existing_children(
        &self,
        params: ChildrenParams,
    ) -> Result<ActionReply, SheetsError>;

    async fn find_bin_for_bag(&self, params: FindBinParams) -> Result<ActionReply, SheetsError>;

    async fn remove_bin_storage(
        &self,
        params: RemoveBinStorageParams,
    ) -> Result<RemovalReport, SheetsError>;

    // ===== Packing =====

    /// Read a packing or unpacking record (cached per needs and label)
    async fn get_packing_record(&self, params: PackingParams)
        -> Result<ActionReply, SheetsError>;

    async fn update_packing_record(
        &self,
        params: UpdatePackingParams,
    ) -> Result<ActionReply, SheetsError>;
}
