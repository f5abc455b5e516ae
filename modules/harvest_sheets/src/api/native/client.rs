//! Native client implementation - wraps the domain service for in-process calls

use crate::contract::{
    ActionReply, AppendHarvestParams, AppendStorageParams, BulkUpdateParams, ChildrenParams,
    FindBinParams, HarvestLogQuery, HeadersParams, ItemKeyParams, ListTabsParams, PackingParams,
    RemovalReport, RemoveBinStorageParams, SheetsApi, SheetsError, UpdateHarvestParams,
    UpdateItemParams, UpdatePackingParams,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client that calls the domain service directly
///
/// Consumers depend on `dyn SheetsApi` so that tests and hosts can swap in
/// their own implementation.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SheetsApi for NativeClient {
    async fn list_tabs(&self, params: ListTabsParams) -> Result<Vec<String>, SheetsError> {
        self.service.list_tabs(params).await
    }

    async fn get_headers(&self, params: HeadersParams) -> Result<Vec<String>, SheetsError> {
        self.service.get_headers(params).await
    }

    async fn get_item(&self, params: ItemKeyParams) -> Result<ActionReply, SheetsError> {
        self.service.get_item(params).await
    }

    async fn update_item(&self, params: UpdateItemParams) -> Result<ActionReply, SheetsError> {
        self.service.update_item(params).await
    }

    async fn bulk_update_items(
        &self,
        params: BulkUpdateParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.bulk_update_items(params).await
    }

    async fn get_item_and_harvest(
        &self,
        params: ItemKeyParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.get_item_and_harvest(params).await
    }

    async fn append_harvest_log(
        &self,
        params: AppendHarvestParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.append_harvest_log(params).await
    }

    async fn get_harvest_log(&self, params: HarvestLogQuery) -> Result<ActionReply, SheetsError> {
        self.service.get_harvest_log(params).await
    }

    async fn update_harvest_log(
        &self,
        params: UpdateHarvestParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.update_harvest_log(params).await
    }

    async fn append_storage(
        &self,
        params: AppendStorageParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.append_storage(params).await
    }

    async fn get_existing_children(
        &self,
        params: ChildrenParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.get_existing_children(params).await
    }

    async fn find_bin_for_bag(&self, params: FindBinParams) -> Result<ActionReply, SheetsError> {
        self.service.find_bin_for_bag(params).await
    }

    async fn remove_bin_storage(
        &self,
        params: RemoveBinStorageParams,
    ) -> Result<RemovalReport, SheetsError> {
        self.service.remove_bin_storage(params).await
    }

    async fn get_packing_record(
        &self,
        params: PackingParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.get_packing_record(params).await
    }

    async fn update_packing_record(
        &self,
        params: UpdatePackingParams,
    ) -> Result<ActionReply, SheetsError> {
        self.service.update_packing_record(params).await
    }
}
