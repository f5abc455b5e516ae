//! Domain service - request assembly, dispatch and read caching

use super::cache::TtlCache;
use super::envelope::{actions, decode_envelope, ActionRequest};
use super::repository::ActionTransport;
use super::resolve::{self, ItemsTarget, SheetTarget};
use super::settings::SettingsStore;
use crate::config::{CacheConfig, TimeoutConfig};
use crate::contract::{
    keys, ActionReply, AppendHarvestParams, AppendStorageParams, BulkUpdateParams,
    ChildrenParams, Fields, FindBinParams, HarvestLogQuery, HeadersParams, ItemKeyParams,
    ListTabsParams, Needs, PackingParams, RemovalReport, RemoveBinStorageParams, Settings,
    SheetsError, StorageMode, UpdateHarvestParams, UpdateItemParams, UpdatePackingParams,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Domain service for the spreadsheet proxy
pub struct Service {
    settings: Arc<SettingsStore>,
    transport: Arc<dyn ActionTransport>,
    timeouts: TimeoutConfig,
    invalidate_on_write: bool,
    tabs_cache: TtlCache<Vec<String>>,
    items_cache: TtlCache<ActionReply>,
    harvest_cache: TtlCache<ActionReply>,
    packing_cache: TtlCache<ActionReply>,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        settings: Arc<SettingsStore>,
        transport: Arc<dyn ActionTransport>,
        timeouts: TimeoutConfig,
        cache: CacheConfig,
    ) -> Self {
        Self {
            settings,
            transport,
            timeouts,
            invalidate_on_write: cache.invalidate_on_write,
            tabs_cache: TtlCache::new("tabs", cache.tabs_ttl),
            items_cache: TtlCache::new("items", cache.items_ttl),
            harvest_cache: TtlCache::new("harvest", cache.harvest_ttl),
            packing_cache: TtlCache::new("packing", cache.packing_ttl),
        }
    }

    /// Drop every cached read
    pub fn clear_caches(&self) {
        self.tabs_cache.clear();
        self.items_cache.clear();
        self.harvest_cache.clear();
        self.packing_cache.clear();
    }

    // ===== Sheet metadata =====

    pub async fn list_tabs(&self, params: ListTabsParams) -> Result<Vec<String>, SheetsError> {
        let settings = self.current_settings();
        let proxy_url = resolve::proxy_url(&settings)?;
        let spreadsheet_id = params
            .spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| settings.text(keys::ITEMS_SPREADSHEET_ID))
            .ok_or(SheetsError::NotConfigured {
                setting: "Spreadsheet ID",
            })?
            .to_string();

        if let Some(tabs) = self.cached(&self.tabs_cache, &spreadsheet_id) {
            return Ok(tabs);
        }

        let request =
            ActionRequest::new(actions::LIST_TABS).field("spreadsheetId", spreadsheet_id.as_str());
        let reply = self.dispatch(&proxy_url, request, self.timeouts.read).await?;
        let tabs = string_list(&reply, "tabs")?;

        self.tabs_cache.insert(spreadsheet_id, tabs.clone());
        Ok(tabs)
    }

    pub async fn get_headers(&self, params: HeadersParams) -> Result<Vec<String>, SheetsError> {
        let settings = self.current_settings();
        let proxy_url = resolve::proxy_url(&settings)?;
        let spreadsheet_id = resolve::required_arg(&params.spreadsheet_id, "spreadsheetId")?;
        let sheet_name = resolve::required_arg(&params.sheet_name, "sheetName")?;

        let request = ActionRequest::new(actions::GET_HEADERS)
            .field("spreadsheetId", spreadsheet_id)
            .field("sheetName", sheet_name);
        let reply = self.dispatch(&proxy_url, request, self.timeouts.read).await?;
        string_list(&reply, "headers")
    }

    // ===== Items =====

    pub async fn get_item(&self, params: ItemKeyParams) -> Result<ActionReply, SheetsError> {
        let target = resolve::items(&self.current_settings())?;
        let key = resolve::required_arg(&params.key, "key")?;

        if let Some(reply) = self.cached(&self.items_cache, key) {
            return Ok(reply);
        }

        let request = items_request(actions::GET_ITEM, &target).field("key", key);
        let reply = self
            .dispatch(&target.sheet.proxy_url, request, self.timeouts.read)
            .await?;

        self.items_cache.insert(key, reply.clone());
        Ok(reply)
    }

    pub async fn update_item(&self, params: UpdateItemParams) -> Result<ActionReply, SheetsError> {
        let target = resolve::items(&self.current_settings())?;
        let key = resolve::required_arg(&params.key, "key")?;
        let patch = required_fields(params.patch, "patch")?;

        let request = items_request(actions::UPDATE_ITEM, &target)
            .field("key", key)
            .field("patch", patch);
        let reply = self
            .dispatch(&target.sheet.proxy_url, request, self.timeouts.write)
            .await?;

        self.invalidate_item(key);
        Ok(reply)
    }

    pub async fn bulk_update_items(
        &self,
        params: BulkUpdateParams,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::items(&self.current_settings())?;
        let keys = resolve::required_list(&params.keys, "keys")?;
        let patch = required_fields(params.patch, "patch")?;

        let request = items_request(actions::BULK_UPDATE_ITEMS, &target)
            .field("keys", keys.clone())
            .field("patch", patch);
        let reply = self
            .dispatch(&target.sheet.proxy_url, request, self.timeouts.bulk)
            .await?;

        for key in keys.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
            self.invalidate_item(key);
        }
        Ok(reply)
    }

    /// Item row and its harvest entries in one round trip
    pub async fn get_item_and_harvest(
        &self,
        params: ItemKeyParams,
    ) -> Result<ActionReply, SheetsError> {
        let settings = self.current_settings();
        let items = resolve::items(&settings)?;
        let harvest = resolve::harvest(&settings)?;
        let key = resolve::required_arg(&params.key, "key")?;

        if let Some(reply) = self.cached(&self.harvest_cache, key) {
            return Ok(reply);
        }

        let request = items_request(actions::GET_ITEM_AND_HARVEST, &items)
            .field("key", key)
            .field("harvestSpreadsheetId", harvest.spreadsheet_id.as_str())
            .field("harvestSheetName", harvest.sheet_name.as_str());
        let reply = self
            .dispatch(&items.sheet.proxy_url, request, self.timeouts.combined)
            .await?;

        self.harvest_cache.insert(key, reply.clone());
        Ok(reply)
    }

    // ===== Harvest log =====

    pub async fn append_harvest_log(
        &self,
        params: AppendHarvestParams,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::harvest(&self.current_settings())?;
        let row = required_fields(params.row, "row")?;

        let request = sheet_request(actions::APPEND_HARVEST_LOG, &target).field("row", row);
        let reply = self
            .dispatch(&target.proxy_url, request, self.timeouts.write)
            .await?;

        self.invalidate_harvest();
        Ok(reply)
    }

    pub async fn get_harvest_log(
        &self,
        params: HarvestLogQuery,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::harvest(&self.current_settings())?;

        let mut request = sheet_request(actions::GET_HARVEST_LOG, &target);
        if let Some(key) = params.key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            request = request.field("key", key);
        }
        self.dispatch(&target.proxy_url, request, self.timeouts.read)
            .await
    }

    pub async fn update_harvest_log(
        &self,
        params: UpdateHarvestParams,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::harvest(&self.current_settings())?;
        if params.row_index == 0 {
            return Err(SheetsError::MissingArgument {
                argument: "rowIndex",
            });
        }
        let patch = required_fields(params.patch, "patch")?;

        let request = sheet_request(actions::UPDATE_HARVEST_LOG, &target)
            .field("rowIndex", params.row_index)
            .field("patch", patch);
        let reply = self
            .dispatch(&target.proxy_url, request, self.timeouts.write)
            .await?;

        self.invalidate_harvest();
        Ok(reply)
    }

    // ===== Storage =====

    pub async fn append_storage(
        &self,
        params: AppendStorageParams,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::storage(&self.current_settings(), params.mode)?;
        let parent = resolve::required_arg(&params.parent, "parent")?;
        let children = resolve::required_list(&params.children, "children")?;

        let request = sheet_request(actions::APPEND_STORAGE, &target)
            .field("mode", params.mode.as_str())
            .field("parent", parent)
            .field("children", children);
        self.dispatch(&target.proxy_url, request, self.timeouts.write)
            .await
    }

    pub async fn get_existing_children(
        &self,
        params: ChildrenParams,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::storage(&self.current_settings(), params.mode)?;
        let parent = resolve::required_arg(&params.parent, "parent")?;

        let request = sheet_request(actions::GET_EXISTING_CHILDREN, &target)
            .field("mode", params.mode.as_str())
            .field("parent", parent);
        self.dispatch(&target.proxy_url, request, self.timeouts.read)
            .await
    }

    pub async fn find_bin_for_bag(&self, params: FindBinParams) -> Result<ActionReply, SheetsError> {
        let target = resolve::storage(&self.current_settings(), StorageMode::Bin)?;
        let bag_label = resolve::required_arg(&params.bag_label, "bagLabel")?;

        let request = sheet_request(actions::FIND_BIN_FOR_BAG, &target).field("bagLabel", bag_label);
        self.dispatch(&target.proxy_url, request, self.timeouts.read)
            .await
    }

    pub async fn remove_bin_storage(
        &self,
        params: RemoveBinStorageParams,
    ) -> Result<RemovalReport, SheetsError> {
        let target = resolve::storage(&self.current_settings(), StorageMode::Bin)?;
        let bag_labels = resolve::required_list(&params.bag_labels, "bagLabels")?;

        let request =
            sheet_request(actions::REMOVE_BIN_STORAGE, &target).field("bagLabels", bag_labels);
        let reply = self
            .dispatch(&target.proxy_url, request, self.timeouts.write)
            .await?;

        reply
            .decode()
            .map_err(|e| SheetsError::InvalidResponse(e.to_string()))
    }

    // ===== Packing =====

    pub async fn get_packing_record(
        &self,
        params: PackingParams,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::packing(&self.current_settings(), params.needs)?;
        let label = resolve::required_arg(&params.label, "label")?;
        let cache_key = packing_cache_key(params.needs, label);

        if let Some(reply) = self.cached(&self.packing_cache, &cache_key) {
            return Ok(reply);
        }

        let request = sheet_request(actions::GET_PACKING_RECORD, &target)
            .field("needs", params.needs.as_str())
            .field("label", label);
        let reply = self
            .dispatch(&target.proxy_url, request, self.timeouts.read)
            .await?;

        self.packing_cache.insert(cache_key, reply.clone());
        Ok(reply)
    }

    pub async fn update_packing_record(
        &self,
        params: UpdatePackingParams,
    ) -> Result<ActionReply, SheetsError> {
        let target = resolve::packing(&self.current_settings(), params.needs)?;
        let label = resolve::required_arg(&params.label, "label")?;
        let patch = required_fields(params.patch, "patch")?;

        let request = sheet_request(actions::UPDATE_PACKING_RECORD, &target)
            .field("needs", params.needs.as_str())
            .field("label", label)
            .field("patch", patch);
        let reply = self
            .dispatch(&target.proxy_url, request, self.timeouts.write)
            .await?;

        if self.invalidate_on_write {
            self.packing_cache
                .invalidate(&packing_cache_key(params.needs, label));
        }
        Ok(reply)
    }

    // ===== Helpers =====

    fn current_settings(&self) -> Settings {
        self.settings.load_or_default()
    }

    fn cached<V: Clone>(&self, cache: &TtlCache<V>, key: &str) -> Option<V> {
        let hit = cache.get(key);
        tracing::debug!(
            cache = cache.name(),
            key,
            hit = hit.is_some(),
            "cache lookup"
        );
        hit
    }

    fn invalidate_item(&self, key: &str) {
        if self.invalidate_on_write {
            self.items_cache.invalidate(key);
            self.harvest_cache.invalidate(key);
        }
    }

    fn invalidate_harvest(&self) {
        if self.invalidate_on_write {
            self.harvest_cache.clear();
        }
    }

    /// Send one envelope; the timeout covers the whole round trip
    async fn dispatch(
        &self,
        proxy_url: &str,
        request: ActionRequest,
        timeout: Duration,
    ) -> Result<ActionReply, SheetsError> {
        tracing::debug!(action = %request.action, ?timeout, "dispatching action");

        let body = tokio::time::timeout(timeout, self.transport.send(proxy_url, &request))
            .await
            .map_err(|_| {
                tracing::warn!(action = %request.action, "action timed out");
                SheetsError::Timeout {
                    action: request.action.clone(),
                    after: timeout,
                }
            })??;

        decode_envelope(body).inspect_err(|e| {
            tracing::debug!(action = %request.action, error = %e, "action rejected");
        })
    }
}

fn sheet_request(action: &str, target: &SheetTarget) -> ActionRequest {
    ActionRequest::new(action)
        .field("spreadsheetId", target.spreadsheet_id.as_str())
        .field("sheetName", target.sheet_name.as_str())
}

fn items_request(action: &str, target: &ItemsTarget) -> ActionRequest {
    sheet_request(action, &target.sheet).field("keyColumn", target.key_column.as_str())
}

fn packing_cache_key(needs: Needs, label: &str) -> String {
    format!("{}::{}", needs, label)
}

fn required_fields(fields: Fields, argument: &'static str) -> Result<Fields, SheetsError> {
    if fields.is_empty() {
        return Err(SheetsError::MissingArgument { argument });
    }
    Ok(fields)
}

/// String array field of a reply; non-string cells are rendered as JSON text
fn string_list(reply: &ActionReply, field: &str) -> Result<Vec<String>, SheetsError> {
    let values = reply
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| SheetsError::InvalidResponse(format!("missing '{}' list", field)))?;

    Ok(values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}
