//! Contract models for the harvest sheets client
//!
//! Settings are kept as an open JSON object so that unknown and legacy fields
//! survive every round trip; typed accessors resolve the fields the client
//! understands.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Field patch or row content, keyed by spreadsheet column header
pub type Fields = Map<String, Value>;

/// Persisted setting field names
pub mod keys {
    pub const PROXY_URL: &str = "proxyUrl";

    pub const ITEMS_SPREADSHEET_ID: &str = "itemsSpreadsheetId";
    pub const ITEMS_SHEET_NAME: &str = "itemsSheetName";
    pub const ITEMS_KEY_COLUMN: &str = "itemsKeyColumn";
    /// Legacy name of `itemsKeyColumn`
    pub const LEGACY_KEY_COLUMN: &str = "keyColumn";

    pub const HARVEST_SPREADSHEET_ID: &str = "harvestSpreadsheetId";
    pub const HARVEST_SHEET_NAME: &str = "harvestSheetName";

    pub const STORAGE_SPREADSHEET_ID: &str = "storageSpreadsheetId";
    pub const BAG_STORAGE_SHEET_NAME: &str = "bagStorageSheetName";
    pub const BIN_STORAGE_SHEET_NAME: &str = "binStorageSheetName";

    pub const PACKING_SPREADSHEET_ID: &str = "packingSpreadsheetId";
    /// Legacy names of `packingSpreadsheetId`, in precedence order
    pub const LEGACY_PACKING_SPREADSHEET_IDS: [&str; 2] = ["packingSheetId", "unpackingSpreadsheetId"];
    pub const PACKING_OR_SHEET_NAME: &str = "packingOrSheetName";
    pub const PACKING_GRAFTING_SHEET_NAME: &str = "packingGraftingSheetName";

    pub const LANGUAGE: &str = "language";
    pub const EXPORT_FOLDER: &str = "exportFolder";
}

/// Persisted application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Shallow merge: every key of `partial` replaces the existing value.
    /// Nested objects are replaced wholesale.
    pub fn merge(&mut self, partial: &Settings) {
        for (key, value) in &partial.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Trimmed string value of `key`, `None` when absent, not a string, or blank
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First non-blank value among `names`
    pub fn first_text(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.text(name))
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.text(keys::PROXY_URL)
    }

    /// Items key column; the canonical name wins over the legacy one
    pub fn items_key_column(&self) -> Option<&str> {
        self.first_text(&[keys::ITEMS_KEY_COLUMN, keys::LEGACY_KEY_COLUMN])
    }

    pub fn packing_spreadsheet_id(&self) -> Option<&str> {
        let [first, second] = keys::LEGACY_PACKING_SPREADSHEET_IDS;
        self.first_text(&[keys::PACKING_SPREADSHEET_ID, first, second])
    }

    pub fn packing_sheet_name(&self, needs: Needs) -> Option<&str> {
        match needs {
            Needs::Or => self.text(keys::PACKING_OR_SHEET_NAME),
            Needs::Grafting => self.text(keys::PACKING_GRAFTING_SHEET_NAME),
        }
    }

    pub fn storage_sheet_name(&self, mode: StorageMode) -> Option<&str> {
        match mode {
            StorageMode::Bag => self.text(keys::BAG_STORAGE_SHEET_NAME),
            StorageMode::Bin => self.text(keys::BIN_STORAGE_SHEET_NAME),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.text(keys::LANGUAGE)
    }

    /// Previously chosen export directory, if the stored value is well formed
    pub fn export_folder(&self) -> Option<ExportFolder> {
        self.0
            .get(keys::EXPORT_FOLDER)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

impl From<Map<String, Value>> for Settings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Opaque handle to a native export directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFolder {
    pub id: String,
    pub name: String,
}

/// Packing sub-sheet selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Needs {
    Or,
    Grafting,
}

impl Needs {
    pub fn as_str(&self) -> &'static str {
        match self {
            Needs::Or => "or",
            Needs::Grafting => "grafting",
        }
    }
}

impl fmt::Display for Needs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Needs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "or" => Ok(Needs::Or),
            "grafting" => Ok(Needs::Grafting),
            other => Err(format!("unknown needs '{}', expected 'or' or 'grafting'", other)),
        }
    }
}

/// Storage sheet selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Items stored in a bag
    Bag,
    /// Bags stored in a bin
    Bin,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMode::Bag => "bag",
            StorageMode::Bin => "bin",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful proxy response with the `ok` flag stripped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionReply(Map<String, Value>);

impl ActionReply {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Decode the reply into a typed view
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

/// Outcome of removing bags from bin storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalReport {
    #[serde(default)]
    pub removed: u64,
    #[serde(default)]
    pub not_found: Vec<String>,
}

/// One captured harvest photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestPhoto {
    pub data_url: String,
    /// Capture time, epoch milliseconds
    pub ts: i64,
}

// ===== Operation parameters =====

/// List the tabs of a spreadsheet; defaults to the items spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTabsParams {
    pub spreadsheet_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadersParams {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// Address a single item by its key column value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemKeyParams {
    pub key: String,
}

impl ItemKeyParams {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateItemParams {
    pub key: String,
    pub patch: Fields,
}

/// Apply one patch to every listed key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkUpdateParams {
    pub keys: Vec<String>,
    pub patch: Fields,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppendHarvestParams {
    pub row: Fields,
}

/// Harvest log query; `None` returns the whole log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestLogQuery {
    pub key: Option<String>,
}

/// Patch one harvest log row, addressed by sheet row index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateHarvestParams {
    pub row_index: u64,
    pub patch: Fields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendStorageParams {
    pub mode: StorageMode,
    pub parent: String,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildrenParams {
    pub mode: StorageMode,
    pub parent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindBinParams {
    pub bag_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveBinStorageParams {
    pub bag_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackingParams {
    pub needs: Needs,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePackingParams {
    pub needs: Needs,
    pub label: String,
    pub patch: Fields,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_ignores_blank_and_non_strings() {
        let settings = Settings::new()
            .with("a", "  ")
            .with("b", 42)
            .with("c", " value ");
        assert_eq!(settings.text("a"), None);
        assert_eq!(settings.text("b"), None);
        assert_eq!(settings.text("c"), Some("value"));
        assert_eq!(settings.text("missing"), None);
    }

    #[test]
    fn test_key_column_prefers_canonical_name() {
        let legacy_only = Settings::new().with(keys::LEGACY_KEY_COLUMN, "Code");
        assert_eq!(legacy_only.items_key_column(), Some("Code"));

        let both = legacy_only
            .clone()
            .with(keys::ITEMS_KEY_COLUMN, "Variety ID");
        assert_eq!(both.items_key_column(), Some("Variety ID"));

        let blank_canonical = legacy_only.with(keys::ITEMS_KEY_COLUMN, "");
        assert_eq!(blank_canonical.items_key_column(), Some("Code"));
    }

    #[test]
    fn test_packing_spreadsheet_aliases() {
        let settings = Settings::new().with("unpackingSpreadsheetId", "u-1");
        assert_eq!(settings.packing_spreadsheet_id(), Some("u-1"));

        let settings = settings.with("packingSheetId", "p-1");
        assert_eq!(settings.packing_spreadsheet_id(), Some("p-1"));

        let settings = settings.with(keys::PACKING_SPREADSHEET_ID, "canon");
        assert_eq!(settings.packing_spreadsheet_id(), Some("canon"));
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut base = Settings::new()
            .with(keys::EXPORT_FOLDER, json!({"id": "1", "name": "Old"}))
            .with(keys::LANGUAGE, "en");
        let partial = Settings::new().with(keys::EXPORT_FOLDER, json!({"id": "2"}));
        base.merge(&partial);

        assert_eq!(base.get(keys::EXPORT_FOLDER), Some(&json!({"id": "2"})));
        assert_eq!(base.language(), Some("en"));
        // replaced object lost its name, so the typed view rejects it
        assert_eq!(base.export_folder(), None);
    }

    #[test]
    fn test_needs_parsing() {
        assert_eq!("OR".parse::<Needs>(), Ok(Needs::Or));
        assert_eq!(" grafting ".parse::<Needs>(), Ok(Needs::Grafting));
        assert!("both".parse::<Needs>().is_err());
        assert_eq!(Needs::Grafting.to_string(), "grafting");
    }

    #[test]
    fn test_removal_report_decoding() {
        let reply = ActionReply::from_map(
            json!({"removed": 2, "notFound": ["B9"]})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        );
        let report: RemovalReport = reply.decode().unwrap();
        assert_eq!(report.removed, 2);
        assert_eq!(report.not_found, vec!["B9".to_string()]);
    }
}
