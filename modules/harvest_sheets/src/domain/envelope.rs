//! Action envelope: `{action, payload}` out, `{ok, ...}` back

use crate::contract::{ActionReply, Fields, SheetsError};
use serde::Serialize;
use serde_json::Value;

/// Remote action names understood by the proxy
pub mod actions {
    pub const LIST_TABS: &str = "listTabs";
    pub const GET_HEADERS: &str = "getHeaders";
    pub const GET_ITEM: &str = "getItemByKey";
    pub const UPDATE_ITEM: &str = "updateItemByKey";
    pub const BULK_UPDATE_ITEMS: &str = "bulkUpdateByKeys";
    pub const GET_ITEM_AND_HARVEST: &str = "getItemAndHarvestByKey";
    pub const APPEND_HARVEST_LOG: &str = "appendHarvestLog";
    pub const GET_HARVEST_LOG: &str = "getHarvestLog";
    pub const UPDATE_HARVEST_LOG: &str = "updateHarvestLogRow";
    pub const APPEND_STORAGE: &str = "appendStorage";
    pub const GET_EXISTING_CHILDREN: &str = "getExistingChildren";
    pub const FIND_BIN_FOR_BAG: &str = "findBinForBag";
    pub const REMOVE_BIN_STORAGE: &str = "removeBinStorageByBags";
    pub const GET_PACKING_RECORD: &str = "getPackingRecord";
    pub const UPDATE_PACKING_RECORD: &str = "updatePackingRecord";
}

/// Outgoing request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    pub action: String,
    pub payload: Fields,
}

impl ActionRequest {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            payload: Fields::new(),
        }
    }

    /// Add a payload field
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(name.to_string(), value.into());
        self
    }
}

/// Interpret a proxy response body.
///
/// `{ok: true, ...}` yields the remaining fields; `{ok: false, error}` yields
/// the server message; anything else is an invalid response.
pub fn decode_envelope(body: Value) -> Result<ActionReply, SheetsError> {
    let Value::Object(mut fields) = body else {
        return Err(SheetsError::InvalidResponse(
            "expected a JSON object".to_string(),
        ));
    };

    match fields.remove("ok") {
        Some(Value::Bool(true)) => Ok(ActionReply::from_map(fields)),
        _ => Err(SheetsError::server(
            fields.get("error").and_then(Value::as_str),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ActionRequest::new(actions::GET_ITEM)
            .field("key", "V123")
            .field("sheetName", "Items");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "getItemByKey", "payload": {"key": "V123", "sheetName": "Items"}})
        );
    }

    #[test]
    fn test_ok_envelope_strips_flag() {
        let reply = decode_envelope(json!({"ok": true, "item": {"Name": "Pear"}})).unwrap();
        assert_eq!(reply.get("ok"), None);
        assert_eq!(reply.get("item"), Some(&json!({"Name": "Pear"})));
    }

    #[test]
    fn test_error_envelope() {
        let err = decode_envelope(json!({"ok": false, "error": "Row not found"})).unwrap_err();
        assert_eq!(err.to_string(), "Row not found");

        let err = decode_envelope(json!({"ok": false})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown API error");

        // missing flag counts as failure
        let err = decode_envelope(json!({"item": {}})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown API error");
    }

    #[test]
    fn test_non_object_body() {
        let err = decode_envelope(json!(["ok"])).unwrap_err();
        assert!(matches!(err, SheetsError::InvalidResponse(_)));
    }
}
