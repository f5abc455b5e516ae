//! Resolution of required settings and arguments
//!
//! Runs before any request is built. Each failure names the exact setting or
//! argument the user has to fill in.

use crate::contract::{keys, Needs, Settings, SheetsError, StorageMode};

/// Spreadsheet tab addressed by a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub proxy_url: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// Items tab plus its unique key column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsTarget {
    pub sheet: SheetTarget,
    pub key_column: String,
}

fn required_setting<'a>(value: Option<&'a str>, setting: &'static str) -> Result<&'a str, SheetsError> {
    value.ok_or(SheetsError::NotConfigured { setting })
}

pub fn proxy_url(settings: &Settings) -> Result<String, SheetsError> {
    required_setting(settings.proxy_url(), "Proxy URL").map(str::to_string)
}

pub fn items(settings: &Settings) -> Result<ItemsTarget, SheetsError> {
    let proxy_url = proxy_url(settings)?;
    let spreadsheet_id = required_setting(
        settings.text(keys::ITEMS_SPREADSHEET_ID),
        "Items spreadsheet ID",
    )?;
    let sheet_name = required_setting(
        settings.text(keys::ITEMS_SHEET_NAME),
        "Items sheet name",
    )?;
    let key_column = required_setting(settings.items_key_column(), "Items key column")?;

    Ok(ItemsTarget {
        sheet: SheetTarget {
            proxy_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
        },
        key_column: key_column.to_string(),
    })
}

pub fn harvest(settings: &Settings) -> Result<SheetTarget, SheetsError> {
    let proxy_url = proxy_url(settings)?;
    let spreadsheet_id = required_setting(
        settings.text(keys::HARVEST_SPREADSHEET_ID),
        "Harvest spreadsheet ID",
    )?;
    let sheet_name = required_setting(
        settings.text(keys::HARVEST_SHEET_NAME),
        "Harvest sheet name",
    )?;

    Ok(SheetTarget {
        proxy_url,
        spreadsheet_id: spreadsheet_id.to_string(),
        sheet_name: sheet_name.to_string(),
    })
}

pub fn storage(settings: &Settings, mode: StorageMode) -> Result<SheetTarget, SheetsError> {
    let proxy_url = proxy_url(settings)?;
    let spreadsheet_id = required_setting(
        settings.text(keys::STORAGE_SPREADSHEET_ID),
        "Storage spreadsheet ID",
    )?;
    let sheet_name = required_setting(
        settings.storage_sheet_name(mode),
        match mode {
            StorageMode::Bag => "Bag storage sheet name",
            StorageMode::Bin => "Bin storage sheet name",
        },
    )?;

    Ok(SheetTarget {
        proxy_url,
        spreadsheet_id: spreadsheet_id.to_string(),
        sheet_name: sheet_name.to_string(),
    })
}

pub fn packing(settings: &Settings, needs: Needs) -> Result<SheetTarget, SheetsError> {
    let proxy_url = proxy_url(settings)?;
    let spreadsheet_id = required_setting(settings.packing_spreadsheet_id(), "Packing spreadsheet ID")?;
    let sheet_name = required_setting(
        settings.packing_sheet_name(needs),
        match needs {
            Needs::Or => "Packing OR sheet name",
            Needs::Grafting => "Packing grafting sheet name",
        },
    )?;

    Ok(SheetTarget {
        proxy_url,
        spreadsheet_id: spreadsheet_id.to_string(),
        sheet_name: sheet_name.to_string(),
    })
}

/// Trimmed, non-blank call argument
pub fn required_arg<'a>(value: &'a str, argument: &'static str) -> Result<&'a str, SheetsError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SheetsError::MissingArgument { argument });
    }
    Ok(value)
}

/// List argument forwarded as given; fails when every entry is blank
pub fn required_list(values: &[String], argument: &'static str) -> Result<Vec<String>, SheetsError> {
    if values.iter().all(|v| v.trim().is_empty()) {
        return Err(SheetsError::MissingArgument { argument });
    }
    Ok(values.to_vec())
}
