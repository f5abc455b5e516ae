use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harvest_sheets::contract::{
    HarvestLogQuery, HeadersParams, ItemKeyParams, ListTabsParams, PackingParams,
    UpdateItemParams,
};
use harvest_sheets::{Config, HarvestSheetsModule, Needs, Settings};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Harvest Sheets command line client
#[derive(Parser)]
#[command(name = "harvest-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or edit the stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// List the tabs of a spreadsheet (defaults to the items spreadsheet)
    Tabs {
        #[arg(long)]
        spreadsheet: Option<String>,
    },
    /// Print the header row of a sheet
    Headers {
        #[arg(long)]
        spreadsheet: String,
        #[arg(long)]
        sheet: String,
    },
    /// Read or edit inventory items
    Item {
        #[command(subcommand)]
        action: ItemCommand,
    },
    /// Read harvest data
    Harvest {
        #[command(subcommand)]
        action: HarvestCommand,
    },
    /// Read packing records
    Packing {
        #[command(subcommand)]
        action: PackingCommand,
    },
    /// Inspect locally stored harvest photos
    Photos {
        #[command(subcommand)]
        action: PhotosCommand,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    /// Merge FIELD=VALUE pairs into the settings (VALUE may be JSON)
    Set {
        #[arg(required = true, value_parser = parse_assignment)]
        values: Vec<(String, Value)>,
    },
    Clear,
}

#[derive(Subcommand)]
enum ItemCommand {
    Get { key: String },
    /// Patch an item with FIELD=VALUE pairs
    Update {
        key: String,
        #[arg(required = true, value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
}

#[derive(Subcommand)]
enum HarvestCommand {
    /// Item row together with its harvest entries
    Get { key: String },
    /// Harvest log, optionally filtered by item key
    Log {
        #[arg(long)]
        key: Option<String>,
    },
}

#[derive(Subcommand)]
enum PackingCommand {
    Get {
        /// or | grafting
        #[arg(long)]
        needs: Needs,
        label: String,
    },
}

#[derive(Subcommand)]
enum PhotosCommand {
    List { key: String },
}

/// `FIELD=VALUE`; VALUE is parsed as JSON and falls back to a plain string
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::load(cli.config.as_deref())?;
    let module = HarvestSheetsModule::init(config).context("failed to initialize harvest sheets")?;
    let client = module.client();

    match cli.command {
        Command::Settings { action } => match action {
            SettingsCommand::Show => print_json(&module.settings().load_or_default())?,
            SettingsCommand::Set { values } => {
                let partial = values
                    .into_iter()
                    .fold(Settings::new(), |settings, (field, value)| settings.with(field, value));
                print_json(&module.settings().save(&partial)?)?;
            }
            SettingsCommand::Clear => {
                module.settings().clear()?;
                tracing::info!("settings cleared");
            }
        },
        Command::Tabs { spreadsheet } => {
            let tabs = client
                .list_tabs(ListTabsParams {
                    spreadsheet_id: spreadsheet,
                })
                .await?;
            print_json(&tabs)?;
        }
        Command::Headers { spreadsheet, sheet } => {
            let headers = client
                .get_headers(HeadersParams {
                    spreadsheet_id: spreadsheet,
                    sheet_name: sheet,
                })
                .await?;
            print_json(&headers)?;
        }
        Command::Item { action } => match action {
            ItemCommand::Get { key } => print_json(&client.get_item(ItemKeyParams::new(key)).await?)?,
            ItemCommand::Update { key, fields } => {
                let reply = client
                    .update_item(UpdateItemParams {
                        key,
                        patch: fields.into_iter().collect(),
                    })
                    .await?;
                print_json(&reply)?;
            }
        },
        Command::Harvest { action } => match action {
            HarvestCommand::Get { key } => {
                print_json(&client.get_item_and_harvest(ItemKeyParams::new(key)).await?)?
            }
            HarvestCommand::Log { key } => {
                print_json(&client.get_harvest_log(HarvestLogQuery { key }).await?)?
            }
        },
        Command::Packing { action } => match action {
            PackingCommand::Get { needs, label } => {
                print_json(&client.get_packing_record(PackingParams { needs, label }).await?)?
            }
        },
        Command::Photos { action } => match action {
            PhotosCommand::List { key } => print_json(&module.photos().photos(&key))?,
        },
    }

    Ok(())
}
