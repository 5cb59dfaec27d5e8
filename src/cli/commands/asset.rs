use clap::Subcommand;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AssetCommands {
    #[command(about = "List assets")]
    List {
        #[arg(long, help = "Filter by status, e.g. available")]
        status: Option<String>,
        #[arg(long, help = "Search name or asset code")]
        search: Option<String>,
    },

    #[command(about = "Show one asset")]
    Show {
        #[arg(help = "Asset id")]
        id: Uuid,
    },

    #[command(about = "Assign units of an asset to a user")]
    Assign {
        #[arg(help = "Asset id")]
        asset: Uuid,
        #[arg(help = "User id")]
        user: Uuid,
        #[arg(long, default_value_t = 1, help = "Units to assign")]
        quantity: i32,
    },

    #[command(about = "Return units of an assignment")]
    Return {
        #[arg(help = "Assignment id")]
        assignment: Uuid,
        #[arg(long, help = "Units to return (default: everything outstanding)")]
        quantity: Option<i32>,
    },
}

fn print_asset_row(asset: &Value) {
    println!(
        "{:<12} {:<28} {:<18} {:>5}/{:<5} {}",
        field(asset, "asset_code"),
        field(asset, "name"),
        field(asset, "status"),
        int_field(asset, "available_quantity"),
        int_field(asset, "quantity"),
        field(asset, "id"),
    );
}

fn print_action(action: &Value) {
    println!("✓ {}: {}", field(action, "title"), field(action, "message"));
    if action.pointer("/data/replayed").and_then(Value::as_bool) == Some(true) {
        println!("  (replayed an earlier identical request)");
    }
}

pub async fn handle(cmd: AssetCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::authenticated()?;

    match cmd {
        AssetCommands::List { status, search } => {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            if let Some(status) = &status {
                query.append_pair("status", status);
            }
            if let Some(search) = &search {
                query.append_pair("q", search);
            }
            let query = query.finish();
            let path = if query.is_empty() { "/api/assets".to_string() } else { format!("/api/assets?{}", query) };

            let assets = client.get(&path).await?;
            let empty = assets.as_array().map_or(true, |a| a.is_empty());
            if empty {
                return output_empty_collection(&output_format, "assets", "No assets found");
            }
            output_value(&output_format, &assets, |assets| {
                println!("{:<12} {:<28} {:<18} {:>11} {}", "CODE", "NAME", "STATUS", "AVAIL/QTY", "ID");
                println!("{}", "-".repeat(100));
                for asset in assets.as_array().into_iter().flatten() {
                    print_asset_row(asset);
                }
            })
        }
        AssetCommands::Show { id } => {
            let asset = client.get(&format!("/api/assets/{}", id)).await?;
            output_value(&output_format, &asset, |asset| {
                println!("Code:      {}", field(asset, "asset_code"));
                println!("Name:      {}", field(asset, "name"));
                println!("Type:      {}", field(asset, "asset_type"));
                println!("Status:    {}", field(asset, "status"));
                println!(
                    "Available: {} of {}",
                    int_field(asset, "available_quantity"),
                    int_field(asset, "quantity")
                );
            })
        }
        AssetCommands::Assign { asset, user, quantity } => {
            let key = Uuid::new_v4().to_string();
            let action = client
                .post_idempotent(
                    "/api/assignments",
                    &json!({ "asset_id": asset, "user_id": user, "quantity": quantity }),
                    &key,
                )
                .await?;
            output_value(&output_format, &action, print_action)
        }
        AssetCommands::Return { assignment, quantity } => {
            let key = Uuid::new_v4().to_string();
            let action = client
                .post_idempotent(
                    &format!("/api/assignments/{}/return", assignment),
                    &json!({ "return_quantity": quantity }),
                    &key,
                )
                .await?;
            output_value(&output_format, &action, print_action)
        }
    }
}
