use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List all tenants")]
    List {
        #[arg(long, help = "Include trashed tenants")]
        all: bool,
    },

    #[command(about = "Onboard a new tenant")]
    Create {
        #[arg(help = "Tenant name")]
        name: String,
        #[arg(long, help = "Display name")]
        display_name: Option<String>,
        #[arg(long, help = "Login name of the first administrator")]
        admin: String,
        #[arg(long, help = "Administrator password (read from stdin if not provided)")]
        admin_password: Option<String>,
    },
}

/// Exchange the session token for a sudo token.
async fn elevated() -> anyhow::Result<ApiClient> {
    let client = ApiClient::authenticated()?;
    let sudo = client.post("/api/auth/sudo", &json!({ "reason": "opsdesk tenant command" })).await?;
    let token = field(&sudo, "token");
    if token.is_empty() {
        anyhow::bail!("Server did not return a sudo token");
    }
    Ok(client.with_token(token.to_string()))
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = elevated().await?;

    match cmd {
        TenantCommands::List { all } => {
            let path = if all { "/api/root/tenant?include_trashed=true" } else { "/api/root/tenant" };
            let tenants = client.get(path).await?;
            if tenants.as_array().map_or(true, |t| t.is_empty()) {
                return output_empty_collection(&output_format, "tenants", "No tenants registered");
            }
            output_value(&output_format, &tenants, |tenants| {
                println!("{:<20} {:<25} {:<16} {:<8} {}", "NAME", "DISPLAY NAME", "STATUS", "ACTIVE", "DATABASE");
                println!("{}", "-".repeat(95));
                for tenant in tenants.as_array().into_iter().flatten() {
                    let active = tenant.get("is_active").and_then(|v| v.as_bool()).unwrap_or(false);
                    println!(
                        "{:<20} {:<25} {:<16} {:<8} {}",
                        field(tenant, "name"),
                        field(tenant, "display_name"),
                        field(tenant, "status"),
                        if active { "yes" } else { "no" },
                        field(tenant, "database"),
                    );
                }
            })
        }
        TenantCommands::Create { name, display_name, admin, admin_password } => {
            let password = match admin_password {
                Some(password) => password,
                None => prompt("Administrator password")?,
            };
            let tenant = client
                .post(
                    "/api/root/tenant",
                    &json!({
                        "name": name,
                        "display_name": display_name,
                        "admin": { "name": admin, "auth": admin, "password": password },
                    }),
                )
                .await?;
            output_success(
                &output_format,
                &format!("Tenant '{}' created; awaiting first payment", field(&tenant, "name")),
                Some(json!({ "tenant": tenant })),
            )
        }
    }
}
