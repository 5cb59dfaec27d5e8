use chrono::{Duration, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Log in and store the session token")]
    Login {
        #[arg(help = "Tenant name")]
        tenant: String,
        #[arg(help = "Login name")]
        user: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Forget the stored session token")]
    Logout,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { tenant, user, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password")?,
            };

            let client = ApiClient::anonymous()?;
            let data = client
                .post(&format!("/auth/login/{}/{}", tenant, user), &json!({ "password": password }))
                .await?;

            let token = field(&data, "token");
            if token.is_empty() {
                anyhow::bail!("Server did not return a token");
            }
            let expires_in = int_field(&data, "expires_in");

            save_session(&SessionConfig {
                tenant: Some(tenant.clone()),
                user: Some(user.clone()),
                token: Some(token.to_string()),
                expires_at: Some(Utc::now() + Duration::seconds(expires_in)),
            })?;

            output_success(
                &output_format,
                &format!("Logged in as {} on {}", user, tenant),
                Some(json!({ "tenant": tenant, "user": user, "expires_in": expires_in })),
            )
        }
        AuthCommands::Whoami => {
            let me = ApiClient::authenticated()?.get("/api/auth/whoami").await?;
            output_value(&output_format, &me, |me| {
                println!("User:   {} ({})", field(me, "name"), field(me, "auth"));
                println!("Tenant: {}", field(me, "tenant"));
                println!("Access: {}", field(me, "access"));
                if let Some(role) = me.get("role").and_then(|r| r.get("name")).and_then(|n| n.as_str()) {
                    println!("Role:   {}", role);
                }
            })
        }
        AuthCommands::Logout => {
            let session = load_session()?;
            save_session(&SessionConfig::default())?;
            let message = if session.is_logged_in() { "Logged out" } else { "No session to log out of" };
            output_success(&output_format, message, None)
        }
    }
}
