use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at an API server")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the configured server")]
    Show,

    #[command(about = "Health check the configured server")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            let server = ServerInfo::new(&url)?;
            save_server(&server)?;
            output_success(
                &output_format,
                &format!("Server set to {}", server.url),
                Some(json!({ "server": server })),
            )
        }
        ServerCommands::Show => match load_server()? {
            Some(server) => {
                let value = serde_json::to_value(&server)?;
                output_value(&output_format, &value, |_| {
                    println!("URL:       {}", server.url);
                    println!("Added:     {}", server.added_at.format("%Y-%m-%d %H:%M"));
                    match server.last_ping {
                        Some(at) => println!("Last ping: {} ({:?})", at.format("%Y-%m-%d %H:%M"), server.status),
                        None => println!("Last ping: never"),
                    }
                })
            }
            None => output_empty_collection(&output_format, "server", "No server configured"),
        },
        ServerCommands::Ping => {
            let mut server = require_server()?;
            let status = ping_server(&server).await;
            server.update_ping(status);
            save_server(&server)?;

            if status != ServerStatus::Up {
                anyhow::bail!("Server {} is down", server.url);
            }
            output_success(
                &output_format,
                &format!("Server {} is up", server.url),
                Some(json!({ "status": status })),
            )
        }
    }
}
