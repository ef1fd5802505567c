use clap::Subcommand;
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::{OutputFormat, Reported};

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Remember the API server to talk to")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:8000")]
        url: String,
    },

    #[command(about = "Show which server commands will use")]
    Show,

    #[command(about = "Check that the server answers")]
    Ping,

    #[command(about = "Forget the stored server and fall back to the environment")]
    Reset,
}

pub async fn handle(cmd: ServerCommands, url_flag: Option<&str>, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Set { url } => {
            let url = normalize_url(&url);
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;

            let mut config = load_server_config()?;
            config.server = Some(ServerInfo::new(url.clone()));
            save_server_config(&config)?;

            output_success(
                &output_format,
                &format!("Using server {}", url),
                Some(json!({ "url": url })),
            )
        }
        ServerCommands::Show => {
            let url = resolve_base_url(url_flag)?;
            let stored = load_server_config()?.server;

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "url": url,
                            "stored": stored,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("URL: {}", url);
                    if let Some(server) = stored {
                        println!("Stored: {} (added {})", server.url, server.added_at.format("%Y-%m-%d %H:%M"));
                        if let Some(ping) = server.last_ping {
                            println!("Last ping: {} ({:?})", ping.format("%Y-%m-%d %H:%M:%S UTC"), server.status);
                        }
                    }
                }
            }
            Ok(())
        }
        ServerCommands::Ping => {
            let url = resolve_base_url(url_flag)?;
            let status = ping_server(&url).await;

            let mut config = load_server_config()?;
            if let Some(server) = config.server.as_mut().filter(|s| s.url == url) {
                server.update_ping(status);
                save_server_config(&config)?;
            }

            match status {
                ServerStatus::Up => output_success(
                    &output_format,
                    &format!("{} is up", url),
                    Some(json!({ "url": url, "status": status })),
                ),
                _ => {
                    let message = format!("{} is not reachable", url);
                    output_error(&output_format, &message, Some("SERVER_DOWN"))?;
                    Err(Reported(message).into())
                }
            }
        }
        ServerCommands::Reset => {
            save_server_config(&ServerConfig::default())?;
            output_success(&output_format, "Stored server cleared", None)
        }
    }
}
