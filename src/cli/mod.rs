pub mod commands;
pub mod config;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::config::ViewConfig;
use crate::error::ClientError;
use crate::routes::{self, RouteDecision, RouteGate};
use crate::session::{FileTokenStore, Session, SessionGuard};

#[derive(Parser)]
#[command(name = "trendwatch")]
#[command(about = "Trendwatch CLI - Command-line client for the hashtag monitoring dashboard")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL (overrides server.json and TRENDWATCH_API_URL)")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "API server selection")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Monitored hashtags")]
    Hashtags {
        #[command(subcommand)]
        cmd: commands::hashtags::HashtagCommands,
    },

    #[command(about = "Top posts and authors reports")]
    Reports {
        #[command(subcommand)]
        cmd: commands::reports::ReportCommands,
    },

    #[command(about = "Platform totals and growth")]
    Stats {
        #[command(subcommand)]
        cmd: commands::stats::StatsCommands,
    },

    #[command(about = "Post, author and hashtag trend tables")]
    Trends {
        #[command(subcommand)]
        cmd: commands::trends::TrendCommands,
    },

    #[command(about = "Hashtags that frequently appear together")]
    Related(commands::related::RelatedArgs),

    #[command(about = "Search posts by text and/or image")]
    Search(commands::search::SearchArgs),
}

impl Commands {
    /// Dashboard route a command stands for; `None` for local-only commands
    pub fn route(&self) -> Option<&'static str> {
        match self {
            Commands::Auth { cmd } => cmd.route(),
            Commands::Server { .. } => None,
            Commands::Hashtags { .. } => Some(routes::MONITORED_HASHTAGS),
            Commands::Reports { .. } => Some(routes::REPORTS),
            Commands::Stats { .. } => Some(routes::DASHBOARD),
            Commands::Trends { .. } => Some(routes::TRENDS),
            Commands::Related(_) => Some(routes::RELATED_HASHTAGS),
            Commands::Search(_) => Some(routes::MULTIMODAL_SEARCH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs, wired once per invocation
pub struct AppContext {
    pub session: Session,
    pub guard: Arc<SessionGuard>,
    pub gate: RouteGate,
    pub api: ApiClient,
    pub view: ViewConfig,
    pub output: OutputFormat,
}

impl AppContext {
    pub fn build(url_flag: Option<&str>, output: OutputFormat) -> anyhow::Result<Self> {
        let settings = crate::config::config();
        settings.validate().context("Invalid client configuration")?;

        let config_dir = config::get_config_dir()?;
        let session = Session::new(Arc::new(FileTokenStore::in_dir(&config_dir)));
        let guard = Arc::new(SessionGuard::new(session.clone(), settings.session.poll_interval()));
        let gate = RouteGate::new(Arc::clone(&guard));

        let base_url = config::resolve_base_url(url_flag)?;
        let api = ApiClient::with_timeout(&base_url, settings.api.timeout(), session.clone())
            .with_context(|| format!("Cannot use API URL '{}'", base_url))?;

        Ok(Self {
            session,
            guard,
            gate,
            api,
            view: settings.view.clone(),
            output,
        })
    }

    /// Refuse to continue unless the gate renders `route`
    pub fn require(&self, route: &str) -> anyhow::Result<()> {
        match self.gate.resolve(route) {
            RouteDecision::Render(_) => Ok(()),
            RouteDecision::Redirect(_) => {
                anyhow::bail!("Please log in first: trendwatch auth login <username>")
            }
        }
    }
}

/// Failure already written to stdout as JSON; the binary only sets the exit code
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let json_output = matches!(OutputFormat::from_cli(&cli), OutputFormat::Json);

    match dispatch(cli).await {
        Err(e) if json_output && e.downcast_ref::<Reported>().is_none() => {
            let body = match e.downcast_ref::<ClientError>() {
                Some(client) => client.to_json(),
                None => serde_json::json!({ "success": false, "error": e.to_string() }),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
            Err(Reported(e.to_string()).into())
        }
        other => other,
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    if let Commands::Server { cmd } = cli.command {
        return commands::server::handle(cmd, cli.url.as_deref(), output_format).await;
    }

    let ctx = AppContext::build(cli.url.as_deref(), output_format)?;
    if let Some(route) = cli.command.route() {
        ctx.require(route)?;
    }

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Server { .. } => Ok(()),
        Commands::Hashtags { cmd } => commands::hashtags::handle(cmd, &ctx).await,
        Commands::Reports { cmd } => commands::reports::handle(cmd, &ctx).await,
        Commands::Stats { cmd } => commands::stats::handle(cmd, &ctx).await,
        Commands::Trends { cmd } => commands::trends::handle(cmd, &ctx).await,
        Commands::Related(args) => commands::related::handle(args, &ctx).await,
        Commands::Search(args) => commands::search::handle(args, &ctx).await,
    }
}
