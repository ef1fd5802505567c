use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{AppContext, OutputFormat};
use crate::routes;
use crate::session::{decode_claims, AuthState, TokenStatus};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (prompted on stdin if omitted; the prompt echoes what you type)")]
        password: Option<String>,
    },

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (prompted on stdin if omitted; the prompt echoes what you type)")]
        password: Option<String>,
        #[arg(long, default_value = "user", value_delimiter = ',', help = "Comma-separated roles")]
        roles: Vec<String>,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show claims of the current token")]
    Whoami,

    #[command(about = "Keep re-validating the session until it expires")]
    Watch,
}

impl AuthCommands {
    pub fn route(&self) -> Option<&'static str> {
        match self {
            AuthCommands::Login { .. } => Some(routes::LOGIN),
            AuthCommands::Register { .. } => Some(routes::REGISTER),
            AuthCommands::Whoami | AuthCommands::Watch => Some(routes::DASHBOARD),
            AuthCommands::Logout | AuthCommands::Status => None,
        }
    }
}

pub async fn handle(cmd: AuthCommands, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => {
            let password = prompt_password(password)?;
            let response = ctx
                .api
                .login(&username, &password)
                .await
                .map_err(api_error)?;

            // Reject a token we could never validate before persisting it
            let claims = decode_claims(&response.access_token)?;
            ctx.session.set(&response.access_token)?;
            tracing::info!("Logged in as {}", username);

            output_success(
                &ctx.output,
                &format!("Logged in as '{}'", username),
                Some(json!({ "username": username, "exp": claims.exp })),
            )
        }
        AuthCommands::Register {
            username,
            email,
            password,
            roles,
        } => {
            let password = prompt_password(password)?;
            let roles = serde_json::to_string(&roles)?;
            let response = ctx
                .api
                .register(&username, &email, &password, &roles)
                .await
                .map_err(api_error)?;

            output_success(
                &ctx.output,
                response.text(),
                Some(json!({ "username": username, "email": email })),
            )
        }
        AuthCommands::Logout => {
            ctx.session.clear()?;
            tracing::info!("Logged out");
            output_success(&ctx.output, "Logged out", None)
        }
        AuthCommands::Status => {
            let status = ctx.guard.check();
            let (state, detail) = match &status {
                TokenStatus::Valid(claims) => (AuthState::Authenticated, json!({ "exp": claims.exp })),
                TokenStatus::Expired { exp } => (AuthState::Unauthenticated, json!({ "expired_at": exp })),
                TokenStatus::Malformed(reason) => (AuthState::Unauthenticated, json!({ "reason": reason })),
                TokenStatus::Missing => (AuthState::Unauthenticated, json!({})),
            };

            match ctx.output {
                OutputFormat::Json => {
                    let mut body = json!({ "state": state, "base_url": ctx.api.base_url().as_str() });
                    if let (Some(target), Some(extra)) = (body.as_object_mut(), detail.as_object()) {
                        target.extend(extra.clone());
                    }
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                OutputFormat::Text => {
                    let label = match status {
                        TokenStatus::Valid(_) => "Authenticated",
                        TokenStatus::Expired { .. } => "Token expired",
                        TokenStatus::Malformed(_) => "Token unreadable",
                        TokenStatus::Missing => "Not logged in",
                    };
                    println!("{} ({})", label, ctx.api.base_url());
                }
            }
            Ok(())
        }
        AuthCommands::Whoami => match ctx.session.claims() {
            Some(claims) => output_value(&ctx.output, &claims),
            None => anyhow::bail!("No session token"),
        },
        AuthCommands::Watch => {
            let navigator = Arc::new(TerminalNavigator);
            let Some(mut handle) = ctx.guard.start_polling(navigator) else {
                anyhow::bail!("No session token");
            };

            if let OutputFormat::Text = ctx.output {
                println!(
                    "Watching session every {}s, Ctrl-C to stop",
                    ctx.guard.poll_interval().as_secs()
                );
            }

            // dropping the handle on Ctrl-C stops the timer
            tokio::select! {
                _ = handle.wait() => output_success(&ctx.output, "Session ended", None),
                _ = tokio::signal::ctrl_c() => Ok(()),
            }
        }
    }
}
