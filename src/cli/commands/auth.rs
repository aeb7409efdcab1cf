use std::io::{self, BufRead, Write};

use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::config::open_session;
use crate::cli::utils::{output_success, output_value, yes_no};
use crate::cli::OutputFormat;
use crate::session::{Credentials, RoleCheck};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (reads VET_PASSWORD or prompts if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Show every role check for the current user")]
    Roles,

    #[command(about = "Check whether the current user holds a permission")]
    Can {
        #[arg(help = "Permission name, e.g. ROLE_GERENTE")]
        permission: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let store = open_session().await?;

    match cmd {
        AuthCommands::Login { username, password } => {
            let password = resolve_password(password)?;
            let user = store.login(&Credentials::new(username, password)).await?;

            output_success(
                output_format,
                &format!("Logged in as {}", user.username),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            store.logout().await;
            output_success(output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = store.session().await;
            let server = store.client().base_url().to_string();

            let text = match &session.user {
                Some(user) if session.is_authenticated() => {
                    let role = if user.role_name.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", user.role_name)
                    };
                    vec![format!("Logged in as {}{} on {}", user.username, role, server)]
                }
                _ => vec![format!("Not logged in ({})", server)],
            };

            output_value(
                output_format,
                json!({
                    "authenticated": session.is_authenticated(),
                    "user": session.user.as_ref().map(|u| u.username.clone()),
                    "rolNombre": session.user.as_ref().map(|u| u.role_name.clone()),
                    "server": server,
                }),
                &text,
            )
        }
        AuthCommands::Whoami => {
            let user = store
                .user()
                .await
                .ok_or_else(|| anyhow::anyhow!("Not logged in"))?;

            let mut text = vec![format!("User: {}", user.username)];
            if !user.role_name.is_empty() {
                text.push(format!("Role: {}", user.role_name));
            }
            text.push(format!("Permissions: {}", user.permissions.join(", ")));

            output_value(output_format, json!({ "user": user }), &text)
        }
        AuthCommands::Roles => {
            let session = store.session().await;

            let mut checks = Map::new();
            let mut text = Vec::with_capacity(RoleCheck::ALL.len());
            for check in RoleCheck::ALL {
                let granted = session.check(check);
                checks.insert(check.name().to_string(), Value::Bool(granted));
                text.push(format!("{:<20} {}", check.name(), yes_no(granted)));
            }

            output_value(
                output_format,
                json!({ "authenticated": session.is_authenticated(), "roles": checks }),
                &text,
            )
        }
        AuthCommands::Can { permission } => {
            let granted = store.has_permission(&permission).await;
            output_value(
                output_format,
                json!({ "permission": permission, "granted": granted }),
                &[format!("{}: {}", permission, if granted { "granted" } else { "denied" })],
            )
        }
    }
}

fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    if let Ok(password) = std::env::var("VET_PASSWORD") {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();

    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
