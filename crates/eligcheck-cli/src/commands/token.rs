//! Token command - OAuth token lifecycle.

use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};
use eligcheck_core::auth::OAuthClient;
use eligcheck_core::Token;
use serde_json::json;

use super::Context;
use crate::output;

/// Characters of the bearer value shown in status output
const TOKEN_PREVIEW_CHARS: usize = 50;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Generate a new token with the client-credentials grant
    Generate,

    /// Show whether the saved token is valid and when it expires
    Status,

    /// Use a bearer token obtained elsewhere (prompts when omitted)
    Set {
        /// Full value including the scheme, e.g. "Bearer eyJ0eXAi..."
        bearer: Option<String>,
    },

    /// Clear the saved token
    Clear,
}

pub async fn run(args: TokenArgs, ctx: &Context) -> Result<()> {
    match args.command {
        TokenCommand::Generate => cmd_generate(ctx).await,
        TokenCommand::Status => cmd_status(ctx),
        TokenCommand::Set { bearer } => cmd_set(bearer, ctx),
        TokenCommand::Clear => cmd_clear(ctx),
    }
}

fn format_local(token: &Token) -> String {
    token
        .expires_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn token_json(token: &Token) -> serde_json::Value {
    json!({
        "valid": token.is_valid(),
        "expires_at": token.expires_at.to_rfc3339(),
        "saved_at": token.saved_at.to_rfc3339(),
        "expires_in_secs": token.time_until_expiry().num_seconds().max(0),
        "token_preview": token.preview(TOKEN_PREVIEW_CHARS),
    })
}

async fn cmd_generate(ctx: &Context) -> Result<()> {
    let credentials = ctx.credentials()?;
    let oauth = OAuthClient::new(&credentials)?;
    let mut manager = ctx.token_manager()?;

    match manager.acquire(&oauth).await {
        Ok(token) => {
            if ctx.json_output {
                output::print_json(&token_json(token));
            } else {
                println!("Token generated successfully");
                println!("Token expires at: {}", format_local(token));
            }
            Ok(())
        }
        Err(e) => Err(output::failure("Failed to generate token", e, ctx.json_output)),
    }
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let manager = ctx.token_manager()?;

    if ctx.json_output {
        let status = match manager.token() {
            Some(token) => token_json(token),
            None => json!({ "valid": false }),
        };
        output::print_json(&status);
        return Ok(());
    }

    match manager.token().filter(|t| t.is_valid()) {
        Some(token) => {
            println!("Token is valid");
            println!("Expires in: {}", token.expires_in_display());
            println!("Expires: {}", format_local(token));
            println!("Token: {}", token.preview(TOKEN_PREVIEW_CHARS));
            if manager.has_saved_token() {
                println!("Token loaded from {}", manager.token_path().display());
            }
        }
        None => {
            println!("Token expired or not generated");
            println!("Run `eligcheck token generate` to create one.");
        }
    }
    Ok(())
}

fn cmd_set(bearer: Option<String>, ctx: &Context) -> Result<()> {
    let bearer = match bearer {
        Some(bearer) => bearer,
        None => rpassword::prompt_password("Paste Bearer token: ")?,
    };

    let mut manager = ctx.token_manager()?;
    match manager.set_manual(&bearer) {
        Ok(token) => {
            if ctx.json_output {
                output::print_json(&token_json(token));
            } else {
                println!("Manual token set successfully");
                println!("Token expires at: {}", format_local(token));
            }
            Ok(())
        }
        Err(e) => Err(output::failure("Please enter a valid Bearer token", e, ctx.json_output)),
    }
}

fn cmd_clear(ctx: &Context) -> Result<()> {
    let mut manager = ctx.token_manager()?;
    manager.clear();
    if ctx.json_output {
        output::print_json(&json!({ "cleared": true }));
    } else {
        println!("Token cleared successfully");
    }
    Ok(())
}
