//! Credentials command - client secret in the OS keychain.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use eligcheck_core::CredentialStore;
use eligcheck_core::Config;

use super::Context;

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

#[derive(Subcommand, Debug)]
pub enum CredentialsCommand {
    /// Store the client secret in the OS keychain (prompts for the secret)
    Set {
        /// Client ID to store the secret under; also saved to the config file
        #[arg(long)]
        client_id: Option<String>,
    },

    /// Show whether a client secret is stored
    Status,

    /// Remove the stored client secret
    Clear,
}

pub fn run(args: CredentialsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CredentialsCommand::Set { client_id } => cmd_set(client_id, ctx),
        CredentialsCommand::Status => cmd_status(ctx),
        CredentialsCommand::Clear => cmd_clear(ctx),
    }
}

fn client_id(ctx: &Context) -> Result<String> {
    match ctx.config.client_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => bail!("No client ID configured: set UHC_CLIENT_ID or pass --client-id"),
    }
}

fn cmd_set(new_client_id: Option<String>, ctx: &Context) -> Result<()> {
    let client_id = match new_client_id {
        Some(id) => {
            // Persist only the file's own settings, not environment overrides
            let mut file_config = Config::load_from(&Config::config_path()?)?;
            file_config.client_id = Some(id.clone());
            file_config.save()?;
            id
        }
        None => client_id(ctx)?,
    };

    let secret = rpassword::prompt_password(format!("Client secret for {}: ", client_id))?;
    if secret.trim().is_empty() {
        bail!("Client secret cannot be empty");
    }
    CredentialStore::store_secret(&client_id, secret.trim())?;
    println!("Client secret stored in keychain");
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let client_id = client_id(ctx)?;
    if CredentialStore::has_secret(&client_id) {
        println!("Client secret stored for {}", client_id);
    } else {
        println!("No client secret stored for {}", client_id);
    }
    Ok(())
}

fn cmd_clear(ctx: &Context) -> Result<()> {
    let client_id = client_id(ctx)?;
    if !CredentialStore::has_secret(&client_id) {
        println!("No client secret stored for {}", client_id);
        return Ok(());
    }
    CredentialStore::delete_secret(&client_id)?;
    println!("Client secret removed");
    Ok(())
}
