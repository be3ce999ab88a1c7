//! CLI command definitions and dispatch.

mod create;
mod login;
mod logout;
mod push;

use clap::{Parser, Subcommand};

/// bpack — package blueprint files into FluxCD-consumable OCI artifacts.
#[derive(Parser)]
#[command(name = "bpack", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Package a directory into a local tar.gz artifact
    Create(create::CreateArgs),
    /// Package a directory and push it to an OCI registry
    Push(push::PushArgs),
    /// Store registry credentials
    Login(login::LoginArgs),
    /// Remove stored registry credentials
    Logout(logout::LogoutArgs),
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Create(args) => create::execute(args).await,
        Command::Push(args) => push::execute(args).await,
        Command::Login(args) => login::execute(args).await,
        Command::Logout(args) => logout::execute(args).await,
    }
}
