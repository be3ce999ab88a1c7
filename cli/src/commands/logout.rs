//! `bpack logout` command — Remove stored registry credentials.

use clap::Args;

use bpack_packager::CredentialStore;

#[derive(Args)]
pub struct LogoutArgs {
    /// Registry server (default: index.docker.io)
    pub server: Option<String>,
}

pub async fn execute(args: LogoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let server = args.server.unwrap_or_else(|| "index.docker.io".to_string());

    let store = CredentialStore::default_path()?;
    if store.remove(&server)? {
        println!("Removed login credentials for {}", server);
    } else {
        println!("Not logged in to {}", server);
    }

    Ok(())
}
