//! `bpack push` command — Package a directory and push it to a registry.

use std::path::PathBuf;

use clap::Args;

use bpack_packager::{ArtifactBuilder, ArtifactPusher, Bundler, DirectoryBundler, RegistryAuth};

#[derive(Args)]
pub struct PushArgs {
    /// Registry and repository base (e.g., "ghcr.io/acme/blueprints")
    pub registry: String,

    /// Directory containing the files to package
    #[arg(default_value = ".")]
    pub context: PathBuf,

    /// Artifact tag in 'name:version' form (overrides embedded metadata)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Use plain HTTP (for local registries)
    #[arg(long)]
    pub plain_http: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn execute(args: PushArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut artifact = ArtifactBuilder::with_workdir(&args.context);
    DirectoryBundler::new(&args.context).bundle(&mut artifact)?;

    // Load auth from credential store (falls back to env vars, then anonymous)
    let registry_host = args.registry.split('/').next().unwrap_or_default();
    let auth = RegistryAuth::from_credential_store(registry_host);
    let pusher = if args.plain_http {
        ArtifactPusher::insecure(auth)
    } else {
        ArtifactPusher::new(auth)
    };

    if !args.quiet {
        println!("Pushing to {}...", args.registry);
    }

    let result = artifact
        .push(&args.registry, args.tag.as_deref().unwrap_or(""), &pusher)
        .await?;

    if args.quiet {
        println!("{}", result.manifest_url);
    } else {
        println!("Pushed: {}", result.manifest_url);
    }

    Ok(())
}
