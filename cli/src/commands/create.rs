//! `bpack create` command — Package a directory into a local artifact.

use std::path::PathBuf;

use clap::Args;

use bpack_packager::{ArtifactBuilder, Bundler, DirectoryBundler};

#[derive(Args)]
pub struct CreateArgs {
    /// Directory containing the files to package
    #[arg(default_value = ".")]
    pub context: PathBuf,

    /// Output file, or directory to synthesize <name>-<version>.tar.gz in
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Artifact tag in 'name:version' form (overrides embedded metadata)
    #[arg(short, long)]
    pub tag: Option<String>,
}

pub async fn execute(args: CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut artifact = ArtifactBuilder::with_workdir(&args.context);
    DirectoryBundler::new(&args.context).bundle(&mut artifact)?;

    let path = artifact.create(&args.output, args.tag.as_deref().unwrap_or(""))?;

    println!("Created {}", path.display());
    Ok(())
}
