//! End-to-end test for `bpack create`: bundle a directory, package it,
//! and unpack the produced archive.

use std::io::Read;

use clap::Parser;
use tempfile::TempDir;

use bpack_cli::commands::{dispatch, Cli};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("CLI args should parse")
}

#[tokio::test]
async fn test_create_packages_directory() {
    let context = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    std::fs::write(context.path().join("values.yaml"), "replicas: 3").unwrap();
    std::fs::create_dir_all(context.path().join("_templates")).unwrap();
    std::fs::write(
        context.path().join("_templates/metadata.yaml"),
        "name: netbundle\nversion: 1.2.3\ndescription: Network blueprints\n",
    )
    .unwrap();

    let cli = parse(&[
        "bpack",
        "create",
        context.path().to_str().unwrap(),
        "--output",
        output.path().to_str().unwrap(),
    ]);
    dispatch(cli).await.unwrap();

    let artifact_path = output.path().join("netbundle-1.2.3.tar.gz");
    assert!(artifact_path.exists());

    // Unpack: generated metadata first, embedded source excluded
    let file = std::fs::File::open(&artifact_path).unwrap();
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    let mut entries = archive.entries().unwrap();
    let mut first = entries.next().unwrap().unwrap();
    assert_eq!(
        first.path().unwrap().to_string_lossy(),
        "metadata.yaml"
    );

    let mut metadata = String::new();
    first.read_to_string(&mut metadata).unwrap();
    assert!(metadata.contains("name: netbundle"));
    assert!(metadata.contains("version: 1.2.3"));

    let rest: Vec<String> = entries
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(rest, vec!["values.yaml".to_string()]);
}

#[tokio::test]
async fn test_create_with_tag_override() {
    let context = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    std::fs::write(context.path().join("values.yaml"), "replicas: 3").unwrap();

    let cli = parse(&[
        "bpack",
        "create",
        context.path().to_str().unwrap(),
        "--output",
        output.path().to_str().unwrap(),
        "--tag",
        "custom:2.0.0",
    ]);
    dispatch(cli).await.unwrap();

    assert!(output.path().join("custom-2.0.0.tar.gz").exists());
}

#[tokio::test]
async fn test_create_without_name_fails_and_writes_nothing() {
    let context = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    std::fs::write(context.path().join("values.yaml"), "replicas: 3").unwrap();

    let cli = parse(&[
        "bpack",
        "create",
        context.path().to_str().unwrap(),
        "--output",
        output.path().to_str().unwrap(),
    ]);
    let err = dispatch(cli).await.unwrap_err();

    assert!(err.to_string().contains("name is required"));
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}
