//! Artifact builder — the virtual file set and the Create/Push pipeline.
//!
//! Upstream bundlers populate the builder through `add_file`; packaging
//! then runs as a one-shot pipeline: resolve metadata → serialize the
//! archive → (push only) assemble the OCI image → publish. Every call
//! is independent; only the packaging timestamp differs between runs
//! with identical inputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bpack_core::error::{BpackError, Result};
use oci_distribution::Reference;

use crate::archive;
use crate::image;
use crate::reference::ImageReference;
use crate::registry::{ArtifactPusher, PushResult};
use crate::resolver;

/// Reserved path of the optional embedded metadata source. Parsed for
/// name/version/description fields and never re-emitted verbatim.
pub const EMBEDDED_METADATA_PATH: &str = "_templates/metadata.yaml";

/// Fixed top-level name of the generated metadata entry in every
/// produced archive.
pub const GENERATED_METADATA_PATH: &str = "metadata.yaml";

/// Accumulates files and packages them into a tar.gz artifact or an
/// OCI image.
///
/// Single-writer: populate, then package. Callers running Create/Push
/// concurrently against one builder must serialize externally.
pub struct ArtifactBuilder {
    /// Virtual file set: relative path → content
    files: BTreeMap<String, Vec<u8>>,
    /// Directory for best-effort git provenance queries
    workdir: PathBuf,
}

impl ArtifactBuilder {
    /// Create an empty builder; provenance queries run in the current
    /// directory.
    pub fn new() -> Self {
        Self::with_workdir(".")
    }

    /// Create an empty builder with provenance queries rooted at
    /// `workdir`.
    pub fn with_workdir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            files: BTreeMap::new(),
            workdir: workdir.into(),
        }
    }

    /// Add a file to the virtual file set. Overwrites any existing
    /// entry at the same path.
    pub fn add_file(&mut self, path: impl Into<String>, content: Vec<u8>) {
        self.files.insert(path.into(), content);
    }

    /// The accumulated virtual file set.
    pub fn files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.files
    }

    /// Number of accumulated files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Package the file set into a tar.gz artifact on disk.
    ///
    /// `output` may name a directory (a `<name>-<version>.tar.gz` file
    /// name is synthesized inside it) or a full file path. Returns the
    /// final path. No file is created when metadata resolution fails.
    pub fn create(&self, output: &Path, tag: &str) -> Result<PathBuf> {
        let resolved = resolver::resolve(&self.files, tag, &self.workdir)?;
        let path = archive::resolve_output_path(output, resolved.name(), resolved.version());

        tracing::info!(
            name = resolved.name(),
            version = resolved.version(),
            path = %path.display(),
            "Writing artifact archive"
        );

        archive::write_to_file(&path, &resolved.encoded, &self.files)?;
        Ok(path)
    }

    /// Package the file set and publish it as an OCI image under
    /// `<registry_base>/<name>:<version>`.
    ///
    /// The tarball, layer, and image are held in memory end-to-end; no
    /// temporary files are written. Reference parse failures surface
    /// before any network call.
    pub async fn push(
        &self,
        registry_base: &str,
        tag: &str,
        pusher: &ArtifactPusher,
    ) -> Result<PushResult> {
        let resolved = resolver::resolve(&self.files, tag, &self.workdir)?;
        let tarball = archive::write_to_buffer(&resolved.encoded, &self.files)?;
        let artifact = image::assemble(tarball, resolved.name(), &resolved.metadata)?;

        let base = registry_base.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(BpackError::RegistryError {
                registry: String::new(),
                message: "invalid repository reference: empty registry base".to_string(),
            });
        }

        let reference = ImageReference::parse(&format!("{}/{}", base, resolved.name()))?
            .with_tag(resolved.version());
        let oci_ref: Reference = reference.full_reference().parse().map_err(|e| {
            BpackError::RegistryError {
                registry: reference.registry.clone(),
                message: format!(
                    "invalid repository reference '{}': {}",
                    reference.full_reference(),
                    e
                ),
            }
        })?;

        tracing::info!(
            name = resolved.name(),
            version = resolved.version(),
            reference = %oci_ref,
            "Publishing artifact"
        );

        pusher.write(&oci_ref, artifact).await
    }
}

impl Default for ArtifactBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{OciArtifact, CONTENT_MEDIA_TYPE};
    use crate::registry::RegistryWrite;
    use async_trait::async_trait;
    use std::io::Read;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn sample_builder(workdir: &Path) -> ArtifactBuilder {
        let mut builder = ArtifactBuilder::with_workdir(workdir);
        builder.add_file("manifests/deployment.yaml", b"kind: Deployment".to_vec());
        builder.add_file("values.yaml", b"replicas: 3".to_vec());
        builder.add_file(
            EMBEDDED_METADATA_PATH,
            b"name: netbundle\nversion: 1.2.3\n".to_vec(),
        );
        builder
    }

    fn archive_paths(path: &Path) -> Vec<String> {
        let file = std::fs::File::open(path).unwrap();
        let decoder = flate2::read::GzDecoder::new(file);
        let mut archive = tar::Archive::new(decoder);
        archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_add_file_overwrites() {
        let mut builder = ArtifactBuilder::new();
        builder.add_file("a.txt", b"first".to_vec());
        builder.add_file("a.txt", b"second".to_vec());

        assert_eq!(builder.len(), 1);
        assert_eq!(builder.files().get("a.txt").unwrap(), b"second");
    }

    #[test]
    fn test_create_synthesizes_file_name() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let path = builder.create(tmp.path(), "").unwrap();

        assert_eq!(path, tmp.path().join("netbundle-1.2.3.tar.gz"));
        assert!(path.exists());
    }

    #[test]
    fn test_create_tag_overrides_embedded_name() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let path = builder.create(tmp.path(), "custom:9.0.0").unwrap();
        assert_eq!(path, tmp.path().join("custom-9.0.0.tar.gz"));
    }

    #[test]
    fn test_create_explicit_file_path() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());
        let target = tmp.path().join("custom.tar.gz");

        let path = builder.create(&target, "").unwrap();
        assert_eq!(path, target);
    }

    #[test]
    fn test_create_archive_layout() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let path = builder.create(tmp.path(), "").unwrap();
        let paths = archive_paths(&path);

        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], GENERATED_METADATA_PATH);
        assert!(!paths.iter().any(|p| p == EMBEDDED_METADATA_PATH));
    }

    #[test]
    fn test_create_generated_metadata_is_authoritative() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let path = builder.create(tmp.path(), "custom:9.0.0").unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let decoder = flate2::read::GzDecoder::new(file);
        let mut archive = tar::Archive::new(decoder);
        let mut first = archive.entries().unwrap().next().unwrap().unwrap();
        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();

        let metadata: bpack_core::metadata::ArtifactMetadata =
            serde_yaml::from_str(&content).unwrap();
        assert_eq!(metadata.name, "custom");
        assert_eq!(metadata.version, "9.0.0");
    }

    #[test]
    fn test_create_missing_name_performs_no_io() {
        let tmp = TempDir::new().unwrap();
        let mut builder = ArtifactBuilder::with_workdir(tmp.path());
        builder.add_file("values.yaml", b"replicas: 3".to_vec());

        let err = builder.create(tmp.path(), "").unwrap_err();
        assert!(err.to_string().contains("name is required"));

        // No output file was created
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    /// Fake registry writer recording every write.
    #[derive(Default)]
    struct FakeRegistry {
        calls: Arc<Mutex<Vec<(String, OciArtifact)>>>,
    }

    #[async_trait]
    impl RegistryWrite for FakeRegistry {
        async fn write(&self, reference: &Reference, artifact: OciArtifact) -> Result<PushResult> {
            self.calls
                .lock()
                .unwrap()
                .push((reference.to_string(), artifact));
            Ok(PushResult {
                config_url: "https://registry.test/config".to_string(),
                manifest_url: "https://registry.test/manifest".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_push_writes_expected_reference_and_image() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let fake = FakeRegistry::default();
        let calls = fake.calls.clone();
        let pusher = ArtifactPusher::with_writer(Box::new(fake));

        let result = builder
            .push("ghcr.io/acme/blueprints", "", &pusher)
            .await
            .unwrap();
        assert_eq!(result.manifest_url, "https://registry.test/manifest");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (reference, artifact) = &calls[0];
        assert_eq!(reference, "ghcr.io/acme/blueprints/netbundle:1.2.3");
        assert_eq!(artifact.layers.len(), 1);
        assert_eq!(artifact.layers[0].media_type, CONTENT_MEDIA_TYPE);

        // The layer is the archive itself: unpack and check the layout
        let decoder = flate2::read::GzDecoder::new(artifact.layers[0].data.as_slice());
        let mut archive = tar::Archive::new(decoder);
        let paths: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(paths[0], GENERATED_METADATA_PATH);
        assert!(!paths.iter().any(|p| p == EMBEDDED_METADATA_PATH));
    }

    #[tokio::test]
    async fn test_push_tag_override() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let fake = FakeRegistry::default();
        let calls = fake.calls.clone();
        let pusher = ArtifactPusher::with_writer(Box::new(fake));

        builder
            .push("ghcr.io/acme", "renamed:2.0.0", &pusher)
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].0, "ghcr.io/acme/renamed:2.0.0");
    }

    #[tokio::test]
    async fn test_push_malformed_tag_makes_no_registry_call() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let fake = FakeRegistry::default();
        let calls = fake.calls.clone();
        let pusher = ArtifactPusher::with_writer(Box::new(fake));

        let err = builder
            .push("ghcr.io/acme", "not-a-tag", &pusher)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tag must be in format"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_invalid_reference_makes_no_registry_call() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());

        let fake = FakeRegistry::default();
        let calls = fake.calls.clone();
        let pusher = ArtifactPusher::with_writer(Box::new(fake));

        let err = builder
            .push("ghcr.io/acme/bad repo", "", &pusher)
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("invalid repository reference"),
            "got: {}",
            err
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_empty_registry_base() {
        let tmp = TempDir::new().unwrap();
        let builder = sample_builder(tmp.path());
        let pusher = ArtifactPusher::with_writer(Box::new(FakeRegistry::default()));

        let err = builder.push("", "", &pusher).await.unwrap_err();
        assert!(err.to_string().contains("invalid repository reference"));
    }
}
