//! OCI registry publication.
//!
//! Uses the `oci-distribution` crate to write assembled artifact images
//! to container registries (GHCR, Docker Hub, local registries). The
//! network seam is the `RegistryWrite` trait so tests can substitute a
//! fake without touching the packaging control flow.

use async_trait::async_trait;
use bpack_core::error::{BpackError, Result};
use oci_distribution::client::{Client, ClientConfig, ClientProtocol, PushResponse};
use oci_distribution::secrets::RegistryAuth as OciRegistryAuth;
use oci_distribution::Reference;

use crate::credentials::CredentialStore;
use crate::image::OciArtifact;

/// Authentication credentials for a container registry.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    username: Option<String>,
    password: Option<String>,
}

impl RegistryAuth {
    /// Create anonymous authentication (no credentials).
    pub fn anonymous() -> Self {
        Self {
            username: None,
            password: None,
        }
    }

    /// Create basic authentication with username and password.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Create authentication from environment variables.
    ///
    /// Reads `BPACK_REGISTRY_USERNAME` and `BPACK_REGISTRY_PASSWORD`.
    /// Falls back to anonymous if not set.
    pub fn from_env() -> Self {
        let username = std::env::var("BPACK_REGISTRY_USERNAME").ok();
        let password = std::env::var("BPACK_REGISTRY_PASSWORD").ok();

        if username.is_some() && password.is_some() {
            Self { username, password }
        } else {
            Self::anonymous()
        }
    }

    /// Create authentication from the credential store, falling back to
    /// env vars, then anonymous.
    pub fn from_credential_store(registry: &str) -> Self {
        if let Ok(store) = CredentialStore::default_path() {
            if let Ok(Some((username, password))) = store.get(registry) {
                return Self::basic(username, password);
            }
        }
        Self::from_env()
    }

    /// Convert to oci-distribution auth type.
    fn to_oci_auth(&self) -> OciRegistryAuth {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => OciRegistryAuth::Basic(u.clone(), p.clone()),
            _ => OciRegistryAuth::Anonymous,
        }
    }
}

/// Result of a successful artifact push.
#[derive(Debug, Clone)]
pub struct PushResult {
    /// URL of the pushed config blob.
    pub config_url: String,
    /// URL of the pushed manifest.
    pub manifest_url: String,
}

/// Write seam between the packaging pipeline and the network.
#[async_trait]
pub trait RegistryWrite: Send + Sync {
    /// Write an assembled image to the registry named by `reference`.
    async fn write(&self, reference: &Reference, artifact: OciArtifact) -> Result<PushResult>;
}

/// Production registry client backed by `oci_distribution::Client`.
pub struct OciRegistryClient {
    client: Client,
    auth: RegistryAuth,
}

impl OciRegistryClient {
    /// Create a client speaking HTTPS (the default).
    pub fn new(auth: RegistryAuth) -> Self {
        Self::with_protocol(auth, ClientProtocol::Https)
    }

    /// Create a client speaking plain HTTP, for local registries.
    pub fn insecure(auth: RegistryAuth) -> Self {
        Self::with_protocol(auth, ClientProtocol::Http)
    }

    fn with_protocol(auth: RegistryAuth, protocol: ClientProtocol) -> Self {
        let config = ClientConfig {
            protocol,
            ..Default::default()
        };
        let client = Client::new(config);
        Self { client, auth }
    }
}

#[async_trait]
impl RegistryWrite for OciRegistryClient {
    async fn write(&self, reference: &Reference, artifact: OciArtifact) -> Result<PushResult> {
        tracing::info!(
            reference = %reference,
            layers = artifact.layers.len(),
            "Pushing artifact to registry"
        );

        let auth = self.auth.to_oci_auth();
        let response: PushResponse = self
            .client
            .push(
                reference,
                &artifact.layers,
                artifact.config,
                &auth,
                Some(artifact.manifest),
            )
            .await
            .map_err(|e| BpackError::RegistryError {
                registry: reference.registry().to_string(),
                message: format!("failed to push image: {}", e),
            })?;

        tracing::info!(
            reference = %reference,
            manifest_url = %response.manifest_url,
            "Artifact pushed successfully"
        );

        Ok(PushResult {
            config_url: response.config_url,
            manifest_url: response.manifest_url,
        })
    }
}

/// Publishes artifacts through an explicitly owned, injected client —
/// no process-wide registry client state.
pub struct ArtifactPusher {
    writer: Box<dyn RegistryWrite>,
}

impl ArtifactPusher {
    /// Create a pusher with the given authentication over HTTPS.
    pub fn new(auth: RegistryAuth) -> Self {
        Self {
            writer: Box::new(OciRegistryClient::new(auth)),
        }
    }

    /// Create a pusher speaking plain HTTP, for local registries.
    pub fn insecure(auth: RegistryAuth) -> Self {
        Self {
            writer: Box::new(OciRegistryClient::insecure(auth)),
        }
    }

    /// Create a pusher around an arbitrary registry writer.
    pub fn with_writer(writer: Box<dyn RegistryWrite>) -> Self {
        Self { writer }
    }

    pub(crate) async fn write(
        &self,
        reference: &Reference,
        artifact: OciArtifact,
    ) -> Result<PushResult> {
        self.writer.write(reference, artifact).await
    }
}
