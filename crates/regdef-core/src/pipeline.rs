//! End-to-end registration definition build.
//!
//! Stages run strictly in order and the first failure aborts the build:
//!
//! 1. load template
//! 2. resolve repository identity and credentials
//! 3. trust inspection → root key ID
//! 4. public key from the local metadata store
//! 5. vendor key
//! 6. assemble

use std::path::PathBuf;

use crate::assemble::{
    assemble, resolve_username, RegistrationDefinition, ResolvedFields, FIELD_PUBLIC_KEY_ID,
};
use crate::config::BuildConfig;
use crate::error::RegdefResult;
use crate::inspect::{DockerTrustInspector, TrustInspector};
use crate::metadata_store::MetadataStore;
use crate::reference::RepositoryRef;
use crate::root_key::extract_root_key_id;
use crate::template::load_template_or_bundled;
use crate::vendor_key::load_vendor_key;

/// Supplies the registry password when none was given on the command line.
pub trait PasswordPrompt {
    fn prompt_password(&self, username: &str, registry: &str) -> RegdefResult<String>;
}

impl<T: PasswordPrompt + ?Sized> PasswordPrompt for &T {
    fn prompt_password(&self, username: &str, registry: &str) -> RegdefResult<String> {
        (**self).prompt_password(username, registry)
    }
}

/// Inputs for one build.
#[derive(Clone)]
pub struct BuildRequest {
    pub registry: String,
    pub namespace: String,
    pub repository: String,
    pub vendor_key_path: PathBuf,
    pub dockerid: Option<String>,
    pub dockerpass: Option<String>,
}

impl std::fmt::Debug for BuildRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildRequest")
            .field("registry", &self.registry)
            .field("namespace", &self.namespace)
            .field("repository", &self.repository)
            .field("vendor_key_path", &self.vendor_key_path)
            .field("dockerid", &self.dockerid)
            .field("dockerpass", &self.dockerpass.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Registration definition builder with injectable collaborators.
pub struct Pipeline<I, P> {
    config: BuildConfig,
    inspector: I,
    prompt: P,
}

impl<P: PasswordPrompt> Pipeline<DockerTrustInspector, P> {
    /// Pipeline that shells out to the configured docker binary.
    pub fn with_docker(config: BuildConfig, prompt: P) -> Self {
        let inspector = DockerTrustInspector::new(config.docker_bin.clone());
        Self::new(config, inspector, prompt)
    }
}

impl<I: TrustInspector, P: PasswordPrompt> Pipeline<I, P> {
    pub fn new(config: BuildConfig, inspector: I, prompt: P) -> Self {
        Self {
            config,
            inspector,
            prompt,
        }
    }

    /// Run every stage and return the assembled definition.
    pub fn build(&self, request: &BuildRequest) -> RegdefResult<RegistrationDefinition> {
        let template = load_template_or_bundled(self.config.template_path.as_deref())?;

        let repo = RepositoryRef::new(&request.registry, &request.namespace, &request.repository);
        let repository_uri = repo.uri();
        let repository_name = repo.name();

        let username = resolve_username(request.dockerid.as_deref(), &request.namespace);
        let password = match &request.dockerpass {
            Some(password) => password.clone(),
            None => self.prompt.prompt_password(&username, &request.registry)?,
        };

        let metadata = self.inspector.inspect(&repository_uri)?;
        let public_key_id = extract_root_key_id(&metadata, &repository_uri)?;

        let store = MetadataStore::new(&self.config.trust_dir);
        let public_key = store.resolve_public_key(&repository_name, &public_key_id)?;

        let vendor_key = load_vendor_key(&request.vendor_key_path)?;

        let definition = assemble(
            &template,
            &ResolvedFields {
                repository_uri,
                username,
                password,
                public_key_id,
                public_key,
                vendor_key,
            },
        )?;

        let digest = definition.digest()?;
        tracing::info!(
            repository = %repo,
            key_id = definition.get(FIELD_PUBLIC_KEY_ID).unwrap_or_default(),
            digest = %digest,
            "assembled registration definition"
        );

        Ok(definition)
    }
}
