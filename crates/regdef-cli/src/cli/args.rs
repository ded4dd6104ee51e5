use clap::Parser;
use std::path::PathBuf;

use regdef_core::{BuildConfig, BuildRequest};

#[derive(Parser, Debug)]
#[command(
    name = "regdef",
    version,
    about = "Build a Hyper Protect Virtual Server registration definition file"
)]
pub struct Cli {
    /// Target container registry: `hub`, `docker.io`, or the registry's URL
    pub registry: String,

    /// Target namespace within the container registry
    pub namespace: String,

    /// Name of the target container repository
    pub repository: String,

    /// Path of the vendor public key that was used to sign the image
    pub path_to_signing_key: PathBuf,

    /// Userid to access the container registry (default: NAMESPACE)
    #[arg(long)]
    pub dockerid: Option<String>,

    /// Password to access the container registry (prompted if omitted)
    #[arg(long)]
    pub dockerpass: Option<String>,

    /// Path to write the output JSON (default: $PWD/hpvs-fhe-registration.txt)
    #[arg(long)]
    pub outputfile: Option<PathBuf>,

    /// Registration definition template [env: REGDEF_TEMPLATE]
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Docker config directory holding the trust metadata store [env: DOCKER_CONFIG]
    #[arg(long)]
    pub trust_dir: Option<PathBuf>,

    /// Docker executable used for `trust inspect` [env: REGDEF_DOCKER_BIN]
    #[arg(long)]
    pub docker_bin: Option<String>,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn build_config(&self) -> BuildConfig {
        let mut config = BuildConfig::from_env();
        if let Some(template) = &self.template {
            config = config.with_template_path(template);
        }
        if let Some(dir) = &self.trust_dir {
            config = config.with_trust_dir(dir);
        }
        if let Some(bin) = &self.docker_bin {
            config = config.with_docker_bin(bin);
        }
        config
    }

    pub fn request(&self) -> BuildRequest {
        BuildRequest {
            registry: self.registry.clone(),
            namespace: self.namespace.clone(),
            repository: self.repository.clone(),
            vendor_key_path: self.path_to_signing_key.clone(),
            dockerid: self.dockerid.clone(),
            dockerpass: self.dockerpass.clone(),
        }
    }
}
