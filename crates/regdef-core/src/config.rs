//! Pipeline configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// File name used when no output path is given.
pub const DEFAULT_OUTPUT_FILENAME: &str = "hpvs-fhe-registration.txt";

/// Locations of everything the pipeline reads.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Registration definition template; the bundled template when unset.
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    /// Root of the local trust metadata store.
    #[serde(default = "default_trust_dir")]
    pub trust_dir: PathBuf,

    /// Program used for `trust inspect`.
    #[serde(default = "default_docker_bin")]
    pub docker_bin: String,
}

fn default_trust_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".docker"))
        .unwrap_or_else(|| PathBuf::from(".docker"))
}

fn default_docker_bin() -> String {
    "docker".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            trust_dir: default_trust_dir(),
            docker_bin: default_docker_bin(),
        }
    }
}

impl BuildConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `REGDEF_TEMPLATE` | Template file path |
    /// | `DOCKER_CONFIG` | Docker config directory holding the trust store |
    /// | `REGDEF_DOCKER_BIN` | Docker executable |
    pub fn from_env() -> Self {
        Self {
            template_path: std::env::var_os("REGDEF_TEMPLATE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            trust_dir: std::env::var_os("DOCKER_CONFIG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_trust_dir),
            docker_bin: std::env::var("REGDEF_DOCKER_BIN")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_docker_bin),
        }
    }

    /// Set the template path.
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Set the trust metadata store root.
    pub fn with_trust_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trust_dir = dir.into();
        self
    }

    /// Set the docker executable.
    pub fn with_docker_bin(mut self, bin: impl Into<String>) -> Self {
        self.docker_bin = bin.into();
        self
    }
}

/// Default output path: `$PWD/hpvs-fhe-registration.txt`.
pub fn default_output_path() -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_OUTPUT_FILENAME))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_FILENAME))
}
