//! Repository identity.
//!
//! Maps the `registry` argument onto the URI handed to trust inspection:
//! - `hub` → `namespace/repository`
//! - `docker.io` → `docker.io/namespace/repository`
//! - anything else → `registry/namespace/repository`

/// Target container registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registry {
    /// Docker Hub, addressed without a host prefix.
    Hub,

    /// Docker Hub, addressed explicitly as `docker.io`.
    DockerIo,

    /// Any other registry host or URL, used verbatim.
    Custom(String),
}

impl Registry {
    /// Parse a registry argument. Total: unknown values become `Custom`.
    ///
    /// # Examples
    ///
    /// ```
    /// use regdef_core::Registry;
    ///
    /// assert_eq!(Registry::parse("hub"), Registry::Hub);
    /// assert_eq!(Registry::parse("docker.io"), Registry::DockerIo);
    /// assert!(matches!(Registry::parse("us.icr.io"), Registry::Custom(_)));
    /// ```
    pub fn parse(registry: &str) -> Self {
        match registry {
            "hub" => Self::Hub,
            "docker.io" => Self::DockerIo,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hub => write!(f, "hub"),
            Self::DockerIo => write!(f, "docker.io"),
            Self::Custom(host) => write!(f, "{}", host),
        }
    }
}

impl std::str::FromStr for Registry {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// A repository within a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub registry: Registry,
    pub namespace: String,
    pub repository: String,
}

impl RepositoryRef {
    pub fn new(
        registry: &str,
        namespace: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            registry: Registry::parse(registry),
            namespace: namespace.into(),
            repository: repository.into(),
        }
    }

    /// Repository name without registry, as laid out in the trust metadata store.
    pub fn name(&self) -> String {
        format!("{}/{}", self.namespace, self.repository)
    }

    /// Fully-qualified URI used for trust inspection and the output document.
    pub fn uri(&self) -> String {
        match &self.registry {
            Registry::Hub => self.name(),
            Registry::DockerIo => format!("docker.io/{}", self.name()),
            Registry::Custom(host) => format!("{}/{}", host, self.name()),
        }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}

/// Resolve the repository URI for a registry, namespace and repository.
pub fn resolve_uri(registry: &str, namespace: &str, repository: &str) -> String {
    RepositoryRef::new(registry, namespace, repository).uri()
}
