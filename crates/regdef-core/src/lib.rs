//! Registration definition builder for signed container images.
//!
//! This crate resolves the trust material of a container repository and
//! assembles it into a registration definition document:
//!
//! - Template loading and validation
//! - Trust inspection (`docker trust inspect`) and root key extraction
//! - Public key lookup in the local trust metadata store
//! - Vendor key loading
//! - Deterministic JSON assembly
//!
//! # Quick Start
//!
//! ```no_run
//! use regdef_core::{BuildConfig, BuildRequest, PasswordPrompt, Pipeline, RegdefResult};
//!
//! struct NoPrompt;
//!
//! impl PasswordPrompt for NoPrompt {
//!     fn prompt_password(&self, _: &str, _: &str) -> RegdefResult<String> {
//!         Ok(String::new())
//!     }
//! }
//!
//! # fn example() -> RegdefResult<()> {
//! let pipeline = Pipeline::with_docker(BuildConfig::from_env(), NoPrompt);
//! let definition = pipeline.build(&BuildRequest {
//!     registry: "docker.io".into(),
//!     namespace: "acme".into(),
//!     repository: "widget".into(),
//!     vendor_key_path: "vendor.pub".into(),
//!     dockerid: None,
//!     dockerpass: Some("secret".into()),
//! })?;
//! println!("{}", definition.to_canonical_string()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `REGDEF_TEMPLATE` | Template path (default: the bundled template) |
//! | `DOCKER_CONFIG` | Docker config directory holding the trust store (default: `~/.docker`) |
//! | `REGDEF_DOCKER_BIN` | Docker executable (default: `docker`) |

pub mod assemble;
pub mod config;
pub mod error;
pub mod inspect;
pub mod metadata_store;
pub mod pipeline;
pub mod reference;
pub mod root_key;
pub mod template;
pub mod vendor_key;

// Re-export main types
pub use assemble::{
    assemble, resolve_username, RegistrationDefinition, ResolvedFields, REQUIRED_FIELDS,
};
pub use config::{default_output_path, BuildConfig, DEFAULT_OUTPUT_FILENAME};
pub use error::{RegdefError, RegdefResult};
pub use inspect::{
    parse_inspect_output, DockerTrustInspector, TrustInspector, TrustMetadata,
};
pub use metadata_store::{resolve_public_key, MetadataStore, StoreEntry};
pub use pipeline::{BuildRequest, PasswordPrompt, Pipeline};
pub use reference::{resolve_uri, Registry, RepositoryRef};
pub use root_key::{extract_root_key_id, ROOT_ROLE};
pub use template::{
    bundled_template, load_template, load_template_or_bundled, Template, BUNDLED_TEMPLATE,
    TEMPLATE_FILENAME,
};
pub use vendor_key::load_vendor_key;
