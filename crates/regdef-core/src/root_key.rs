//! Root key extraction from trust metadata.

use serde_json::Value;

use crate::error::{RegdefError, RegdefResult};
use crate::inspect::TrustMetadata;

/// Administrative role holding the root signing key.
pub const ROOT_ROLE: &str = "Root";

/// Return the first key ID of the first `Root` administrative role that has one.
///
/// Entries are scanned in order. Entries whose `Name` is not the string
/// `"Root"` are skipped whatever their shape. A `Root` entry without any key
/// ID does not end the scan; a later `Root` entry may still supply one.
pub fn extract_root_key_id(metadata: &TrustMetadata, repository: &str) -> RegdefResult<String> {
    metadata
        .administrative_roles()
        .filter(|role| role.get("Name").and_then(Value::as_str) == Some(ROOT_ROLE))
        .flat_map(|role| role.get("Keys").and_then(Value::as_array).into_iter().flatten())
        .find_map(|key| key.get("ID").and_then(Value::as_str).map(str::to_string))
        .inspect(|id| tracing::debug!(repository, key_id = %id, "found root key"))
        .ok_or_else(|| RegdefError::RootKeyNotFound {
            repository: repository.to_string(),
        })
}
