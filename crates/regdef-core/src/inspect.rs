//! Trust inspection via `docker trust inspect`.
//!
//! The pipeline only depends on the [`TrustInspector`] trait, so tests can
//! hand it canned metadata instead of spawning a process.

use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RegdefError, RegdefResult};
use crate::template::json_kind;

/// Cap on stderr carried into diagnostics.
const MAX_STDERR_BYTES: usize = 4096;

/// Trust data for one repository, as reported by `docker trust inspect`.
///
/// Members are kept as raw JSON. Their shape is only checked where they are
/// read, so an unexpected `Signers` or `SignedTags` never rejects the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustMetadata {
    #[serde(rename = "Name", default)]
    pub name: Option<Value>,

    #[serde(rename = "SignedTags", default)]
    pub signed_tags: Option<Value>,

    #[serde(rename = "Signers", default)]
    pub signers: Option<Value>,

    #[serde(rename = "AdministrativeKeys", default)]
    pub administrative_keys: Option<Value>,
}

impl TrustMetadata {
    /// Administrative role entries that are JSON objects, in report order.
    pub fn administrative_roles(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.administrative_keys
            .as_ref()
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }
}

fn array_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

/// Source of trust metadata for a repository URI.
pub trait TrustInspector {
    fn inspect(&self, repository_uri: &str) -> RegdefResult<TrustMetadata>;
}

impl<T: TrustInspector + ?Sized> TrustInspector for &T {
    fn inspect(&self, repository_uri: &str) -> RegdefResult<TrustMetadata> {
        (**self).inspect(repository_uri)
    }
}

/// Runs `<docker> trust inspect <uri>` as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct DockerTrustInspector {
    program: String,
}

impl DockerTrustInspector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DockerTrustInspector {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl TrustInspector for DockerTrustInspector {
    fn inspect(&self, repository_uri: &str) -> RegdefResult<TrustMetadata> {
        tracing::debug!(program = %self.program, repository = %repository_uri, "running trust inspect");

        let output = Command::new(&self.program)
            .args(["trust", "inspect", repository_uri])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| RegdefError::InspectionFailed {
                repository: repository_uri.to_string(),
                message: format!("failed to run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            truncate_at_char_boundary(&mut stderr, MAX_STDERR_BYTES);
            return Err(RegdefError::InspectionFailed {
                repository: repository_uri.to_string(),
                message: if stderr.is_empty() {
                    format!("{} trust inspect {}", self.program, output.status)
                } else {
                    format!("{} trust inspect {}: {}", self.program, output.status, stderr)
                },
            });
        }

        parse_inspect_output(&output.stdout, repository_uri)
    }
}

/// Parse `docker trust inspect` stdout: a JSON array whose first element
/// is the repository's trust object.
pub fn parse_inspect_output(stdout: &[u8], repository_uri: &str) -> RegdefResult<TrustMetadata> {
    let malformed = |message: String| RegdefError::MalformedOutput {
        repository: repository_uri.to_string(),
        message,
    };

    let value: Value =
        serde_json::from_slice(stdout).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

    let first = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        Value::Array(_) => return Err(malformed("empty result array".to_string())),
        other => {
            return Err(malformed(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    if !first.is_object() {
        return Err(malformed(format!(
            "expected an object, found {}",
            json_kind(&first)
        )));
    }

    let metadata: TrustMetadata =
        serde_json::from_value(first).map_err(|e| malformed(e.to_string()))?;

    tracing::debug!(
        repository = %repository_uri,
        signers = array_len(metadata.signers.as_ref()),
        signed_tags = array_len(metadata.signed_tags.as_ref()),
        "parsed trust metadata"
    );

    Ok(metadata)
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "acme/widget";

    #[test]
    fn test_parse_docker_output() {
        let stdout = br#"[{
            "Name": "acme/widget",
            "SignedTags": [{"SignedTag": "latest", "Digest": "abc", "Signers": ["alice"]}],
            "Signers": [{"Name": "alice", "Keys": [{"ID": "s1"}]}],
            "AdministrativeKeys": [
                {"Name": "Root", "Keys": [{"ID": "KEY1"}]},
                {"Name": "Repository", "Keys": [{"ID": "REPO1"}]}
            ]
        }]"#;

        let metadata = parse_inspect_output(stdout, URI).unwrap();
        assert_eq!(metadata.name, Some(Value::from("acme/widget")));
        let roles: Vec<_> = metadata.administrative_roles().collect();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0]["Name"], "Root");
    }

    #[test]
    fn test_parse_ignores_unexpected_member_shapes() {
        let stdout = br#"[{
            "Name": ["not", "a", "string"],
            "SignedTags": "none",
            "Signers": {"unexpected": true},
            "AdministrativeKeys": [
                {"Name": 7},
                "stray",
                {"Name": "Root", "Keys": [{"ID": "KEY1"}]}
            ]
        }]"#;

        let metadata = parse_inspect_output(stdout, URI).unwrap();
        assert_eq!(metadata.administrative_roles().count(), 2);
        assert_eq!(
            crate::root_key::extract_root_key_id(&metadata, URI).unwrap(),
            "KEY1"
        );
    }

    #[test]
    fn test_administrative_keys_not_an_array() {
        let stdout = br#"[{"AdministrativeKeys": {"Name": "Root"}}]"#;
        let metadata = parse_inspect_output(stdout, URI).unwrap();
        assert_eq!(metadata.administrative_roles().count(), 0);
    }

    #[test]
    fn test_parse_takes_first_element() {
        let stdout = br#"[{"AdministrativeKeys": []}, "ignored"]"#;
        let metadata = parse_inspect_output(stdout, URI).unwrap();
        assert_eq!(metadata.administrative_keys, Some(Value::Array(vec![])));
    }

    #[test]
    fn test_parse_null_members() {
        let stdout = br#"[{"Name": "acme/widget", "SignedTags": null, "Signers": null}]"#;
        let metadata = parse_inspect_output(stdout, URI).unwrap();
        assert!(metadata.administrative_keys.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for stdout in [
            &b"not json"[..],
            b"[]",
            b"{}",
            b"[42]",
            b"[[]]",
            b"[null]",
        ] {
            let result = parse_inspect_output(stdout, URI);
            assert!(
                matches!(result, Err(RegdefError::MalformedOutput { .. })),
                "{:?}",
                String::from_utf8_lossy(stdout)
            );
        }
    }

    #[test]
    fn test_missing_program_is_inspection_failure() {
        let inspector = DockerTrustInspector::new("regdef-no-such-docker-binary");
        let result = inspector.inspect(URI);
        assert!(matches!(
            result,
            Err(RegdefError::InspectionFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_surfaces_stderr() {
        // `sh trust inspect <uri>` fails: `trust` is not a readable script.
        let inspector = DockerTrustInspector::new("sh");
        let err = inspector.inspect(URI).unwrap_err();
        match err {
            RegdefError::InspectionFailed { repository, message } => {
                assert_eq!(repository, URI);
                assert!(message.contains("trust"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncate_multibyte() {
        let mut s = "é".repeat(10);
        truncate_at_char_boundary(&mut s, 5);
        assert_eq!(s, "éé");
    }
}
