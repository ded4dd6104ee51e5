//! Registration definition template loading.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{RegdefError, RegdefResult};

/// File name of the template bundled into the binary.
pub const TEMPLATE_FILENAME: &str = "registration_definition.template";

/// Template used when no template path is configured.
pub const BUNDLED_TEMPLATE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/templates/registration_definition.template"
));

/// Template document: field name → placeholder value.
pub type Template = Map<String, Value>;

/// Load and validate the template at `path`.
///
/// The file must hold a JSON object; arrays and scalars are rejected.
pub fn load_template(path: &Path) -> RegdefResult<Template> {
    if !path.exists() {
        return Err(RegdefError::TemplateMissing {
            path: path.to_path_buf(),
        });
    }

    let data = std::fs::read_to_string(path).map_err(|e| RegdefError::TemplateUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_template(&data, path)
}

/// Parse the bundled template.
pub fn bundled_template() -> RegdefResult<Template> {
    let template = parse_template(BUNDLED_TEMPLATE, Path::new(TEMPLATE_FILENAME))?;
    tracing::debug!(fields = template.len(), "using bundled template");
    Ok(template)
}

/// Bundled template unless `path` is given.
pub fn load_template_or_bundled(path: Option<&Path>) -> RegdefResult<Template> {
    match path {
        Some(path) => load_template(path),
        None => bundled_template(),
    }
}

fn parse_template(data: &str, origin: &Path) -> RegdefResult<Template> {
    let value: Value = serde_json::from_str(data).map_err(|e| RegdefError::TemplateCorrupt {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => {
            tracing::debug!(path = %origin.display(), fields = map.len(), "loaded template");
            Ok(map)
        }
        other => Err(RegdefError::TemplateCorrupt {
            path: origin.to_path_buf(),
            message: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
