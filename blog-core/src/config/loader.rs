use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Parse `path` as YAML and merge its flattened keys into `values`.
/// A missing file is not an error; profiles are optional.
pub(crate) fn merge_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    merge_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

pub(crate) fn merge_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten(String::new(), &yaml, values);
    Ok(())
}

/// Overlay process environment variables: `DATABASE_URL` becomes `database.url`.
pub(crate) fn merge_env(values: &mut HashMap<String, ConfigValue>) {
    for (env_key, env_val) in std::env::vars() {
        let key = env_key.to_lowercase().replace('_', ".");
        values.insert(key, ConfigValue::String(env_val));
    }
}

/// Flatten nested mappings into dot-separated keys. Sequences stay whole.
fn flatten(prefix: String, value: &serde_yaml::Value, out: &mut HashMap<String, ConfigValue>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => format!("{other:?}"),
                };
                let key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten(key, v, out);
            }
        }
        leaf if !prefix.is_empty() => {
            out.insert(prefix, ConfigValue::from_yaml(leaf));
        }
        _ => {}
    }
}
