use std::collections::HashSet;

use anyhow::Context as _;

use crate::canvas::model::CanvasConfiguration;
use crate::foundation::error::{CanvasError, CanvasResult};

/// Serialize the full configuration, inline asset data included, as pretty JSON.
///
/// Field order follows the model declaration, so equal configurations serialize to equal text.
pub fn serialize(config: &CanvasConfiguration) -> CanvasResult<String> {
    let text = serde_json::to_string_pretty(config).context("serialize canvas configuration")?;
    Ok(text)
}

/// Parse a complete configuration from JSON.
///
/// Unknown fields are ignored. Missing required fields, wrong types and duplicate layer ids
/// fail with [`CanvasError::ConfigurationParse`]; nothing is partially populated.
pub fn deserialize(text: &str) -> CanvasResult<CanvasConfiguration> {
    let config: CanvasConfiguration =
        serde_json::from_str(text).map_err(|e| CanvasError::parse(e.to_string()))?;
    check_unique_ids(&config)?;
    Ok(config)
}

/// Deep-merge a partial JSON object into `config`.
///
/// Objects merge key by key; arrays and scalars replace. On any error `config` is left as it
/// was.
pub fn merge_json(config: &mut CanvasConfiguration, patch: &str) -> CanvasResult<()> {
    let patch: serde_json::Value =
        serde_json::from_str(patch).map_err(|e| CanvasError::parse(e.to_string()))?;
    if !patch.is_object() {
        return Err(CanvasError::parse("merge patch must be a JSON object"));
    }

    let mut merged = serde_json::to_value(&*config).context("serialize canvas configuration")?;
    merge_value(&mut merged, patch);

    let next: CanvasConfiguration =
        serde_json::from_value(merged).map_err(|e| CanvasError::parse(e.to_string()))?;
    check_unique_ids(&next)?;
    *config = next;
    Ok(())
}

fn merge_value(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            for (k, v) in patch {
                match base.get_mut(&k) {
                    Some(slot) => merge_value(slot, v),
                    None => {
                        base.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

fn check_unique_ids(config: &CanvasConfiguration) -> CanvasResult<()> {
    let mut seen = HashSet::new();
    for layer in config.layers() {
        let id = layer.as_layer().id();
        if !seen.insert(id) {
            return Err(CanvasError::parse(format!("duplicate layer id '{id}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/exchange.rs"]
mod tests;
