use serde_json::{json, Map, Value};

use crate::domain::entity::EnvironmentMap;

/// Name of the synthesized plugin which exposes environment variables to the
/// bundler's substitution mechanism.
pub const ENVIRONMENT_PLUGIN: &str = "environment";

/// Deep-merge `overlay` into `base`.
///
/// Objects are merged key by key, arrays are concatenated with `base`'s items
/// first, and any other value in `overlay` replaces the one in `base`.
pub fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_objects(base, overlay)),
        (Value::Array(mut base), Value::Array(overlay)) => {
            base.extend(overlay);
            Value::Array(base)
        }
        (_, overlay) => overlay,
    }
}

fn merge_objects(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overlay {
        let merged = match base.remove(&key) {
            Some(existing) => merge(existing, value),
            None => value,
        };
        base.insert(key, merged);
    }
    base
}

/// Build the configuration layer holding the environment plugin.
pub fn environment_layer(env: &EnvironmentMap) -> Value {
    json!({
        "plugins": [
            {
                "name": ENVIRONMENT_PLUGIN,
                "options": env,
            }
        ]
    })
}

/// Combine the base configuration, the optional local override and the
/// environment layer, in this order.
pub fn compose(base: Value, overlay: Option<Value>, env: &EnvironmentMap) -> Value {
    let merged = match overlay {
        Some(overlay) => merge(base, overlay),
        None => base,
    };
    merge(merged, environment_layer(env))
}
