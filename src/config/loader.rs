//! Configuration loading and environment parsing.

use super::Config;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load configuration with the following precedence (highest first):
/// 1) The direct `PORT`, `HOST`, and `WS_PATH` environment variables
/// 2) Environment overrides with prefix `DRAFTROOM__`, using `__` as a nested
///    separator (e.g. `DRAFTROOM__LOGGING__LEVEL=debug`)
/// 3) File pointed at by the `DRAFTROOM_CONFIG_PATH` env var
/// 4) `config.json` in the current working directory
/// 5) Defaults compiled into the binary
///
/// Any errors while reading or parsing a source are printed to stderr and
/// that source is skipped; `load()` always returns a usable `Config`.
#[must_use]
pub fn load() -> Config {
    use std::env;
    use std::path::PathBuf;

    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    // config.json in CWD, then an explicitly configured path on top
    merge_file_source(&mut merged, &PathBuf::from("config.json"));
    if let Ok(path) = env::var("DRAFTROOM_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    apply_env_overrides(&mut merged);
    apply_direct_env_vars(&mut merged);

    match serde_json::from_value::<Config>(merged) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to deserialize config; using defaults: {err}");
            defaults
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(value) => merge_values(target, value),
            Err(err) => {
                eprintln!("Failed to parse config from {}: {}", path.display(), err);
            }
        },
        Err(err) => {
            eprintln!("Failed to read config from {}: {}", path.display(), err);
        }
    }
}

/// Recursively overlay `source` onto `target`; objects merge key-wise,
/// everything else replaces.
fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => {
            *target_slot = source_value;
        }
    }
}

fn apply_env_overrides(root: &mut Value) {
    for (key, raw_value) in std::env::vars() {
        let Some(stripped) = key.strip_prefix("DRAFTROOM__") else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if segments.is_empty() {
            continue;
        }

        set_nested_value(root, &segments, parse_scalar(raw_value.trim()));
    }
}

/// The original deployment knobs, kept for compatibility: `PORT`, `HOST`,
/// and `WS_PATH` override everything else.
fn apply_direct_env_vars(root: &mut Value) {
    if let Ok(port) = std::env::var("PORT") {
        if !port.trim().is_empty() {
            set_nested_value(root, &["port".to_string()], parse_scalar(port.trim()));
        }
    }
    if let Ok(host) = std::env::var("HOST") {
        if !host.trim().is_empty() {
            set_nested_value(root, &["host".to_string()], Value::String(host));
        }
    }
    if let Ok(ws_path) = std::env::var("WS_PATH") {
        if !ws_path.trim().is_empty() {
            set_nested_value(root, &["ws_path".to_string()], Value::String(ws_path));
        }
    }
}

/// Interpret an env value as JSON when possible (numbers, booleans, null),
/// falling back to a plain string.
fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    let map = ensure_object(target);
    if rest.is_empty() {
        map.insert(head.clone(), value);
        return;
    }

    let entry = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    set_nested_value(entry, rest, value);
}

fn ensure_object(value: &mut Value) -> &mut serde_json::Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(serde_json::Map::new());
    }

    match value.as_object_mut() {
        Some(map) => map,
        // Unreachable: the branch above coerced `value` into an object.
        None => unreachable!("value was just coerced into an object"),
    }
}
