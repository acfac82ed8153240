//! Canonical constraint-graph fingerprints.
//!
//! A bind pass is idempotent when rebinding leaves the same constraint graph
//! behind. The graph is snapshotted as JSON (bone name to constraint stack),
//! canonicalized (sorted keys, no whitespace) and hashed with BLAKE3:
//!
//! ```text
//! fingerprint = hex(BLAKE3(canonical(snapshot)))
//! ```

use serde_json::{Map, Value};

use crate::host::ArmatureHost;

/// Snapshot of every non-empty constraint stack, keyed by bone name.
pub fn constraint_graph_snapshot<H>(host: &H) -> Result<Value, serde_json::Error>
where
    H: ArmatureHost + ?Sized,
{
    let mut graph = Map::new();
    for bone in host.bone_names() {
        let constraints = host.constraints(&bone);
        if constraints.is_empty() {
            continue;
        }
        graph.insert(bone.clone(), serde_json::to_value(constraints)?);
    }
    Ok(Value::Object(graph))
}

/// 64-character lowercase hex BLAKE3 hash of the canonical snapshot.
pub fn constraint_graph_fingerprint<H>(host: &H) -> Result<String, serde_json::Error>
where
    H: ArmatureHost + ?Sized,
{
    let snapshot = constraint_graph_snapshot(host)?;
    Ok(canonical_value_hash(&snapshot))
}

/// BLAKE3 hash of a canonicalized JSON value.
pub fn canonical_value_hash(value: &Value) -> String {
    let canonical = canonicalize_json(value);
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Deterministic JSON rendering: object keys sorted, no whitespace.
pub fn canonicalize_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => Value::String(s.clone()).to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonicalize_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(obj) => {
            let mut entries: Vec<(&String, &Value)> = obj.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let pairs: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        Value::String(k.clone()),
                        canonicalize_json(v)
                    )
                })
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // Integral floats hash like integers, so 1.0 and 1 agree.
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => format!("{}", f),
        None => "null".to_string(),
    }
}
