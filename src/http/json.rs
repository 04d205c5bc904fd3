use serde_json::Value;

/// Resolves a dotted path against a JSON value. Numeric segments index into
/// arrays; an empty path yields the root.
#[must_use]
pub fn lookup_path<'json>(root: &'json Value, path: &str) -> Option<&'json Value> {
    let path = path.trim();
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|idx| items.get(idx)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    })
}
