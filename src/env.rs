use std::collections::HashMap;

/// Build a key/value map from `KEY=VALUE` entries.
///
/// Only the first `=` separates key from value, so values may contain `=`.
/// When a key repeats, the last entry wins. Entries without any `=` are
/// skipped.
///
/// Takes an iterator so tests can pass synthetic data instead of the real
/// process environment.
pub fn env_list_to_map<I, S>(entries: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = HashMap::new();
    for entry in entries {
        let entry = entry.as_ref();
        let Some((key, value)) = entry.split_once('=') else {
            tracing::debug!(entry, "skipping environment entry without '='");
            continue;
        };
        map.insert(key.to_string(), value.to_string());
    }
    map
}

/// Snapshot the process environment.
///
/// Variables whose name or value is not valid UTF-8 are left out.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
