use std::sync::LazyLock;

use regex::Regex;

use crate::core::keys::generator::tokenize;

/// `-3f9a1c` digest suffix appended by the key generator.
static HASH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-[0-9a-f]{4,16}$").unwrap());

/// Readable default text for a key: `app.checkout.placeOrder` → `Place order`.
pub fn humanize_key(key: &str) -> String {
    let last = key.rsplit('.').next().unwrap_or(key);
    let stem = HASH_SUFFIX.replace(last, "");
    let words = tokenize(&stem).join(" ");
    let words = if words.is_empty() { last.to_string() } else { words };

    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => key.to_string(),
    }
}
