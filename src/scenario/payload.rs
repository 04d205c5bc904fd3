use rand::seq::SliceRandom;
use serde_json::{Value, json};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random `[a-z0-9]` string of `len` characters.
#[must_use]
pub fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .filter_map(|_| ALPHABET.choose(&mut rng).map(|byte| char::from(*byte)))
        .collect()
}

/// `{"name": "<prefix> <random8>"}`.
#[must_use]
pub fn role_payload(prefix: &str) -> Value {
    json!({ "name": format!("{} {}", prefix, random_string(8)) })
}
