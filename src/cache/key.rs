//! Key Derivation Module
//!
//! Builds the substrate keys used by the cache. Logical keys are scoped
//! under an instance prefix; request keys are derived deterministically
//! from an endpoint URL and its parameters.

// == Storage Key ==
/// Scopes a logical key under an instance prefix.
pub(crate) fn storage_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

// == Request Key ==
/// Derives a deterministic cache key for an API request.
///
/// The URL is sanitized to `[A-Za-z0-9_]` and, when parameters are
/// present, suffixed with a fingerprint of their JSON encoding. Equal
/// URL and parameters always map to the same key.
///
/// # Arguments
/// * `url` - The endpoint URL or logical request name
/// * `params` - Optional request parameters
///
/// # Returns
/// * `String` - The derived cache key
pub fn request_key(url: &str, params: Option<&serde_json::Value>) -> String {
    let base: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    match params {
        Some(params) => format!("{}_{}", base, fingerprint(&params.to_string())),
        None => base,
    }
}

// == Fingerprint ==
/// 32-bit rolling hash of a string, rendered in base 36.
///
/// Derived keys persist across process restarts, so the hash must be
/// stable across runs and releases; the std hashers make no such
/// guarantee.
fn fingerprint(input: &str) -> String {
    let mut hash: i32 = 0;
    for byte in input.bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(byte as i32);
    }
    to_base36(hash.unsigned_abs())
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}
