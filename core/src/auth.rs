use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate an API key. Returns `(full_key, sha256_hash)`.
/// Key format: `dbk_sk_` + 32 random bytes hex-encoded.
pub fn generate_api_key() -> (String, String) {
    let raw = random_hex(32);
    let full_key = format!("dbk_sk_{raw}");
    let hash = hash_token(&full_key);
    (full_key, hash)
}

/// SHA-256 hex digest of a token string.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the first 8 chars after `dbk_sk_` for display/identification.
pub fn key_prefix(full_key: &str) -> String {
    full_key
        .strip_prefix("dbk_sk_")
        .map(|rest| rest.chars().take(8).collect())
        .unwrap_or_default()
}

fn random_hex(bytes: usize) -> String {
    let mut rng = rand::thread_rng();
    let raw: Vec<u8> = (0..bytes).map(|_| rng.r#gen()).collect();
    hex::encode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_hash_matches_token_hash() {
        let (key, hash) = generate_api_key();
        assert!(key.starts_with("dbk_sk_"));
        assert_eq!(hash_token(&key), hash);
    }

    #[test]
    fn key_prefix_strips_scheme() {
        assert_eq!(key_prefix("dbk_sk_abcdef0123456789"), "abcdef01");
        assert_eq!(key_prefix("not-a-key"), "");
    }

    #[test]
    fn generated_keys_carry_a_displayable_prefix() {
        let (key, _) = generate_api_key();
        let prefix = key_prefix(&key);
        assert_eq!(prefix.len(), 8);
        assert!(prefix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(key["dbk_sk_".len()..].starts_with(&prefix));
    }
}
