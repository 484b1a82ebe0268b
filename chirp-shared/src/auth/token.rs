/// Opaque token generation
///
/// Session bearer tokens and anti-forgery tokens are 32 random bytes,
/// hex-encoded to 64 characters. Tokens carry no structure; identity is
/// resolved by looking the token up in the `sessions` table, which is what
/// makes server-side revocation on logout possible.
///
/// # Example
///
/// ```
/// use chirp_shared::auth::token::{generate_token, TOKEN_LENGTH};
///
/// let token = generate_token();
/// assert_eq!(token.len(), TOKEN_LENGTH);
/// assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
/// ```

use rand::{rngs::OsRng, RngCore};

/// Number of random bytes per token
const TOKEN_BYTES: usize = 32;

/// Length of a hex-encoded token (characters)
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// Generates a new opaque token
///
/// Uses the OS RNG for cryptographic randomness. Token space: 2^256.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length() {
        assert_eq!(generate_token().len(), TOKEN_LENGTH);
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_is_hex() {
        assert!(generate_token().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
