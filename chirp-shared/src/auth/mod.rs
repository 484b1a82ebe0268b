/// Authentication primitives for Chirp
///
/// - `password`: Argon2id password hashing and verification
/// - `token`: opaque random tokens for sessions and anti-forgery checks
/// - `middleware`: per-request auth context and anti-forgery checks

pub mod middleware;
pub mod password;
pub mod token;
