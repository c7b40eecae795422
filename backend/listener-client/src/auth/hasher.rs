use md5::{Digest, Md5};

/// Hex MD5 of `salt` followed by `secret`.
///
/// MD5 is fixed by the listener server's handshake; it is a wire constant, not a
/// choice of password hashing.
pub fn compute_digest(salt: &str, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
