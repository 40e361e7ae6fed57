//! Content hashing for cache-busting filenames.
//!
//! Uses blake3 so fingerprints are stable across platforms and releases.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint(b"body{color:red}"); // -> "a1b2c3d4"
//! ```

/// Number of hex characters embedded in hashed filenames.
pub const FINGERPRINT_LEN: usize = 8;

/// Compute the full 32-byte blake3 digest of `data`.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> [u8; 32] {
    *blake3::hash(data.as_ref()).as_bytes()
}

/// Compute hash and return it as a short hex fingerprint.
///
/// Useful for cache-busting filenames (e.g. `app-a1b2c3d4.js`).
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    let digest = compute(data);
    hex::encode(&digest[..FINGERPRINT_LEN / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_length() {
        assert_eq!(fingerprint("console.log(1)").len(), FINGERPRINT_LEN);
        assert_eq!(fingerprint("").len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint("body{}"), fingerprint("body{}"));
    }

    #[test]
    fn test_fingerprint_sensitive_to_single_byte() {
        assert_ne!(fingerprint("body{color:red}"), fingerprint("body{color:ref}"));
    }

    #[test]
    fn test_fingerprint_is_lowercase_hex() {
        let fp = fingerprint("abc");
        assert!(fp.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
