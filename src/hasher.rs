//! The string hash used for every key.
//!
//! This is the classic multiplicative string hash from CPython's `dict`. It is
//! fast and spreads short identifiers well, but it makes no attempt at
//! collision resistance and must not be exposed to untrusted keys.

const MULTIPLIER: u64 = 1_000_003;

/// Computes the digest of `key`.
///
/// The digest is seeded with the first byte shifted left by seven, folds in
/// every byte with `x = (1000003 * x) ^ b`, and finally mixes in the length.
/// All arithmetic wraps. The empty key hashes to `0`.
///
/// # Examples
///
/// ```rust
/// use strdict::hasher::string_hash;
///
/// assert_eq!(string_hash(b""), 0);
/// assert_eq!(string_hash(b"a"), 12_416_037_344);
/// assert_eq!(string_hash(b"alpha"), string_hash("alpha".as_bytes()));
/// ```
#[inline]
pub fn string_hash(key: &[u8]) -> u64 {
    let mut x = key.first().map_or(0, |&b| u64::from(b) << 7);
    for &b in key {
        x = MULTIPLIER.wrapping_mul(x) ^ u64::from(b);
    }
    x ^ key.len() as u64
}
