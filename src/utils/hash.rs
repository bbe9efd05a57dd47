//! Content hashing for stable, content-addressed identifiers.
//!
//! Uses blake3 so ids only depend on bytes, never on process state,
//! hasher seeds or crate versions.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let id = hash::fingerprint("fn main() {}"); // -> "9c1f0a7b2d3e"
//! ```

/// Length (in hex chars) of a fingerprint.
pub const FINGERPRINT_LEN: usize = 12;

/// Compute the full 32-byte blake3 digest of some data.
#[inline]
pub fn digest<T: AsRef<[u8]> + ?Sized>(data: &T) -> [u8; 32] {
    *blake3::hash(data.as_ref()).as_bytes()
}

/// Compute a short hex fingerprint of some data.
///
/// Used as DOM id for code blocks: identical source yields an identical id
/// across runs and machines.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    let mut hex = hex::encode(digest(data));
    hex.truncate(FINGERPRINT_LEN);
    hex
}
