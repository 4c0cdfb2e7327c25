//!
//! Swissnum allocation: the unguessable secret segment of every capability.

use rand_core::{OsRng, RngCore};

/// Number of random bytes backing one swissnum (160 bits of entropy).
pub const SWISSNUM_BYTES: usize = 20;

/// Allocates fresh base swissnums. Purely generative; no persistence, no
/// coordination. Disjointness from previously-allocated swissnums rests on
/// entropy alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwissnumAllocator;

impl SwissnumAllocator {
    pub fn new() -> Self {
        SwissnumAllocator
    }

    /// Produces a fresh cryptographically-unguessable swissnum.
    ///
    /// Lowercase hex keeps the token free of `/` and `-`, which are
    /// structural characters in capability URLs and operation suffixes.
    pub fn allocate(&self) -> String {
        let mut bytes = [0u8; SWISSNUM_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
