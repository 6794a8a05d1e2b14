// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Image signature and per-session signature context

use core::fmt::Write;

use heapless::{String, Vec};
use q_common::types::AlgorithmId;
use zeroize::Zeroize;

/// Largest signature accepted (ML-DSA-87)
pub const MAX_SIGNATURE_SIZE: usize = AlgorithmId::Dilithium5.max_signature_size();

/// Maximum length of an advertised signature key name
pub const MAX_KEY_NAME_LEN: usize = 32;

/// Code-signing signature delivered with the job document
///
/// Zeroized on drop.
#[derive(Clone, Default)]
pub struct Signature {
    bytes: Vec<u8, MAX_SIGNATURE_SIZE>,
}

impl Signature {
    /// Empty signature
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Copy a signature from a byte slice
    ///
    /// Returns `None` if the slice is longer than `MAX_SIGNATURE_SIZE`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(|bytes| Self { bytes })
    }

    /// Signature bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Signature length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no signature was supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl core::fmt::Debug for Signature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Signature({} bytes)", self.bytes.len())
    }
}

impl Zeroize for Signature {
    fn zeroize(&mut self) {
        self.bytes[..].zeroize();
        self.bytes.clear();
    }
}

impl Drop for Signature {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Block accounting for one session, in reception order
///
/// Blocks can arrive in any order and more than once, so nothing here is
/// hashed. The digest is taken once at close over the image as stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignatureContext {
    blocks: u32,
    bytes: u64,
    highest_end: u64,
}

impl SignatureContext {
    /// Empty context
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: 0,
            bytes: 0,
            highest_end: 0,
        }
    }

    /// Account for an accepted block
    pub fn record(&mut self, offset: u64, len: u64) {
        self.blocks = self.blocks.saturating_add(1);
        self.bytes = self.bytes.saturating_add(len);
        self.highest_end = self.highest_end.max(offset.saturating_add(len));
    }

    /// Blocks accepted so far, duplicates included
    #[must_use]
    pub const fn blocks(&self) -> u32 {
        self.blocks
    }

    /// Bytes accepted so far, duplicates included
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// End offset of the furthest block accepted
    #[must_use]
    pub const fn highest_end(&self) -> u64 {
        self.highest_end
    }
}

/// Signature key name advertised to the job service
///
/// The digest is always SHA3-256; the scheme comes from the verifier, e.g.
/// `sig-sha3-256-dilithium3`.
#[must_use]
pub fn signature_key_name(scheme: AlgorithmId) -> String<MAX_KEY_NAME_LEN> {
    let mut name = String::new();
    let _ = write!(name, "sig-{}-{}", AlgorithmId::Sha3_256.name(), scheme.name());
    name
}
