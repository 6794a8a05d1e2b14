// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hash function implementations
//!
//! SHA3-256, used for the update image digest. no_std, backed by the sha3
//! crate.

use crate::traits::Hash;
use q_common::types::AlgorithmId;
use sha3::{Digest, Sha3_256 as Sha3_256Impl};
use zeroize::Zeroize;

/// SHA3-256 hash output
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Sha3_256Output([u8; 32]);

impl Sha3_256Output {
    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw digest
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl core::fmt::Debug for Sha3_256Output {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Sha3_256Output {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha3_256Output {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Zeroize for Sha3_256Output {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// SHA3-256 hasher
pub struct Sha3_256 {
    inner: Sha3_256Impl,
}

impl Hash for Sha3_256 {
    const ALGORITHM_ID: AlgorithmId = AlgorithmId::Sha3_256;
    const OUTPUT_SIZE: usize = 32;
    const BLOCK_SIZE: usize = 136; // SHA3-256 rate

    type Output = Sha3_256Output;

    fn hash(message: &[u8]) -> Self::Output {
        let result = Sha3_256Impl::digest(message);
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Sha3_256Output(output)
    }

    fn new() -> Self {
        Self {
            inner: Sha3_256Impl::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize(self) -> Self::Output {
        let result = self.inner.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Sha3_256Output(output)
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.inner);
    }
}

impl Default for Sha3_256 {
    fn default() -> Self {
        Self::new()
    }
}
