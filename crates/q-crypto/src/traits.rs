// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Core cryptographic traits
//!
//! The OTA platform layer never implements a signature scheme itself. It
//! computes the image digest with a [`Hash`] and hands it to whatever
//! [`SignatureVerifier`] the integrator plugs in, so the algorithm can be
//! swapped without touching the update path.

use crate::error::CryptoResult;
use q_common::types::AlgorithmId;
use subtle::ConstantTimeEq;

/// Hash function trait
///
/// Provides both one-shot and incremental hashing.
pub trait Hash: Sized {
    /// Algorithm identifier for this hash function
    const ALGORITHM_ID: AlgorithmId;
    /// Output size in bytes
    const OUTPUT_SIZE: usize;
    /// Block size in bytes
    const BLOCK_SIZE: usize;

    /// Output type
    type Output: AsRef<[u8]> + Clone;

    /// Hash a message in one shot
    fn hash(message: &[u8]) -> Self::Output;

    /// Create a new incremental hasher
    fn new() -> Self;

    /// Update the hasher with data
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the hash
    fn finalize(self) -> Self::Output;

    /// Reset the hasher for reuse
    fn reset(&mut self);
}

/// Code-signing signature verifier
///
/// Verifies a signature over a precomputed image digest. Implementations
/// wrap a concrete scheme (ML-DSA, ECDSA, a secure element call) and must
/// compare in constant time.
pub trait SignatureVerifier {
    /// Signature scheme this verifier checks
    const ALGORITHM_ID: AlgorithmId;

    /// Verify `signature` over `digest` with `public_key`
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` if the signature is valid, `Ok(false)` if invalid.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` if the public key is malformed, or
    /// `CryptoError::InvalidSignature` if the signature cannot be decoded.
    fn verify(&self, digest: &[u8], signature: &[u8], public_key: &[u8]) -> CryptoResult<bool>;
}

/// Constant-time comparison
///
/// Compares two byte slices in constant time to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
