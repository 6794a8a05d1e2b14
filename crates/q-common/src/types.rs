// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Core identifiers shared across the OTA platform layer

use core::fmt;

/// Algorithm identifier for code-signing and digest algorithms
///
/// The numeric values match the wire identifiers used elsewhere in EdgeOS so
/// that a job document's algorithm byte can be mapped directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlgorithmId {
    // =========================================================================
    // Signature Schemes - Lattice-based (0x10-0x1F)
    // =========================================================================
    /// ML-DSA-44 (Dilithium2)
    Dilithium2 = 0x10,
    /// ML-DSA-65 (Dilithium3) - Recommended
    Dilithium3 = 0x11,
    /// ML-DSA-87 (Dilithium5)
    Dilithium5 = 0x12,

    // =========================================================================
    // Signature Schemes (0x20-0x2F)
    // =========================================================================
    /// FN-DSA-512 (Falcon-512)
    Falcon512 = 0x20,

    // =========================================================================
    // Classical Algorithms (0x80-0x8F)
    // =========================================================================
    /// ECDSA with P-256 curve
    EcdsaP256 = 0x80,
    /// Ed25519 signature scheme
    Ed25519 = 0x82,

    // =========================================================================
    // Hash Functions (0xA0-0xAF)
    // =========================================================================
    /// SHA3-256
    Sha3_256 = 0xA0,

    // =========================================================================
    // Unknown/Reserved (0xFF)
    // =========================================================================
    /// Unknown algorithm
    Unknown = 0xFF,
}

impl AlgorithmId {
    /// Create from raw byte value
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x10 => Self::Dilithium2,
            0x11 => Self::Dilithium3,
            0x12 => Self::Dilithium5,
            0x20 => Self::Falcon512,
            0x80 => Self::EcdsaP256,
            0x82 => Self::Ed25519,
            0xA0 => Self::Sha3_256,
            _ => Self::Unknown,
        }
    }

    /// Lower-case algorithm name as it appears in job documents
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dilithium2 => "dilithium2",
            Self::Dilithium3 => "dilithium3",
            Self::Dilithium5 => "dilithium5",
            Self::Falcon512 => "falcon512",
            Self::EcdsaP256 => "ecdsa-p256",
            Self::Ed25519 => "ed25519",
            Self::Sha3_256 => "sha3-256",
            Self::Unknown => "unknown",
        }
    }

    /// Maximum signature size in bytes for signature algorithms
    ///
    /// Returns 0 for non-signature identifiers.
    #[must_use]
    pub const fn max_signature_size(&self) -> usize {
        match self {
            Self::Dilithium2 => 2420,
            Self::Dilithium3 => 3309,
            Self::Dilithium5 => 4627,
            Self::Falcon512 => 666,
            Self::EcdsaP256 => 72,
            Self::Ed25519 => 64,
            Self::Sha3_256 | Self::Unknown => 0,
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_roundtrip_from_u8() {
        for id in [
            AlgorithmId::Dilithium2,
            AlgorithmId::Dilithium3,
            AlgorithmId::Dilithium5,
            AlgorithmId::Falcon512,
            AlgorithmId::EcdsaP256,
            AlgorithmId::Ed25519,
            AlgorithmId::Sha3_256,
        ] {
            assert_eq!(AlgorithmId::from_u8(id as u8), id);
        }
        assert_eq!(AlgorithmId::from_u8(0x42), AlgorithmId::Unknown);
    }

    #[test]
    fn test_signature_sizes_only_for_signatures() {
        assert!(AlgorithmId::Dilithium5.max_signature_size() >= AlgorithmId::Dilithium3.max_signature_size());
        assert_eq!(AlgorithmId::Sha3_256.max_signature_size(), 0);
        assert_eq!(AlgorithmId::Unknown.max_signature_size(), 0);
    }
}
