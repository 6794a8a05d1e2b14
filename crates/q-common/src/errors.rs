// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Error types for the Qbitel OTA platform layer
//!
//! This module defines the unified error type that every crate in the
//! workspace converts into. Errors are `Copy`, allocation-free and carry a
//! stable numeric code so they can be reported over constrained links.

use core::fmt;

/// Result type alias for platform-layer operations
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type
///
/// Component crates keep their own finer-grained error enums and map into
/// this one at crate boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Cryptographic Errors (0x01xx)
    // =========================================================================
    /// Invalid cryptographic key format or size
    InvalidKey,
    /// Signature verification failed
    InvalidSignature,
    /// Cryptographic algorithm not supported
    UnsupportedAlgorithm,

    // =========================================================================
    // Storage Errors (0x03xx)
    // =========================================================================
    /// Storage read operation failed
    StorageReadFailed,
    /// Storage write operation failed
    StorageWriteFailed,
    /// Storage erase operation failed
    StorageEraseFailed,
    /// Storage is locked
    StorageLocked,

    // =========================================================================
    // Update Errors (0x04xx)
    // =========================================================================
    /// Update session could not be created
    UpdateCreateFailed,
    /// Update signature verification failed
    UpdateSignatureFailed,
    /// Update already in progress
    UpdateInProgress,
    /// Block lies outside the update image
    UpdateOutOfBounds,
    /// Block is not aligned to the device program granularity
    UpdateUnaligned,
    /// Block could not be committed to storage
    UpdateWriteFailed,
    /// Persisted image state could not be written
    ImageStateWriteFailed,

    // =========================================================================
    // HAL Errors (0x08xx)
    // =========================================================================
    /// Hardware initialization failed
    HardwareInitFailed,
    /// Flash operation failed
    FlashError,

    // =========================================================================
    // Boot Errors (0x0Axx)
    // =========================================================================
    /// Bootloader handoff marker could not be written
    BootHandoffFailed,
    /// Device reset request failed
    ResetFailed,

    // =========================================================================
    // General Errors (0xFFxx)
    // =========================================================================
    /// Buffer is too small for operation
    BufferTooSmall,
    /// Invalid parameter provided
    InvalidParameter,
    /// Resource is busy
    Busy,
    /// Feature not implemented
    NotImplemented,
    /// Internal error (should not occur)
    InternalError,
    /// Invalid state for the operation
    InvalidState,
    /// Generic cryptographic operation error
    CryptoError,
    /// Integrity check failed (checksum, hash, etc.)
    IntegrityCheckFailed,
}

impl Error {
    /// Get the error code for this error
    ///
    /// Error codes are organized by category:
    /// - 0x01xx: Cryptographic errors
    /// - 0x03xx: Storage errors
    /// - 0x04xx: Update errors
    /// - 0x08xx: HAL errors
    /// - 0x0Axx: Boot errors
    /// - 0xFFxx: General errors
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            // Crypto errors (0x01xx)
            Self::InvalidKey => 0x0101,
            Self::InvalidSignature => 0x0102,
            Self::UnsupportedAlgorithm => 0x0106,

            // Storage errors (0x03xx)
            Self::StorageReadFailed => 0x0301,
            Self::StorageWriteFailed => 0x0302,
            Self::StorageEraseFailed => 0x0303,
            Self::StorageLocked => 0x0306,

            // Update errors (0x04xx)
            Self::UpdateCreateFailed => 0x0401,
            Self::UpdateSignatureFailed => 0x0402,
            Self::UpdateInProgress => 0x0406,
            Self::UpdateOutOfBounds => 0x0409,
            Self::UpdateUnaligned => 0x040A,
            Self::UpdateWriteFailed => 0x040B,
            Self::ImageStateWriteFailed => 0x040C,

            // HAL errors (0x08xx)
            Self::HardwareInitFailed => 0x0801,
            Self::FlashError => 0x0802,

            // Boot errors (0x0Axx)
            Self::BootHandoffFailed => 0x0A05,
            Self::ResetFailed => 0x0A06,

            // General errors (0xFFxx)
            Self::BufferTooSmall => 0xFF01,
            Self::InvalidParameter => 0xFF02,
            Self::Busy => 0xFF04,
            Self::NotImplemented => 0xFF06,
            Self::InternalError => 0xFFFF,
            Self::InvalidState => 0xFF07,
            Self::CryptoError => 0xFF08,
            Self::IntegrityCheckFailed => 0xFF0A,
        }
    }

    /// Check if this is a security-critical error
    #[must_use]
    pub const fn is_security_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey
                | Self::InvalidSignature
                | Self::UpdateSignatureFailed
                | Self::IntegrityCheckFailed
        )
    }

    /// Get a short description of the error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid cryptographic key",
            Self::InvalidSignature => "signature verification failed",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
            Self::StorageReadFailed => "storage read failed",
            Self::StorageWriteFailed => "storage write failed",
            Self::StorageEraseFailed => "storage erase failed",
            Self::StorageLocked => "storage locked",
            Self::UpdateCreateFailed => "update session create failed",
            Self::UpdateSignatureFailed => "update signature failed",
            Self::UpdateInProgress => "update in progress",
            Self::UpdateOutOfBounds => "update block out of bounds",
            Self::UpdateUnaligned => "update block unaligned",
            Self::UpdateWriteFailed => "update block write failed",
            Self::ImageStateWriteFailed => "image state write failed",
            Self::HardwareInitFailed => "hardware init failed",
            Self::FlashError => "flash error",
            Self::BootHandoffFailed => "bootloader handoff failed",
            Self::ResetFailed => "device reset failed",
            Self::BufferTooSmall => "buffer too small",
            Self::InvalidParameter => "invalid parameter",
            Self::Busy => "busy",
            Self::NotImplemented => "not implemented",
            Self::InternalError => "internal error",
            Self::InvalidState => "invalid state",
            Self::CryptoError => "crypto error",
            Self::IntegrityCheckFailed => "integrity check failed",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
