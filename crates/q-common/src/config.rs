// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Configuration for the OTA platform layer
//!
//! All configuration is compile-time or provisioned at factory. The platform
//! layer copies its configuration at construction and never changes it.

use crate::errors::Error;
use crate::log::LogLevel;

/// Trace group used by the platform layer when logging
pub const OTA_PAL_COMPONENT: &str = "ota_pal";

/// Block-write and verification configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtaConfig {
    /// Largest single `program()` call issued for one block, in bytes.
    /// Rounded down to the device program size at use.
    pub program_chunk_size: usize,
    /// Chunk size used when streaming the image back for the digest
    pub readback_chunk_size: usize,
    /// Read back and compare every programmed chunk before acknowledging it
    pub verify_writes: bool,
    /// Minimum level recorded in the platform layer's log buffer
    pub log_level: LogLevel,
}

impl OtaConfig {
    /// Upper bound for `readback_chunk_size`; sizes the stack scratch buffer
    pub const MAX_READBACK_CHUNK: usize = 512;

    /// Default configuration
    pub const DEFAULT: Self = Self {
        program_chunk_size: 4096,
        readback_chunk_size: 256,
        verify_writes: true,
        log_level: LogLevel::Info,
    };

    /// Development configuration (verbose logging)
    pub const DEVELOPMENT: Self = Self {
        program_chunk_size: 4096,
        readback_chunk_size: 256,
        verify_writes: true,
        log_level: LogLevel::Debug,
    };

    /// Check the configuration for values the platform layer cannot honour
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if a chunk size is zero or the
    /// read-back chunk exceeds `MAX_READBACK_CHUNK`.
    pub const fn validate(&self) -> Result<(), Error> {
        if self.program_chunk_size == 0 {
            return Err(Error::InvalidParameter);
        }
        if self.readback_chunk_size == 0 || self.readback_chunk_size > Self::MAX_READBACK_CHUNK {
            return Err(Error::InvalidParameter);
        }
        Ok(())
    }
}

impl Default for OtaConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
