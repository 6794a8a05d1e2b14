// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL error types

use core::fmt;

/// HAL error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Hardware not initialized
    NotInitialized,
    /// Hardware initialization failed
    InitFailed,
    /// Flash operation failed
    FlashError,
    /// Flash is locked
    FlashLocked,
    /// Flash address out of bounds
    FlashOutOfBounds,
    /// Flash erase failed
    FlashEraseFailed,
    /// Flash write failed
    FlashWriteFailed,
    /// Flash read failed
    FlashReadFailed,
    /// Flash verify failed
    FlashVerifyFailed,
    /// Flash operation timeout
    FlashTimeout,
    /// Address or length not aligned to the device granularity
    Misaligned,
    /// Invalid parameter
    InvalidParameter,
    /// Hardware busy
    Busy,
    /// Operation not supported
    NotSupported,
    /// Hardware fault detected
    HardwareFault,
}

impl HalError {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::NotInitialized => 0x0801,
            Self::InitFailed => 0x0802,
            Self::FlashError => 0x0810,
            Self::FlashLocked => 0x0811,
            Self::FlashOutOfBounds => 0x0812,
            Self::FlashEraseFailed => 0x0813,
            Self::FlashWriteFailed => 0x0814,
            Self::FlashVerifyFailed => 0x0815,
            Self::FlashTimeout => 0x0816,
            Self::FlashReadFailed => 0x0817,
            Self::Misaligned => 0x0818,
            Self::InvalidParameter => 0x08F0,
            Self::Busy => 0x08F2,
            Self::NotSupported => 0x08FF,
            Self::HardwareFault => 0x08D0,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not initialized",
            Self::InitFailed => "initialization failed",
            Self::FlashError => "flash error",
            Self::FlashLocked => "flash locked",
            Self::FlashOutOfBounds => "flash address out of bounds",
            Self::FlashEraseFailed => "flash erase failed",
            Self::FlashWriteFailed => "flash write failed",
            Self::FlashReadFailed => "flash read failed",
            Self::FlashVerifyFailed => "flash verify failed",
            Self::FlashTimeout => "flash operation timeout",
            Self::Misaligned => "misaligned access",
            Self::InvalidParameter => "invalid parameter",
            Self::Busy => "busy",
            Self::NotSupported => "not supported",
            Self::HardwareFault => "hardware fault detected",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

impl From<HalError> for q_common::Error {
    fn from(e: HalError) -> Self {
        match e {
            HalError::NotInitialized | HalError::InitFailed | HalError::HardwareFault => {
                Self::HardwareInitFailed
            }
            HalError::FlashError | HalError::FlashOutOfBounds | HalError::FlashTimeout => {
                Self::FlashError
            }
            HalError::FlashLocked => Self::StorageLocked,
            HalError::FlashEraseFailed => Self::StorageEraseFailed,
            HalError::FlashWriteFailed => Self::StorageWriteFailed,
            HalError::FlashReadFailed => Self::StorageReadFailed,
            HalError::FlashVerifyFailed => Self::IntegrityCheckFailed,
            HalError::Misaligned | HalError::InvalidParameter => Self::InvalidParameter,
            HalError::Busy => Self::Busy,
            HalError::NotSupported => Self::NotImplemented,
        }
    }
}

/// HAL Result type
pub type HalResult<T> = Result<T, HalError>;
