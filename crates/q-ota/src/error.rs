// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! OTA platform layer error types
//!
//! An [`OtaError`] is a kind plus, where a storage or bootloader call was the
//! cause, the underlying [`HalError`]. Callers match on the kind and log the
//! device error.

use core::fmt;
use q_hal::HalError;

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaErrorKind {
    /// Session could not be created (size, device init or erase)
    CreateFailed,
    /// The storage device is already lent to another session
    SessionAlreadyActive,
    /// Block extends past the declared image or the erased region
    WriteOutOfBounds,
    /// Block offset or length is not a multiple of the program size
    WriteUnaligned,
    /// The device rejected or failed to commit a block
    WriteFailed,
    /// Signature missing, malformed or not matching the image
    SignatureVerificationFailed,
    /// Operation not valid in the current session or image state
    InvalidState,
    /// The image-state record could not be persisted
    ImageStateWriteFailed,
    /// The bootloader handoff marker could not be written
    HandoffFailed,
    /// The device reset request returned
    ResetFailed,
}

impl OtaErrorKind {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::CreateFailed => 0x0401,
            Self::SignatureVerificationFailed => 0x0402,
            Self::SessionAlreadyActive => 0x0406,
            Self::InvalidState => 0x0407,
            Self::WriteOutOfBounds => 0x0409,
            Self::WriteUnaligned => 0x040A,
            Self::WriteFailed => 0x040B,
            Self::ImageStateWriteFailed => 0x040C,
            Self::HandoffFailed => 0x040D,
            Self::ResetFailed => 0x040E,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CreateFailed => "update session create failed",
            Self::SessionAlreadyActive => "update session already active",
            Self::WriteOutOfBounds => "update block out of bounds",
            Self::WriteUnaligned => "update block unaligned",
            Self::WriteFailed => "update block write failed",
            Self::SignatureVerificationFailed => "signature verification failed",
            Self::InvalidState => "invalid state",
            Self::ImageStateWriteFailed => "image state write failed",
            Self::HandoffFailed => "bootloader handoff failed",
            Self::ResetFailed => "device reset failed",
        }
    }
}

/// OTA platform layer error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtaError {
    kind: OtaErrorKind,
    device: Option<HalError>,
}

impl OtaError {
    /// Error without an underlying device error
    #[must_use]
    pub const fn new(kind: OtaErrorKind) -> Self {
        Self { kind, device: None }
    }

    /// Error caused by a failed storage or bootloader call
    #[must_use]
    pub const fn with_device(kind: OtaErrorKind, device: HalError) -> Self {
        Self {
            kind,
            device: Some(device),
        }
    }

    /// Error kind
    #[must_use]
    pub const fn kind(&self) -> OtaErrorKind {
        self.kind
    }

    /// Underlying device error, if any
    #[must_use]
    pub const fn device_error(&self) -> Option<HalError> {
        self.device
    }

    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.kind.code()
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.kind.description()
    }
}

impl From<OtaErrorKind> for OtaError {
    fn from(kind: OtaErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for OtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())?;
        if let Some(device) = self.device {
            write!(f, " (device: {device})")?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OtaError {
    fn format(&self, f: defmt::Formatter) {
        match self.device {
            Some(device) => defmt::write!(
                f,
                "[0x{:04X}] {} (device: 0x{:04X})",
                self.code(),
                self.description(),
                device.code()
            ),
            None => defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description()),
        }
    }
}

impl From<OtaError> for q_common::Error {
    fn from(e: OtaError) -> Self {
        match e.kind {
            OtaErrorKind::CreateFailed => Self::UpdateCreateFailed,
            OtaErrorKind::SessionAlreadyActive => Self::UpdateInProgress,
            OtaErrorKind::WriteOutOfBounds => Self::UpdateOutOfBounds,
            OtaErrorKind::WriteUnaligned => Self::UpdateUnaligned,
            OtaErrorKind::WriteFailed => Self::UpdateWriteFailed,
            OtaErrorKind::SignatureVerificationFailed => Self::UpdateSignatureFailed,
            OtaErrorKind::InvalidState => Self::InvalidState,
            OtaErrorKind::ImageStateWriteFailed => Self::ImageStateWriteFailed,
            OtaErrorKind::HandoffFailed => Self::BootHandoffFailed,
            OtaErrorKind::ResetFailed => Self::ResetFailed,
        }
    }
}

/// Result type for OTA platform layer operations
pub type OtaResult<T> = Result<T, OtaError>;
