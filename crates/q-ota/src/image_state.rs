// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Persisted image state
//!
//! The state of the most recently received image lives in a single 16-byte
//! record at offset 0 of a dedicated erase sector:
//!
//! ```text
//! 0..4    magic "QIMS" (0x514D_4953, LE)
//! 4       format version
//! 5       state byte
//! 6       !state byte
//! 7       reserved (0xFF)
//! 8..12   write sequence number (LE)
//! 12..16  CRC-32 over bytes 0..12 (LE)
//! ```
//!
//! Updating the record is erase-then-program. A power cut between the two
//! leaves a blank sector, and a cut during the program leaves a record whose
//! CRC or complement byte does not match. Both read back as `Aborted`, so an
//! interrupted update of the record can never promote an image.

use core::fmt;

use q_hal::{round_up, BlockDevice, HalError};

use crate::error::{OtaError, OtaErrorKind, OtaResult};

/// Record magic ("QIMS")
pub const RECORD_MAGIC: u32 = 0x514D_4953;

/// Record format version
pub const RECORD_VERSION: u8 = 1;

/// Encoded record size in bytes
pub const RECORD_SIZE: usize = 16;

/// Largest device program unit the record can be padded to
pub const MAX_RECORD_PROGRAM_SIZE: usize = 512;

/// State of the most recently received image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ImageState {
    /// Image confirmed by the running application's self-test
    Valid = 1,
    /// Image received and verified; waiting for self-test after reboot
    PendingCommit = 2,
    /// Image rejected; must not be booted
    Aborted = 3,
}

impl ImageState {
    /// Decode a state byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Valid),
            2 => Some(Self::PendingCommit),
            3 => Some(Self::Aborted),
            _ => None,
        }
    }

    /// Whether a bootloader may boot an image in this state
    #[must_use]
    pub const fn is_bootable(&self) -> bool {
        matches!(self, Self::Valid | Self::PendingCommit)
    }

    /// Get state name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::PendingCommit => "pending-commit",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for ImageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stored record was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFault {
    /// The record could not be read
    Device(HalError),
    /// Sector is erased; no state was ever written or the write was cut
    Blank,
    /// Magic number mismatch
    BadMagic,
    /// Unsupported format version
    BadVersion,
    /// CRC mismatch
    BadCrc,
    /// State byte and its complement disagree
    BadComplement,
    /// State byte is not a known state
    UnknownState(u8),
}

impl fmt::Display for RecordFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "read failed: {e}"),
            Self::Blank => f.write_str("blank record"),
            Self::BadMagic => f.write_str("bad magic"),
            Self::BadVersion => f.write_str("unsupported version"),
            Self::BadCrc => f.write_str("crc mismatch"),
            Self::BadComplement => f.write_str("complement mismatch"),
            Self::UnknownState(b) => write!(f, "unknown state 0x{b:02X}"),
        }
    }
}

/// Decoded image-state record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageStateRecord {
    /// Stored state
    pub state: ImageState,
    /// Incremented on every write
    pub sequence: u32,
}

impl ImageStateRecord {
    /// Encode to the on-flash layout
    #[must_use]
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0xFFu8; RECORD_SIZE];
        bytes[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        bytes[4] = RECORD_VERSION;
        bytes[5] = self.state as u8;
        bytes[6] = !(self.state as u8);
        bytes[8..12].copy_from_slice(&self.sequence.to_le_bytes());
        let crc = compute_crc32(&bytes[..12]);
        bytes[12..16].copy_from_slice(&crc.to_le_bytes());
        bytes
    }

    /// Decode and validate the on-flash layout
    ///
    /// # Errors
    ///
    /// Returns the first check the record fails.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Result<Self, RecordFault> {
        if bytes.iter().all(|&b| b == 0xFF) {
            return Err(RecordFault::Blank);
        }
        if read_u32(bytes, 0) != RECORD_MAGIC {
            return Err(RecordFault::BadMagic);
        }
        if bytes[4] != RECORD_VERSION {
            return Err(RecordFault::BadVersion);
        }
        if read_u32(bytes, 12) != compute_crc32(&bytes[..12]) {
            return Err(RecordFault::BadCrc);
        }
        if bytes[6] != !bytes[5] {
            return Err(RecordFault::BadComplement);
        }
        let state = ImageState::from_u8(bytes[5]).ok_or(RecordFault::UnknownState(bytes[5]))?;

        Ok(Self {
            state,
            sequence: read_u32(bytes, 8),
        })
    }
}

fn read_u32(bytes: &[u8; RECORD_SIZE], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Image state tracker
///
/// Owns the storage holding the image-state record. Independent of any
/// update session; the running application reads and confirms through it
/// after a reboot.
pub struct ImageStateTracker<S> {
    storage: S,
    ready: bool,
}

impl<S: BlockDevice> ImageStateTracker<S> {
    /// Create a tracker over a dedicated state partition
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            ready: false,
        }
    }

    /// Borrow the underlying storage
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Read and validate the stored record
    ///
    /// # Errors
    ///
    /// Returns why the record was rejected.
    pub fn read_record(&self) -> Result<ImageStateRecord, RecordFault> {
        let mut bytes = [0u8; RECORD_SIZE];
        self.storage
            .read(&mut bytes, 0)
            .map_err(RecordFault::Device)?;
        ImageStateRecord::decode(&bytes)
    }

    /// Stored state, `Aborted` when the record is missing or inconsistent
    pub fn get(&self) -> ImageState {
        self.read_record().map_or(ImageState::Aborted, |r| r.state)
    }

    /// Persist `state`
    ///
    /// Erases the record sector, programs one record padded to the device
    /// program size, then reads it back.
    ///
    /// # Errors
    ///
    /// Returns `ImageStateWriteFailed` with the device error if any step
    /// fails or the read-back record does not decode to `state`.
    pub fn set(&mut self, state: ImageState) -> OtaResult<ImageStateRecord> {
        let fail = |e: HalError| OtaError::with_device(OtaErrorKind::ImageStateWriteFailed, e);

        if !self.ready {
            self.storage.init().map_err(fail)?;
            self.ready = true;
        }

        let record = ImageStateRecord {
            state,
            sequence: self
                .read_record()
                .map_or(0, |r| r.sequence.wrapping_add(1)),
        };

        let unit = round_up(RECORD_SIZE as u64, self.storage.program_size())
            .filter(|&n| n <= MAX_RECORD_PROGRAM_SIZE as u64)
            .ok_or_else(|| fail(HalError::NotSupported))? as usize;

        let mut buffer = [0xFFu8; MAX_RECORD_PROGRAM_SIZE];
        buffer[..RECORD_SIZE].copy_from_slice(&record.encode());

        self.storage
            .erase(0, self.storage.erase_size())
            .map_err(fail)?;
        self.storage.program(&buffer[..unit], 0).map_err(fail)?;

        match self.read_record() {
            Ok(stored) if stored == record => Ok(record),
            Err(RecordFault::Device(e)) => Err(fail(e)),
            _ => Err(fail(HalError::FlashVerifyFailed)),
        }
    }
}

// ============================================================================
// CRC32 Implementation
// ============================================================================

/// Compute CRC32 (IEEE 802.3 polynomial)
fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = generate_crc32_table();

    let mut crc = 0xFFFF_FFFFu32;

    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }

    !crc
}

/// Generate CRC32 lookup table at compile time
const fn generate_crc32_table() -> [u32; 256] {
    const POLYNOMIAL: u32 = 0xEDB8_8320;
    let mut table = [0u32; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }

    table
}

// ============================================================================
// Tests
// ============================================================================
