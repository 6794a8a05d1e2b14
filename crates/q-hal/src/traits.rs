// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL trait definitions
//!
//! Platform-agnostic storage interface consumed by the OTA platform layer.
//! Addresses are byte offsets relative to the start of the device (or of the
//! partition the device handle represents), not absolute bus addresses.

use crate::error::{HalError, HalResult};

/// Erase-before-write block storage
///
/// Models NOR flash and similar media: a region must be erased before it can
/// be programmed, erase works on `erase_size()` granules, and program works on
/// `program_size()` granules. Every call is synchronous and returns only once
/// the hardware reports completion.
pub trait BlockDevice {
    /// Bring the device up. Called before the first erase/program.
    fn init(&mut self) -> HalResult<()>;

    /// Release the device. Called once when a handle is given back.
    fn deinit(&mut self) -> HalResult<()>;

    /// Read `buffer.len()` bytes starting at `offset`
    ///
    /// Reads have byte granularity.
    fn read(&self, buffer: &mut [u8], offset: u64) -> HalResult<()>;

    /// Program `data` at `offset`
    ///
    /// # Notes
    /// Both `offset` and `data.len()` must be multiples of `program_size()`
    /// and the target region must have been erased.
    fn program(&mut self, data: &[u8], offset: u64) -> HalResult<()>;

    /// Erase `length` bytes starting at `offset`
    ///
    /// # Notes
    /// Both `offset` and `length` must be multiples of `erase_size()`.
    fn erase(&mut self, offset: u64, length: u64) -> HalResult<()>;

    /// Total device size in bytes
    fn size(&self) -> u64;

    /// Erase granularity in bytes
    fn erase_size(&self) -> u64;

    /// Program granularity in bytes
    fn program_size(&self) -> u64;

    /// Value read back from an erased byte
    fn erase_value(&self) -> u8 {
        0xFF
    }

    /// Check that `[offset, offset + length)` is inside the device
    fn check_range(&self, offset: u64, length: u64) -> HalResult<()> {
        match offset.checked_add(length) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(HalError::FlashOutOfBounds),
        }
    }

    /// Check that `[offset, offset + length)` is inside the device and
    /// aligned to `granule`
    fn check_aligned(&self, offset: u64, length: u64, granule: u64) -> HalResult<()> {
        self.check_range(offset, length)?;
        if granule == 0 || offset % granule != 0 || length % granule != 0 {
            return Err(HalError::Misaligned);
        }
        Ok(())
    }

}

/// Round `value` up to the next multiple of `granule`
///
/// Returns `None` on overflow or a zero granule.
#[must_use]
pub const fn round_up(value: u64, granule: u64) -> Option<u64> {
    if granule == 0 {
        return None;
    }
    let rem = value % granule;
    if rem == 0 {
        Some(value)
    } else {
        value.checked_add(granule - rem)
    }
}

#[cfg(test)]
mod tests {
    use super::round_up;

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0, 4096), Some(0));
        assert_eq!(round_up(1, 4096), Some(4096));
        assert_eq!(round_up(4096, 4096), Some(4096));
        assert_eq!(round_up(4097, 4096), Some(8192));
        assert_eq!(round_up(10, 0), None);
        assert_eq!(round_up(u64::MAX, 2), None);
    }
}
