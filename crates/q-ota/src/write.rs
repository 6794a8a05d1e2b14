// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Block write path
//!
//! Turns one accepted block into `program()` calls of at most
//! `OtaConfig::program_chunk_size` bytes. A call returns only after every
//! chunk has been programmed (and, with `verify_writes`, read back), so an
//! acknowledged block is on the medium. Nothing is cached.
//!
//! Alignment is checked by the caller. The one unaligned block let through is
//! the final block of an image whose size is not a multiple of the program
//! size; its last partial unit is padded with the erase value.

use q_common::config::OtaConfig;
use q_crypto::constant_time_eq;
use q_hal::{BlockDevice, HalError, HalResult};
use zeroize::Zeroize;

/// Largest program unit a padded tail can be staged for
pub const MAX_PROGRAM_UNIT: usize = 512;

/// Bytes per `program()` call for a device with program unit `unit`
///
/// The configured chunk size rounded down to a whole number of units, and
/// never less than one unit.
#[must_use]
pub fn chunk_size(config: &OtaConfig, unit: u64) -> u64 {
    let configured = config.program_chunk_size as u64;
    (configured - configured % unit).max(unit)
}

/// Program `data` at `offset`
///
/// `offset` must be aligned to the device program size. `data` may end in a
/// partial unit, which is padded.
///
/// # Errors
///
/// Returns the device error of the first chunk that fails, or
/// `FlashVerifyFailed` if a chunk reads back differently.
pub fn program_block<D: BlockDevice>(
    device: &mut D,
    config: &OtaConfig,
    offset: u64,
    data: &[u8],
) -> HalResult<()> {
    let unit = device.program_size();
    if unit == 0 {
        return Err(HalError::Misaligned);
    }

    let body_len = data.len() - data.len() % unit as usize;
    let (body, tail) = data.split_at(body_len);

    let step = chunk_size(config, unit) as usize;
    let mut at = offset;
    for chunk in body.chunks(step) {
        program_chunk(device, config, at, chunk)?;
        at += chunk.len() as u64;
    }

    if !tail.is_empty() {
        let unit = unit as usize;
        if unit > MAX_PROGRAM_UNIT {
            return Err(HalError::NotSupported);
        }
        let mut padded = [device.erase_value(); MAX_PROGRAM_UNIT];
        padded[..tail.len()].copy_from_slice(tail);
        program_chunk(device, config, at, &padded[..unit])?;
    }

    Ok(())
}

fn program_chunk<D: BlockDevice>(
    device: &mut D,
    config: &OtaConfig,
    offset: u64,
    chunk: &[u8],
) -> HalResult<()> {
    device.program(chunk, offset)?;

    if config.verify_writes && !reads_back(device, offset, chunk, config.readback_chunk_size)? {
        return Err(HalError::FlashVerifyFailed);
    }
    Ok(())
}

/// Compare device contents at `offset` with `expected` in constant time
fn reads_back<D: BlockDevice>(
    device: &D,
    offset: u64,
    expected: &[u8],
    chunk: usize,
) -> HalResult<bool> {
    let mut scratch = [0u8; OtaConfig::MAX_READBACK_CHUNK];
    let chunk = chunk.clamp(1, scratch.len());

    let mut compare = || -> HalResult<bool> {
        let mut at = offset;
        for part in expected.chunks(chunk) {
            let buf = &mut scratch[..part.len()];
            device.read(buf, at)?;
            if !constant_time_eq(buf, part) {
                return Ok(false);
            }
            at += part.len() as u64;
        }
        Ok(true)
    };
    let result = compare();

    scratch.zeroize();
    result
}
