// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Simulated NOR flash
//!
//! A RAM-backed `BlockDevice` with NOR semantics, used on the host to run the
//! OTA platform layer and its tests without hardware.
//!
//! # Characteristics
//!
//! - Erase sets bytes to `0xFF`, `erase_size()` granularity
//! - Program can only clear bits (new = old & data), `program_size()` granularity
//! - Reads have byte granularity and work without `init()`, like memory-mapped flash
//!
//! Faults can be injected to exercise error paths: failing init, erase,
//! program or read calls, and torn programs that stop part-way through.

use crate::error::{HalError, HalResult};
use crate::traits::BlockDevice;

/// Injected fault for the next matching operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `init()` fails with `InitFailed`
    Init,
    /// `erase()` fails with `FlashEraseFailed` before touching memory
    Erase,
    /// `program()` fails with `FlashWriteFailed` before touching memory
    Program,
    /// `program()` writes only the first `n` bytes, then fails (power cut)
    TornProgram(usize),
    /// `program()` reports success but leaves memory untouched
    SilentProgram,
    /// `read()` fails with `FlashReadFailed` until the fault is cleared
    Read,
}

/// Operation counters for assertions in tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Successful `init()` calls
    pub inits: u32,
    /// `deinit()` calls
    pub deinits: u32,
    /// Successful `erase()` calls
    pub erases: u32,
    /// Bytes erased in total
    pub bytes_erased: u64,
    /// Successful `program()` calls
    pub programs: u32,
}

/// RAM-backed NOR flash of `SIZE` bytes
pub struct SimFlash<const SIZE: usize> {
    memory: [u8; SIZE],
    erase_size: u64,
    program_size: u64,
    initialized: bool,
    fault: Option<Fault>,
    /// Fault stays armed after firing instead of clearing
    sticky: bool,
    stats: SimStats,
}

impl<const SIZE: usize> SimFlash<SIZE> {
    /// Create an erased device
    ///
    /// `erase_size` and `program_size` should divide `SIZE`.
    #[must_use]
    pub const fn new(erase_size: u64, program_size: u64) -> Self {
        Self {
            memory: [0xFF; SIZE],
            erase_size,
            program_size,
            initialized: false,
            fault: None,
            sticky: false,
            stats: SimStats {
                inits: 0,
                deinits: 0,
                erases: 0,
                bytes_erased: 0,
                programs: 0,
            },
        }
    }

    /// Arm a fault for the next matching operation
    pub fn inject(&mut self, fault: Fault) {
        self.fault = Some(fault);
        self.sticky = false;
    }

    /// Arm a fault that fires on every matching operation until cleared
    pub fn inject_persistent(&mut self, fault: Fault) {
        self.fault = Some(fault);
        self.sticky = true;
    }

    /// Disarm any pending fault
    pub fn clear_fault(&mut self) {
        self.fault = None;
        self.sticky = false;
    }

    /// Whether the device is between `init()` and `deinit()`
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Operation counters
    #[must_use]
    pub const fn stats(&self) -> SimStats {
        self.stats
    }

    /// Raw view of the device contents
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.memory
    }

    /// Overwrite raw contents, bypassing NOR semantics (test setup only)
    pub fn poke(&mut self, offset: usize, data: &[u8]) {
        self.memory[offset..offset + data.len()].copy_from_slice(data);
    }

    fn take_fault(&mut self, matches: impl Fn(Fault) -> bool) -> Option<Fault> {
        match self.fault {
            Some(f) if matches(f) => {
                if !self.sticky {
                    self.fault = None;
                }
                Some(f)
            }
            _ => None,
        }
    }

    fn program_bytes(&mut self, offset: usize, data: &[u8]) {
        for (cell, byte) in self.memory[offset..offset + data.len()].iter_mut().zip(data) {
            *cell &= *byte;
        }
    }
}

impl<const SIZE: usize> core::fmt::Debug for SimFlash<SIZE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimFlash")
            .field("size", &SIZE)
            .field("erase_size", &self.erase_size)
            .field("program_size", &self.program_size)
            .field("initialized", &self.initialized)
            .field("fault", &self.fault)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<const SIZE: usize> BlockDevice for SimFlash<SIZE> {
    fn init(&mut self) -> HalResult<()> {
        if self.take_fault(|f| f == Fault::Init).is_some() {
            return Err(HalError::InitFailed);
        }
        self.initialized = true;
        self.stats.inits += 1;
        Ok(())
    }

    fn deinit(&mut self) -> HalResult<()> {
        self.initialized = false;
        self.stats.deinits += 1;
        Ok(())
    }

    fn read(&self, buffer: &mut [u8], offset: u64) -> HalResult<()> {
        if matches!(self.fault, Some(Fault::Read)) {
            return Err(HalError::FlashReadFailed);
        }
        self.check_range(offset, buffer.len() as u64)?;

        let start = offset as usize;
        buffer.copy_from_slice(&self.memory[start..start + buffer.len()]);
        Ok(())
    }

    fn program(&mut self, data: &[u8], offset: u64) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.check_aligned(offset, data.len() as u64, self.program_size)?;

        let start = offset as usize;
        match self.take_fault(|f| {
            matches!(f, Fault::Program | Fault::TornProgram(_) | Fault::SilentProgram)
        }) {
            Some(Fault::Program) => Err(HalError::FlashWriteFailed),
            Some(Fault::TornProgram(n)) => {
                let n = n.min(data.len());
                self.program_bytes(start, &data[..n]);
                Err(HalError::FlashWriteFailed)
            }
            Some(Fault::SilentProgram) => {
                self.stats.programs += 1;
                Ok(())
            }
            _ => {
                self.program_bytes(start, data);
                self.stats.programs += 1;
                Ok(())
            }
        }
    }

    fn erase(&mut self, offset: u64, length: u64) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.check_aligned(offset, length, self.erase_size)?;

        if self.take_fault(|f| f == Fault::Erase).is_some() {
            return Err(HalError::FlashEraseFailed);
        }

        let start = offset as usize;
        self.memory[start..start + length as usize].fill(0xFF);
        self.stats.erases += 1;
        self.stats.bytes_erased += length;
        Ok(())
    }

    fn size(&self) -> u64 {
        SIZE as u64
    }

    fn erase_size(&self) -> u64 {
        self.erase_size
    }

    fn program_size(&self) -> u64 {
        self.program_size
    }
}
