// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Bootloader handoff
//!
//! Glue between the platform layer and whatever boot stage activates a new
//! image. The platform layer only asks for two things: record that an image
//! is ready, and reset.

use core::convert::Infallible;

use q_hal::HalResult;

/// Bootloader handoff interface
pub trait BootloaderHandoff {
    /// Persist the "image ready" marker read by the boot stage
    ///
    /// # Errors
    ///
    /// Returns the device error if the marker could not be written.
    fn mark_ready(&mut self) -> HalResult<()>;

    /// Reset the device
    ///
    /// Does not return on success.
    ///
    /// # Errors
    ///
    /// Returns the error that prevented the reset, e.g. `NotSupported` on a
    /// host build.
    fn reset_device(&mut self) -> HalResult<Infallible>;
}
