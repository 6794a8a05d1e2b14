// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware Abstraction Layer for the Qbitel OTA platform layer
//!
//! This crate defines the storage interface the OTA platform layer writes
//! update images through, and a simulated NOR flash for host builds.
//!
//! # Architecture
//!
//! 1. **Traits**: Platform-agnostic interfaces (`traits` module)
//! 2. **Drivers**: Platform-specific implementations, provided by the
//!    integrator for the target part
//! 3. **Simulation**: `SimFlash`, a RAM-backed model (feature `sim`)

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod traits;
pub mod error;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export main traits
pub use traits::*;
pub use error::{HalError, HalResult};

#[cfg(any(test, feature = "sim"))]
pub use sim::{Fault, SimFlash, SimStats};
