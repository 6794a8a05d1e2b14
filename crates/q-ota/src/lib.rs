// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel OTA Platform Abstraction Layer
//!
//! Device-side half of an over-the-air update: takes blocks of a firmware
//! image from an OTA agent, commits them to erase-before-write storage, and
//! once the image is complete verifies its signature and hands it to the
//! bootloader.
//!
//! # Flow
//!
//! ```text
//! create_session(size)   erase [0, round_up(size, erase_size)) once
//! write(offset, block)*  any order, duplicates allowed
//! close(signature)       SHA3-256 of the stored image -> verifier
//!                          pass: image state PendingCommit, mark ready
//!                          fail: image state Aborted
//! abort()                release the device, nothing activated
//! ```
//!
//! After the reboot the running image calls `confirm_self_test` or
//! `reject_self_test`.
//!
//! # Guarantees
//!
//! - At most one session at a time: a receiving session holds the update lease
//! - A block is acknowledged only after the device finished programming it
//! - Only `close` with a passing signature can set `PendingCommit`
//! - A torn or corrupted image-state record reads as `Aborted`
//!
//! # Collaborators
//!
//! - [`q_hal::BlockDevice`]: image storage and image-state storage
//! - [`q_crypto::SignatureVerifier`]: code-signing check
//! - [`BootloaderHandoff`]: ready marker and reset

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod error;
pub mod gate;
pub mod handoff;
pub mod image_state;
pub mod pal;
pub mod session;
pub mod signature;
pub mod write;

pub use error::{OtaError, OtaErrorKind, OtaResult};
pub use handoff::BootloaderHandoff;
pub use image_state::{ImageState, ImageStateRecord, ImageStateTracker, RecordFault};
pub use pal::OtaPal;
pub use session::{SessionState, UpdateSession};
pub use signature::{Signature, SignatureContext, MAX_SIGNATURE_SIZE};
