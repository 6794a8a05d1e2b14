// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel OTA Cryptographic Seams
//!
//! This crate provides the digest and signature-verification interfaces the
//! OTA platform layer gates image activation on:
//!
//! - **Hashing**: SHA3-256 over the image as it sits on flash
//! - **Verification**: a `SignatureVerifier` trait the integrator implements
//!   for its code-signing scheme
//! - **Comparison**: constant-time byte equality
//!
//! # Security Requirements
//!
//! - Never log or expose key material
//! - Compare digests and signatures in constant time

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;
pub mod hash;

// Re-export main traits and types
pub use error::{CryptoError, CryptoResult};
pub use traits::{constant_time_eq, Hash, SignatureVerifier};
pub use hash::{Sha3_256, Sha3_256Output};
