// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Signature gate
//!
//! The only path by which a received image can be marked bootable. The image
//! is hashed as it sits on the device, never from memory, so what is verified
//! is exactly what the bootloader will load.

use core::fmt;

use q_crypto::{CryptoError, Hash, Sha3_256, Sha3_256Output, SignatureVerifier};
use q_hal::{BlockDevice, HalError, HalResult};
use zeroize::Zeroize;

use q_common::config::OtaConfig;

/// Why verification could not reach a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFault {
    /// The image could not be read back
    Read(HalError),
    /// The verifier rejected the key or signature encoding
    Crypto(CryptoError),
}

impl fmt::Display for VerifyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read-back failed: {e}"),
            Self::Crypto(e) => write!(f, "verifier error: {e}"),
        }
    }
}

/// SHA3-256 over `[0, total_size)` of `device`
///
/// # Errors
///
/// Returns the device error if any read fails.
pub fn image_digest<D: BlockDevice>(
    device: &D,
    total_size: u64,
    chunk: usize,
) -> HalResult<Sha3_256Output> {
    let mut scratch = [0u8; OtaConfig::MAX_READBACK_CHUNK];
    let chunk = chunk.clamp(1, scratch.len()) as u64;

    let mut digest = || -> HalResult<Sha3_256Output> {
        let mut hasher = Sha3_256::new();
        let mut at = 0u64;
        while at < total_size {
            let len = chunk.min(total_size - at) as usize;
            device.read(&mut scratch[..len], at)?;
            hasher.update(&scratch[..len]);
            at += len as u64;
        }
        Ok(hasher.finalize())
    };
    let result = digest();

    scratch.zeroize();
    result
}

/// Verify the image on `device` against `signature`
///
/// Returns `Ok(true)` only if the verifier accepts the signature over the
/// digest of the stored image.
///
/// # Errors
///
/// Returns a [`VerifyFault`] if no verdict could be reached. Callers must
/// treat that the same as a failed verification.
pub fn verify<D: BlockDevice, V: SignatureVerifier>(
    device: &D,
    total_size: u64,
    config: &OtaConfig,
    verifier: &V,
    signature: &[u8],
    public_key: &[u8],
) -> Result<bool, VerifyFault> {
    let mut digest = image_digest(device, total_size, config.readback_chunk_size)
        .map_err(VerifyFault::Read)?;
    let verdict = verifier
        .verify(digest.as_ref(), signature, public_key)
        .map_err(VerifyFault::Crypto);
    digest.zeroize();
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use q_common::types::AlgorithmId;
    use q_crypto::{constant_time_eq, CryptoResult};
    use q_hal::{Fault, SimFlash};

    /// Signature is the digest itself
    struct DigestEcho;

    impl SignatureVerifier for DigestEcho {
        const ALGORITHM_ID: AlgorithmId = AlgorithmId::Ed25519;

        fn verify(&self, digest: &[u8], signature: &[u8], _public_key: &[u8]) -> CryptoResult<bool> {
            if signature.len() != 32 {
                return Err(CryptoError::InvalidSignature);
            }
            Ok(constant_time_eq(digest, signature))
        }
    }

    fn flash_with(image: &[u8]) -> SimFlash<1024> {
        let mut flash = SimFlash::new(256, 4);
        flash.poke(0, image);
        flash
    }

    #[test]
    fn test_digest_covers_only_image() {
        let mut flash = flash_with(&[0x5A; 100]);
        flash.poke(100, &[0x00; 4]);
        let digest = image_digest(&flash, 100, 7).unwrap();
        assert_eq!(digest, Sha3_256::hash(&[0x5A; 100]));
    }

    #[test]
    fn test_verify_pass_and_fail() {
        let flash = flash_with(&[0x33; 300]);
        let good = Sha3_256::hash(&[0x33; 300]);
        let config = OtaConfig::DEFAULT;

        assert_eq!(verify(&flash, 300, &config, &DigestEcho, good.as_ref(), b"pk"), Ok(true));
        assert_eq!(verify(&flash, 299, &config, &DigestEcho, good.as_ref(), b"pk"), Ok(false));
        assert_eq!(
            verify(&flash, 300, &config, &DigestEcho, &[0u8; 5], b"pk"),
            Err(VerifyFault::Crypto(CryptoError::InvalidSignature))
        );
    }

    #[test]
    fn test_read_fault_is_reported() {
        let mut flash = flash_with(&[0x33; 300]);
        flash.inject(Fault::Read);
        assert_eq!(
            verify(&flash, 300, &OtaConfig::DEFAULT, &DigestEcho, &[0u8; 32], b"pk"),
            Err(VerifyFault::Read(HalError::FlashReadFailed))
        );
    }
}
