// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for q-crypto
//!
//! These tests exercise the digest against NIST vectors and the verifier
//! seam through a test implementation, the way the OTA layer drives them.

mod hash_tests {
    use q_crypto::hash::Sha3_256;
    use q_crypto::traits::Hash;

    #[test]
    fn test_sha3_256_empty_input() {
        // NIST KAT: SHA3-256("") = a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a
        let expected = [
            0xa7, 0xff, 0xc6, 0xf8, 0xbf, 0x1e, 0xd7, 0x66,
            0x51, 0xc1, 0x47, 0x56, 0xa0, 0x61, 0xd6, 0x62,
            0xf5, 0x80, 0xff, 0x4d, 0xe4, 0x3b, 0x49, 0xfa,
            0x82, 0xd8, 0x0a, 0x4b, 0x80, 0xf8, 0x43, 0x4a,
        ];

        let result = Sha3_256::hash(&[]);
        assert_eq!(result.as_ref(), &expected);
    }

    #[test]
    fn test_sha3_256_abc() {
        // NIST KAT: SHA3-256("abc")
        let expected = [
            0x3a, 0x98, 0x5d, 0xa7, 0x4f, 0xe2, 0x25, 0xb2,
            0x04, 0x5c, 0x17, 0x2d, 0x6b, 0xd3, 0x90, 0xbd,
            0x85, 0x5f, 0x08, 0x6e, 0x3e, 0x9d, 0x52, 0x5b,
            0x46, 0xbf, 0xe2, 0x45, 0x11, 0x43, 0x15, 0x32,
        ];

        let result = Sha3_256::hash(b"abc");
        assert_eq!(result.as_ref(), &expected);
    }

    #[test]
    fn test_chunked_digest_independent_of_chunk_size() {
        let image: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 251) as u8).collect();
        let one_shot = Sha3_256::hash(&image);

        for chunk in [1usize, 16, 136, 256, 1000] {
            let mut hasher = Sha3_256::new();
            for part in image.chunks(chunk) {
                hasher.update(part);
            }
            assert_eq!(hasher.finalize(), one_shot, "chunk size {chunk}");
        }
    }
}

mod verifier_tests {
    use q_common::types::AlgorithmId;
    use q_crypto::{constant_time_eq, CryptoError, CryptoResult, Hash, Sha3_256, SignatureVerifier};

    /// Accepts a signature equal to SHA3-256(key || digest)
    struct KeyedDigestVerifier;

    impl SignatureVerifier for KeyedDigestVerifier {
        const ALGORITHM_ID: AlgorithmId = AlgorithmId::Dilithium3;

        fn verify(&self, digest: &[u8], signature: &[u8], public_key: &[u8]) -> CryptoResult<bool> {
            if public_key.is_empty() {
                return Err(CryptoError::InvalidKey);
            }
            if signature.len() != 32 {
                return Err(CryptoError::InvalidSignature);
            }
            let mut hasher = Sha3_256::new();
            hasher.update(public_key);
            hasher.update(digest);
            Ok(constant_time_eq(hasher.finalize().as_ref(), signature))
        }
    }

    fn sign(key: &[u8], digest: &[u8]) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(key);
        hasher.update(digest);
        *hasher.finalize().as_bytes()
    }

    #[test]
    fn test_verifier_accepts_matching_signature() {
        let digest = Sha3_256::hash(b"firmware");
        let signature = sign(b"key", digest.as_ref());
        assert_eq!(KeyedDigestVerifier.verify(digest.as_ref(), &signature, b"key"), Ok(true));
    }

    #[test]
    fn test_verifier_rejects_tampered_digest() {
        let digest = Sha3_256::hash(b"firmware");
        let signature = sign(b"key", digest.as_ref());
        let tampered = Sha3_256::hash(b"firmwarE");
        assert_eq!(KeyedDigestVerifier.verify(tampered.as_ref(), &signature, b"key"), Ok(false));
    }

    #[test]
    fn test_verifier_errors_convert_to_common() {
        let digest = Sha3_256::hash(b"firmware");
        let err = KeyedDigestVerifier.verify(digest.as_ref(), &[0u8; 3], b"key").unwrap_err();
        assert_eq!(err, CryptoError::InvalidSignature);
        assert_eq!(q_common::Error::from(err), q_common::Error::InvalidSignature);
        assert_eq!(format!("{err}"), "[0x0102] invalid signature");
    }

    #[test]
    fn test_algorithm_name_is_advertised() {
        assert_eq!(KeyedDigestVerifier::ALGORITHM_ID.name(), "dilithium3");
    }
}
