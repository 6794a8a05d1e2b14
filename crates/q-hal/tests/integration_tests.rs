// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for q-hal
//!
//! Tests for the storage abstraction: error codes and conversion, the
//! `BlockDevice` default helpers, and the simulated NOR flash used on the host.

mod error_tests {
    use q_hal::HalError;
    use std::collections::HashSet;

    const ALL: [HalError; 15] = [
        HalError::NotInitialized,
        HalError::InitFailed,
        HalError::FlashError,
        HalError::FlashLocked,
        HalError::FlashOutOfBounds,
        HalError::FlashEraseFailed,
        HalError::FlashWriteFailed,
        HalError::FlashReadFailed,
        HalError::FlashVerifyFailed,
        HalError::FlashTimeout,
        HalError::Misaligned,
        HalError::InvalidParameter,
        HalError::Busy,
        HalError::NotSupported,
        HalError::HardwareFault,
    ];

    #[test]
    fn test_hal_error_codes_unique_and_in_hal_range() {
        let codes: HashSet<u16> = ALL.iter().map(HalError::code).collect();
        assert_eq!(codes.len(), ALL.len());
        for code in codes {
            assert_eq!(code & 0xFF00, 0x0800, "code 0x{code:04X} outside HAL range");
        }
    }

    #[test]
    fn test_hal_error_display() {
        let display = format!("{}", HalError::FlashWriteFailed);
        assert_eq!(display, "[0x0814] flash write failed");
    }

    #[test]
    fn test_conversion_to_common_error() {
        use q_common::Error;
        assert_eq!(Error::from(HalError::FlashWriteFailed), Error::StorageWriteFailed);
        assert_eq!(Error::from(HalError::FlashEraseFailed), Error::StorageEraseFailed);
        assert_eq!(Error::from(HalError::FlashVerifyFailed), Error::IntegrityCheckFailed);
        assert_eq!(Error::from(HalError::Misaligned), Error::InvalidParameter);
        assert_eq!(Error::from(HalError::InitFailed), Error::HardwareInitFailed);
    }
}

mod block_device_tests {
    use q_hal::{round_up, BlockDevice, HalError, SimFlash};

    #[test]
    fn test_check_range_rejects_overflow() {
        let flash = SimFlash::<4096>::new(1024, 16);
        assert!(flash.check_range(0, 4096).is_ok());
        assert_eq!(flash.check_range(1, 4096), Err(HalError::FlashOutOfBounds));
        assert_eq!(flash.check_range(u64::MAX, 2), Err(HalError::FlashOutOfBounds));
    }

    #[test]
    fn test_check_aligned_zero_granule() {
        let flash = SimFlash::<4096>::new(1024, 16);
        assert_eq!(flash.check_aligned(0, 16, 0), Err(HalError::Misaligned));
    }

    #[test]
    fn test_round_up_matches_erase_geometry() {
        let flash = SimFlash::<8192>::new(4096, 256);
        assert_eq!(round_up(100, flash.erase_size()), Some(4096));
        assert_eq!(round_up(4096, flash.erase_size()), Some(4096));
        assert_eq!(round_up(4097, flash.erase_size()), Some(8192));
    }
}

mod sim_flash_tests {
    use q_hal::{BlockDevice, Fault, HalError, SimFlash};

    #[test]
    fn test_fresh_device_reads_erased() {
        let flash = SimFlash::<512>::new(256, 4);
        let mut buf = [0u8; 16];
        flash.read(&mut buf, 100).unwrap();
        assert_eq!(buf, [0xFF; 16]);
        assert_eq!(flash.erase_value(), 0xFF);
    }

    #[test]
    fn test_reprogramming_same_data_is_idempotent() {
        let mut flash = SimFlash::<512>::new(256, 4);
        flash.init().unwrap();
        let data = [0x12, 0x34, 0x56, 0x78];
        flash.program(&data, 8).unwrap();
        flash.program(&data, 8).unwrap();
        assert_eq!(&flash.contents()[8..12], &data);
    }

    #[test]
    fn test_read_fault_until_cleared() {
        let mut flash = SimFlash::<512>::new(256, 4);
        flash.inject(Fault::Read);
        let mut buf = [0u8; 4];
        assert_eq!(flash.read(&mut buf, 0), Err(HalError::FlashReadFailed));
        assert_eq!(flash.read(&mut buf, 0), Err(HalError::FlashReadFailed));
        flash.clear_fault();
        assert!(flash.read(&mut buf, 0).is_ok());
    }

    #[test]
    fn test_silent_program_leaves_memory_erased() {
        let mut flash = SimFlash::<512>::new(256, 4);
        flash.init().unwrap();
        flash.inject(Fault::SilentProgram);
        assert!(flash.program(&[0u8; 4], 0).is_ok());
        assert_eq!(&flash.contents()[..4], &[0xFF; 4]);
    }

    #[test]
    fn test_init_fault_and_stats() {
        let mut flash = SimFlash::<512>::new(256, 4);
        flash.inject(Fault::Init);
        assert_eq!(flash.init(), Err(HalError::InitFailed));
        assert!(!flash.is_initialized());

        flash.init().unwrap();
        flash.erase(0, 512).unwrap();
        flash.deinit().unwrap();

        let stats = flash.stats();
        assert_eq!(stats.inits, 1);
        assert_eq!(stats.deinits, 1);
        assert_eq!(stats.erases, 1);
        assert_eq!(stats.bytes_erased, 512);
    }
}
