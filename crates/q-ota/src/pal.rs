// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! OTA platform layer facade
//!
//! [`OtaPal`] is what the OTA agent talks to. It owns the image storage, the
//! image-state tracker, the signature verifier and the bootloader handoff,
//! and logs every operation outcome to its own ring buffer under the
//! `ota_pal` component.
//!
//! At most one [`UpdateSession`] holds the update lease. If the agent loses a
//! receiving session without closing or aborting it (an early return, an
//! unwind), [`OtaPal::reclaim_abandoned_session`] takes the lease back.
//!
//! All calls are synchronous and assume a single caller. Wrap the whole
//! value in one mutex if several tasks need it.

use core::convert::Infallible;

use heapless::String;
use q_common::config::{OtaConfig, OTA_PAL_COMPONENT};
use q_common::log::LogBuffer;
use q_common::{log_debug, log_error, log_info, log_warn};
use q_crypto::SignatureVerifier;
use q_hal::BlockDevice;

use crate::error::{OtaError, OtaErrorKind, OtaResult};
use crate::gate;
use crate::handoff::BootloaderHandoff;
use crate::image_state::{ImageState, ImageStateTracker};
use crate::session::{BeginError, SessionState, UpdateSession};
use crate::signature::{signature_key_name, Signature, MAX_KEY_NAME_LEN};

const C: &str = OTA_PAL_COMPONENT;

/// OTA platform layer
///
/// - `D`: image storage
/// - `S`: image-state storage (a separate erase sector or partition)
/// - `V`: code-signing verifier
/// - `H`: bootloader handoff
pub struct OtaPal<D, S, V, H> {
    device: D,
    active: Option<u32>,
    last_lease: u32,
    tracker: ImageStateTracker<S>,
    verifier: V,
    handoff: H,
    public_key: &'static [u8],
    config: OtaConfig,
    log: LogBuffer,
}

impl<D, S, V, H> OtaPal<D, S, V, H>
where
    D: BlockDevice,
    S: BlockDevice,
    V: SignatureVerifier,
    H: BootloaderHandoff,
{
    /// Create the platform layer
    ///
    /// `public_key` is the code-signing key handed to `verifier` on close.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `config` does not validate.
    pub fn new(
        device: D,
        state_storage: S,
        verifier: V,
        handoff: H,
        public_key: &'static [u8],
        config: OtaConfig,
    ) -> q_common::Result<Self> {
        config.validate()?;

        let mut log = LogBuffer::with_min_level(config.log_level);
        log_debug!(
            log,
            C,
            "[new] size={} erase={} program={}",
            device.size(),
            device.erase_size(),
            device.program_size()
        );

        Ok(Self {
            device,
            active: None,
            last_lease: 0,
            tracker: ImageStateTracker::new(state_storage),
            verifier,
            handoff,
            public_key,
            config,
            log,
        })
    }

    /// Start receiving an image of `total_size` bytes
    ///
    /// Erases `[0, round_up(total_size, erase_size))` before returning. A
    /// zero-size image erases nothing.
    ///
    /// # Errors
    ///
    /// - `SessionAlreadyActive` if another session holds the lease
    /// - `CreateFailed` if the size does not fit or init/erase fails
    pub fn create_session(&mut self, total_size: u64) -> OtaResult<UpdateSession> {
        if self.active.is_some() {
            log_error!(self.log, C, "[create_session] ERROR - session already active");
            return Err(OtaErrorKind::SessionAlreadyActive.into());
        }

        let lease = self.last_lease.wrapping_add(1).max(1);
        match UpdateSession::begin(&mut self.device, lease, total_size) {
            Ok(session) => {
                self.last_lease = lease;
                self.active = Some(lease);
                log_info!(
                    self.log,
                    C,
                    "[create_session] OK size={} erased={}",
                    total_size,
                    session.erased_up_to()
                );
                Ok(session)
            }
            Err(BeginError { error, initialised }) => {
                log_error!(self.log, C, "[create_session] ERROR - size={}: {}", total_size, error);
                if initialised {
                    self.deinit_device("create_session");
                }
                Err(error)
            }
        }
    }

    /// Write one block at `offset`
    ///
    /// Blocks may arrive in any order and may repeat. Returns only once the
    /// block is programmed.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not receiving or lost its lease
    /// - `WriteOutOfBounds` if the block passes the image end
    /// - `WriteUnaligned` if offset or length is not program-size aligned
    /// - `WriteFailed` with the device error if programming fails
    pub fn write(&mut self, session: &mut UpdateSession, offset: u64, data: &[u8]) -> OtaResult<()> {
        let result = if self.holds_lease(session) {
            session.write(&mut self.device, &self.config, offset, data)
        } else {
            Err(OtaErrorKind::InvalidState.into())
        };

        match result {
            Ok(()) => {
                log_debug!(self.log, C, "[write] OK offset={} len={}", offset, data.len());
                Ok(())
            }
            Err(e) => {
                log_error!(
                    self.log,
                    C,
                    "[write] ERROR - offset={} len={}: {}",
                    offset,
                    data.len(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Finish receiving and verify the image
    ///
    /// On a valid signature the image state becomes `PendingCommit` and the
    /// bootloader is told an image is ready. On any verification failure the
    /// image state becomes `Aborted`; the received bytes stay on flash but
    /// will never be booted. Either way the session ends `Closed` and its
    /// lease is released.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not receiving or lost its lease
    /// - `SignatureVerificationFailed` if the signature is missing or wrong
    /// - `ImageStateWriteFailed` if `PendingCommit` could not be stored
    /// - `HandoffFailed` if the ready marker could not be written
    pub fn close(&mut self, session: &mut UpdateSession, signature: &Signature) -> OtaResult<()> {
        if !self.holds_lease(session) {
            log_error!(self.log, C, "[close] ERROR - session {} without lease", session.state());
            return Err(OtaErrorKind::InvalidState.into());
        }

        let verdict = if signature.is_empty() {
            log_error!(self.log, C, "[close] ERROR - no signature");
            Err(OtaError::new(OtaErrorKind::SignatureVerificationFailed))
        } else {
            self.check_signature(session.total_size(), signature)
        };

        log_debug!(
            self.log,
            C,
            "[close] blocks={} bytes={}",
            session.context().blocks(),
            session.context().bytes()
        );
        session.finish(SessionState::Closed);
        self.release_lease("close");

        if let Err(e) = verdict {
            self.store_aborted("close");
            return Err(e);
        }

        if let Err(e) = self.tracker.set(ImageState::PendingCommit) {
            log_error!(self.log, C, "[close] ERROR - {}", e);
            return Err(e);
        }

        if let Err(e) = self.handoff.mark_ready() {
            log_error!(self.log, C, "[close] ERROR - mark ready: {}", e);
            self.store_aborted("close");
            return Err(OtaError::with_device(OtaErrorKind::HandoffFailed, e));
        }

        let scheme = self.signature_key_name();
        log_info!(self.log, C, "[close] OK - {} signature verification passed", scheme);
        Ok(())
    }

    /// Abandon the session without activating anything
    ///
    /// Aborting an aborted or never-created session succeeds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the session was already closed.
    pub fn abort(&mut self, session: &mut UpdateSession) -> OtaResult<()> {
        match session.abort() {
            Ok(Some(lease)) if self.active == Some(lease) => {
                self.release_lease("abort");
                log_info!(self.log, C, "[abort] OK");
                Ok(())
            }
            Ok(_) => {
                log_debug!(self.log, C, "[abort] OK - nothing to release");
                Ok(())
            }
            Err(e) => {
                log_error!(self.log, C, "[abort] ERROR - session closed");
                Err(e)
            }
        }
    }

    /// Take back the lease of a session that was dropped while receiving
    ///
    /// Returns whether a lease was outstanding. A session value that still
    /// exists afterwards gets `InvalidState` from every operation but
    /// `abort`. The image state is not touched.
    pub fn reclaim_abandoned_session(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        log_warn!(self.log, C, "[reclaim] releasing abandoned session");
        self.release_lease("reclaim");
        true
    }

    /// Reset into the new image
    ///
    /// Only when the stored state is `PendingCommit`. Does not return on
    /// success.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if no verified image is pending
    /// - `ResetFailed` if the reset request returns
    pub fn activate_new_image(&mut self) -> OtaResult<Infallible> {
        let state = self.get_image_state();
        if state != ImageState::PendingCommit {
            log_error!(self.log, C, "[activate_new_image] ERROR - image state {}", state);
            return Err(OtaErrorKind::InvalidState.into());
        }
        log_info!(self.log, C, "[activate_new_image] resetting");
        self.reset_device()
    }

    /// Reset the device
    ///
    /// # Errors
    ///
    /// Returns `ResetFailed` with the handoff error if the reset returns.
    pub fn reset_device(&mut self) -> OtaResult<Infallible> {
        match self.handoff.reset_device() {
            Ok(never) => match never {},
            Err(e) => {
                log_error!(self.log, C, "[reset_device] ERROR - {}", e);
                Err(OtaError::with_device(OtaErrorKind::ResetFailed, e))
            }
        }
    }

    /// Stored image state
    ///
    /// A missing, torn or corrupted record reads as `Aborted`.
    pub fn get_image_state(&mut self) -> ImageState {
        match self.tracker.read_record() {
            Ok(record) => record.state,
            Err(fault) => {
                log_warn!(self.log, C, "[get_image_state] {} - treating as aborted", fault);
                ImageState::Aborted
            }
        }
    }

    /// Store a new image state
    ///
    /// `Valid` is accepted only while `PendingCommit` (self-test passed).
    /// `Aborted` is always accepted. `PendingCommit` is set by `close` alone.
    ///
    /// # Errors
    ///
    /// - `InvalidState` for a transition not listed above
    /// - `ImageStateWriteFailed` if the record could not be stored
    pub fn set_image_state(&mut self, state: ImageState) -> OtaResult<()> {
        let allowed = match state {
            ImageState::Valid => self.get_image_state() == ImageState::PendingCommit,
            ImageState::Aborted => true,
            ImageState::PendingCommit => false,
        };
        if !allowed {
            log_error!(self.log, C, "[set_image_state] ERROR - {} not allowed", state);
            return Err(OtaErrorKind::InvalidState.into());
        }

        match self.tracker.set(state) {
            Ok(record) => {
                log_info!(
                    self.log,
                    C,
                    "[set_image_state] OK {} seq={}",
                    state,
                    record.sequence
                );
                Ok(())
            }
            Err(e) => {
                log_error!(self.log, C, "[set_image_state] ERROR - {}", e);
                Err(e)
            }
        }
    }

    /// Confirm the running image after a successful self-test
    ///
    /// # Errors
    ///
    /// See [`Self::set_image_state`].
    pub fn confirm_self_test(&mut self) -> OtaResult<()> {
        self.set_image_state(ImageState::Valid)
    }

    /// Reject the running image after a failed self-test
    ///
    /// # Errors
    ///
    /// See [`Self::set_image_state`].
    pub fn reject_self_test(&mut self) -> OtaResult<()> {
        self.set_image_state(ImageState::Aborted)
    }

    /// Signature key name to advertise, e.g. `sig-sha3-256-dilithium3`
    #[must_use]
    pub fn signature_key_name(&self) -> String<MAX_KEY_NAME_LEN> {
        signature_key_name(V::ALGORITHM_ID)
    }

    /// Operation log
    #[must_use]
    pub const fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &OtaConfig {
        &self.config
    }

    /// Whether no session holds the update lease
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Image storage
    #[must_use]
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// Image-state storage
    #[must_use]
    pub const fn state_storage(&self) -> &S {
        self.tracker.storage()
    }

    /// Bootloader handoff
    #[must_use]
    pub const fn handoff(&self) -> &H {
        &self.handoff
    }

    fn holds_lease(&self, session: &UpdateSession) -> bool {
        session.lease().is_some() && session.lease() == self.active
    }

    fn check_signature(&mut self, total_size: u64, signature: &Signature) -> OtaResult<()> {
        let verdict = gate::verify(
            &self.device,
            total_size,
            &self.config,
            &self.verifier,
            signature.as_bytes(),
            self.public_key,
        );
        match verdict {
            Ok(true) => Ok(()),
            Ok(false) => {
                let scheme = self.signature_key_name();
                log_error!(
                    self.log,
                    C,
                    "[close] ERROR - failed to pass {} signature verification",
                    scheme
                );
                Err(OtaErrorKind::SignatureVerificationFailed.into())
            }
            Err(fault) => {
                log_error!(self.log, C, "[close] ERROR - {}", fault);
                Err(match fault {
                    gate::VerifyFault::Read(e) => {
                        OtaError::with_device(OtaErrorKind::SignatureVerificationFailed, e)
                    }
                    gate::VerifyFault::Crypto(_) => OtaErrorKind::SignatureVerificationFailed.into(),
                })
            }
        }
    }

    fn release_lease(&mut self, op: &str) {
        self.active = None;
        self.deinit_device(op);
    }

    fn deinit_device(&mut self, op: &str) {
        if let Err(e) = self.device.deinit() {
            log_warn!(self.log, C, "[{}] deinit failed: {}", op, e);
        }
    }

    fn store_aborted(&mut self, op: &str) {
        if let Err(e) = self.tracker.set(ImageState::Aborted) {
            log_error!(self.log, C, "[{}] ERROR - {}", op, e);
        }
    }
}
