// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Update session state machine
//!
//! ```text
//! Uninitialized --create--> Receiving --close--> Closed
//!       |                     |  ^
//!       |                     +--+ write
//!       +------abort------> Aborted <--abort-- Receiving
//! ```
//!
//! The storage device never leaves the platform layer. A `Receiving` session
//! carries the lease it was created with, and an operation is accepted only
//! while that lease is the platform layer's active one. The lease is given
//! back exactly once: on close, on abort, or when the platform layer reclaims
//! it from a session that was dropped.

use core::fmt;

use q_common::config::OtaConfig;
use q_hal::{round_up, BlockDevice};

use crate::error::{OtaError, OtaErrorKind, OtaResult};
use crate::signature::SignatureContext;
use crate::write;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never created
    Uninitialized,
    /// Accepting blocks
    Receiving,
    /// Closed after a verification attempt (terminal)
    Closed,
    /// Aborted by the caller (terminal)
    Aborted,
}

impl SessionState {
    /// Whether no further operation can change this session
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Aborted)
    }

    /// Get state name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Receiving => "receiving",
            Self::Closed => "closed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-flight update
#[must_use = "a receiving session holds the update lease until closed or aborted"]
pub struct UpdateSession {
    total_size: u64,
    lease: u32,
    erased_up_to: u64,
    context: SignatureContext,
    state: SessionState,
}

/// Why `begin` failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BeginError {
    pub error: OtaError,
    /// `init()` succeeded, so the device must be de-initialised again
    pub initialised: bool,
}

impl UpdateSession {
    /// A session that was never created
    ///
    /// Lets an agent hold a session slot before the job arrives; aborting it
    /// is allowed and makes it terminal.
    pub const fn new() -> Self {
        Self {
            total_size: 0,
            lease: 0,
            erased_up_to: 0,
            context: SignatureContext::new(),
            state: SessionState::Uninitialized,
        }
    }

    /// Declared image size
    #[must_use]
    pub const fn total_size(&self) -> u64 {
        self.total_size
    }

    /// End of the region erased at creation
    #[must_use]
    pub const fn erased_up_to(&self) -> u64 {
        self.erased_up_to
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Block accounting so far
    #[must_use]
    pub const fn context(&self) -> &SignatureContext {
        &self.context
    }

    /// Lease this session was created with, while it is receiving
    #[must_use]
    pub const fn lease(&self) -> Option<u32> {
        match self.state {
            SessionState::Receiving => Some(self.lease),
            _ => None,
        }
    }

    /// Enter a terminal state
    pub(crate) fn finish(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Abort transition
    ///
    /// Returns the lease if the session was receiving. Aborting twice is a
    /// no-op.
    pub(crate) fn abort(&mut self) -> OtaResult<Option<u32>> {
        match self.state {
            SessionState::Closed => Err(OtaErrorKind::InvalidState.into()),
            SessionState::Aborted => Ok(None),
            SessionState::Uninitialized | SessionState::Receiving => {
                let lease = self.lease();
                self.finish(SessionState::Aborted);
                Ok(lease)
            }
        }
    }

    /// Create transition: validate size, bring the device up, erase once
    ///
    /// A zero-size image erases nothing.
    pub(crate) fn begin<D: BlockDevice>(
        device: &mut D,
        lease: u32,
        total_size: u64,
    ) -> Result<Self, BeginError> {
        let fail = |error, initialised| BeginError { error, initialised };
        let create_failed = OtaError::new(OtaErrorKind::CreateFailed);

        if total_size > device.size() {
            return Err(fail(create_failed, false));
        }
        let erase_end = match round_up(total_size, device.erase_size()) {
            Some(end) if end <= device.size() => end,
            _ => return Err(fail(create_failed, false)),
        };

        if let Err(e) = device.init() {
            return Err(fail(OtaError::with_device(OtaErrorKind::CreateFailed, e), false));
        }
        if erase_end > 0 {
            if let Err(e) = device.erase(0, erase_end) {
                return Err(fail(OtaError::with_device(OtaErrorKind::CreateFailed, e), true));
            }
        }

        Ok(Self {
            total_size,
            lease,
            erased_up_to: erase_end,
            context: SignatureContext::new(),
            state: SessionState::Receiving,
        })
    }

    /// Write transition
    ///
    /// The caller has checked that this session holds the active lease.
    /// Rejected blocks leave the device and the context untouched.
    pub(crate) fn write<D: BlockDevice>(
        &mut self,
        device: &mut D,
        config: &OtaConfig,
        offset: u64,
        data: &[u8],
    ) -> OtaResult<()> {
        if self.state != SessionState::Receiving {
            return Err(OtaErrorKind::InvalidState.into());
        }
        if data.is_empty() {
            return Ok(());
        }

        let len = data.len() as u64;
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.total_size && end <= self.erased_up_to)
            .ok_or(OtaError::new(OtaErrorKind::WriteOutOfBounds))?;

        // Only the block ending the image may end in a partial unit
        let unit = device.program_size();
        if unit == 0 || offset % unit != 0 || (len % unit != 0 && end != self.total_size) {
            return Err(OtaErrorKind::WriteUnaligned.into());
        }

        write::program_block(device, config, offset, data)
            .map_err(|e| OtaError::with_device(OtaErrorKind::WriteFailed, e))?;

        self.context.record(offset, len);
        Ok(())
    }
}

impl Default for UpdateSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UpdateSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSession")
            .field("state", &self.state)
            .field("total_size", &self.total_size)
            .field("erased_up_to", &self.erased_up_to)
            .field("lease", &self.lease)
            .field("context", &self.context)
            .finish()
    }
}
