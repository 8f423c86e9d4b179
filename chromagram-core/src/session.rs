//! Exclusive-session state machine
//!
//! The logical device accepts at most one client session at a time.
//! Opening uses strict try semantics: a second opener is refused with
//! [`SessionError::DeviceBusy`] instead of waiting, because stacking
//! clients on a single display surface has no meaningful outcome.
//!
//! The machine also tracks whether a transport handle is attached.
//! Opening a detached device fails with [`SessionError::DeviceNotReady`]
//! and leaves the occupancy untouched, so the device stays acquirable
//! once a handle arrives.

/// Errors that can occur when opening a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Another session currently holds the device
    DeviceBusy,
    /// No transport handle is attached
    DeviceNotReady,
}

/// Session occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No client holds the device
    Closed,
    /// Exactly one client holds the device
    Open,
}

/// Proof of a successful open, required to close the session
///
/// Tokens are bound to the attach epoch in which they were issued. A
/// detach invalidates all outstanding tokens, so a holder that missed
/// the detach cannot close a session it no longer owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionToken {
    epoch: u32,
}

/// Attach and session bookkeeping for the logical device
///
/// `attached` is mutated only by [`attach`](DeviceState::attach) and
/// [`detach`](DeviceState::detach); occupancy only by
/// [`try_open`](DeviceState::try_open), [`close`](DeviceState::close),
/// and detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    attached: bool,
    session: SessionState,
    epoch: u32,
}

impl DeviceState {
    /// Create a detached, closed device state.
    pub const fn new() -> Self {
        Self {
            attached: false,
            session: SessionState::Closed,
            epoch: 0,
        }
    }

    /// Record that a transport handle is attached.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Record that the transport handle is gone.
    ///
    /// Any open session is force-closed and its token invalidated.
    pub fn detach(&mut self) {
        self.attached = false;
        self.session = SessionState::Closed;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Attempt to open the exclusive session.
    ///
    /// Occupancy is checked before attach state, so a held device
    /// reports `DeviceBusy` first. A refused open leaves the state
    /// unchanged either way.
    pub fn try_open(&mut self) -> Result<SessionToken, SessionError> {
        if matches!(self.session, SessionState::Open) {
            return Err(SessionError::DeviceBusy);
        }
        if !self.attached {
            return Err(SessionError::DeviceNotReady);
        }
        self.session = SessionState::Open;
        Ok(SessionToken { epoch: self.epoch })
    }

    /// Close the session identified by `token`.
    ///
    /// A token issued before the last detach is stale and ignored, so a
    /// late close cannot release a session belonging to a newer holder.
    pub fn close(&mut self, token: SessionToken) {
        if token.epoch == self.epoch {
            self.session = SessionState::Closed;
        }
    }

    /// Whether a transport handle is currently attached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether a session currently holds the device.
    pub fn is_open(&self) -> bool {
        matches!(self.session, SessionState::Open)
    }

    /// Current session occupancy.
    pub fn session(&self) -> SessionState {
        self.session
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
