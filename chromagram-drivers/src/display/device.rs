//! The logical display device: lifecycle and exclusive sessions
//!
//! [`GroveLcd`] owns the serialized transport and the session
//! bookkeeping. It is const-constructible, so the surrounding glue can
//! keep it in a `static` and drive it from any task:
//!
//! ```text
//! static LCD: GroveLcd<Bus> = GroveLcd::new();
//! ```
//!
//! Register access is only reachable through an open [`Session`], so a
//! closed or detached device cannot be driven by stale callers.

use core::cell::RefCell;

use chromagram_core::session::{DeviceState, SessionError, SessionToken};
use chromagram_protocol::Command;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embedded_hal_async::i2c::I2c;

use super::backlight::{self, BacklightConfig};
use super::reg::{self, Target};
use super::transport::{Transaction, Transport, TransportError};

/// The Grove RGB LCD as a single logical device
///
/// Two independent locks protect it: the transport mutex serializes
/// individual register transactions, and a short critical section
/// guards the attach/session state. Neither is ever held across the
/// other for longer than one state transition.
pub struct GroveLcd<B> {
    transport: Transport<B>,
    state: BlockingMutex<CriticalSectionRawMutex, RefCell<DeviceState>>,
}

impl<B> GroveLcd<B> {
    /// Create a detached device.
    pub const fn new() -> Self {
        Self {
            transport: Transport::new(),
            state: BlockingMutex::new(RefCell::new(DeviceState::new())),
        }
    }

    /// Whether a bus handle is currently attached.
    pub fn is_attached(&self) -> bool {
        self.state.lock(|state| state.borrow().is_attached())
    }
}

impl<B> Default for GroveLcd<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: I2c> GroveLcd<B> {
    /// Attach a bus handle and bring up the backlight.
    ///
    /// The bring-up is best effort: failed writes are logged and the
    /// device is exposed for sessions regardless. Hands the handle back
    /// as `Err` when a device is already attached.
    pub async fn attach(&self, bus: B, config: BacklightConfig) -> Result<(), B> {
        self.transport.attach(bus).await?;
        backlight::initialize(&self.transport, &config).await;
        // expose the device only after bring-up has run
        self.state.lock(|state| state.borrow_mut().attach());
        Ok(())
    }

    /// Detach and return the bus handle, if any.
    ///
    /// Any open session is force-closed; an in-flight transaction
    /// finishes first because removal takes the transport lock.
    pub async fn detach(&self) -> Option<B> {
        self.state.lock(|state| state.borrow_mut().detach());
        self.transport.detach().await
    }

    /// Open the exclusive session.
    ///
    /// Strict try semantics: never waits. Fails with
    /// [`SessionError::DeviceBusy`] while another session is open and
    /// [`SessionError::DeviceNotReady`] before attach; neither refusal
    /// changes the device state.
    pub fn open_session(&self) -> Result<Session<'_, B>, SessionError> {
        let token = self.state.lock(|state| state.borrow_mut().try_open())?;
        Ok(Session {
            device: self,
            token,
        })
    }
}

/// An open exclusive session on the device
///
/// Dropping the session (or calling [`close`](Session::close)) releases
/// the device for the next opener. A session that outlives a detach
/// keeps its handle but every transaction fails with
/// [`TransportError::NotAttached`].
pub struct Session<'a, B> {
    device: &'a GroveLcd<B>,
    token: SessionToken,
}

impl<B> Drop for Session<'_, B> {
    fn drop(&mut self) {
        self.device
            .state
            .lock(|state| state.borrow_mut().close(self.token));
    }
}

impl<B: I2c> Session<'_, B> {
    /// Read one byte from a register.
    pub async fn read(
        &self,
        target: Target,
        register: u8,
    ) -> Result<u8, TransportError<B::Error>> {
        self.device.transport.read(target, register).await
    }

    /// Write one byte to a register.
    pub async fn write(
        &self,
        target: Target,
        register: u8,
        value: u8,
    ) -> Result<(), TransportError<B::Error>> {
        self.device.transport.write(target, register, value).await
    }

    /// Execute one transaction. Reads return `Some(byte)`.
    pub async fn transact(
        &self,
        transaction: Transaction,
    ) -> Result<Option<u8>, TransportError<B::Error>> {
        self.device.transport.transact(transaction).await
    }

    /// Issue a controller command: the opcode byte, then the parameter
    /// byte when the instruction carries one.
    pub async fn send_command(&self, command: Command) -> Result<(), TransportError<B::Error>> {
        let (opcode, param) = command.encode();
        self.write(Target::Text, reg::text::DISPLAY, opcode).await?;
        if let Some(param) = param {
            self.write(Target::Text, reg::text::DISPLAY, param).await?;
        }
        Ok(())
    }

    /// Write one character-data byte at the current DDRAM address.
    pub async fn write_data(&self, data: u8) -> Result<(), TransportError<B::Error>> {
        self.write(Target::Text, reg::text::LETTERS, data).await
    }

    /// Close the session, releasing the device.
    pub fn close(self) {}
}
