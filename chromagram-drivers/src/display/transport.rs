//! Serialized register transactions on the shared bus
//!
//! The two display chips sit on one bus handle, so every read or write
//! takes the transport lock for exactly one transaction. The target
//! address is bound inside the lock, which keeps address and data from
//! straddling a lock boundary. The guard is released on every exit
//! path, so a failed transaction never wedges the bus.
//!
//! Lock acquisition blocks (no timeout): holders keep the lock only
//! for a single transaction, and the hardware cannot multiplex
//! transactions anyway.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::i2c::I2c;

use super::reg::Target;

/// Errors from a register transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// No bus handle is attached
    NotAttached,
    /// The underlying bus transaction failed
    Bus(E),
}

/// A single register transaction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transaction {
    /// Read one byte from a register
    Read {
        /// Chip to address
        target: Target,
        /// Register offset within the chip
        register: u8,
    },
    /// Write one byte to a register
    Write {
        /// Chip to address
        target: Target,
        /// Register offset within the chip
        register: u8,
        /// Byte to write
        value: u8,
    },
}

/// Mutex-guarded access to the shared bus handle
///
/// The handle is absent until [`attach`](Transport::attach) stores one
/// and after [`detach`](Transport::detach) removes it; transactions in
/// that window fail with [`TransportError::NotAttached`].
pub(crate) struct Transport<B> {
    bus: Mutex<CriticalSectionRawMutex, Option<B>>,
}

impl<B> Transport<B> {
    /// Create a transport with no bus handle attached.
    pub(crate) const fn new() -> Self {
        Self {
            bus: Mutex::new(None),
        }
    }

    /// Store a bus handle. Hands the handle back when one is already
    /// attached.
    pub(crate) async fn attach(&self, bus: B) -> Result<(), B> {
        let mut guard = self.bus.lock().await;
        if guard.is_some() {
            return Err(bus);
        }
        *guard = Some(bus);
        Ok(())
    }

    /// Remove and return the bus handle, if any. Waits for an in-flight
    /// transaction to finish first.
    pub(crate) async fn detach(&self) -> Option<B> {
        self.bus.lock().await.take()
    }
}

impl<B: I2c> Transport<B> {
    /// Read one byte from `register` on `target`.
    pub(crate) async fn read(
        &self,
        target: Target,
        register: u8,
    ) -> Result<u8, TransportError<B::Error>> {
        let mut guard = self.bus.lock().await;
        let bus = guard.as_mut().ok_or(TransportError::NotAttached)?;
        let mut value = [0u8; 1];
        bus.write_read(target.address(), &[register], &mut value)
            .await
            .map_err(TransportError::Bus)?;
        Ok(value[0])
    }

    /// Write one byte to `register` on `target`.
    pub(crate) async fn write(
        &self,
        target: Target,
        register: u8,
        value: u8,
    ) -> Result<(), TransportError<B::Error>> {
        let mut guard = self.bus.lock().await;
        let bus = guard.as_mut().ok_or(TransportError::NotAttached)?;
        bus.write(target.address(), &[register, value])
            .await
            .map_err(TransportError::Bus)
    }

    /// Execute one transaction. Reads return `Some(byte)`, writes
    /// return `None`.
    pub(crate) async fn transact(
        &self,
        transaction: Transaction,
    ) -> Result<Option<u8>, TransportError<B::Error>> {
        match transaction {
            Transaction::Read { target, register } => {
                self.read(target, register).await.map(Some)
            }
            Transaction::Write {
                target,
                register,
                value,
            } => {
                self.write(target, register, value).await?;
                Ok(None)
            }
        }
    }
}
