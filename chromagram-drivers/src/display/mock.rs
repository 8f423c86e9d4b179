//! Test double for the bus handle
//!
//! Records register writes, scripts read data, and injects NAKs at
//! chosen transaction indices.

use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use heapless::Vec;

/// Recorded write: (bus address, register, value).
pub type WriteRecord = (u8, u8, u8);

#[derive(Debug, Default)]
pub struct MockBus {
    /// Successful register writes, in order
    pub writes: Vec<WriteRecord, 32>,
    /// Byte returned by read operations
    pub read_value: u8,
    /// Bit N set: NAK the Nth transaction
    pub fail_mask: u32,
    /// Transactions attempted, failed ones included
    pub attempts: u32,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus that NAKs the transactions whose indices are set in `mask`.
    pub fn failing_at(mask: u32) -> Self {
        Self {
            fail_mask: mask,
            ..Self::default()
        }
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let index = self.attempts;
        self.attempts += 1;
        if self.fail_mask & (1 << index) != 0 {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        // A register write arrives as Write([register, value]); a
        // register read as Write([register]) followed by Read(buf).
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    if let [register, value] = **bytes {
                        self.writes.push((address, register, value)).ok();
                    }
                }
                Operation::Read(buffer) => {
                    if let Some(byte) = buffer.first_mut() {
                        *byte = self.read_value;
                    }
                }
            }
        }
        Ok(())
    }
}
