//! Our error types for the SW35xx driver and port monitor.

use thiserror::Error;

pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Custom error type for SW35xx bus communications.
#[derive(Error, Debug)]
pub enum Error<E: embedded_hal::i2c::Error> {
    #[error("I2C bus error")]
    Bus(E),
    #[error("Invalid range")]
    InvalidRange,
    #[error("Invalid bus channel {0}")]
    InvalidChannel(u8),
}

impl<E: embedded_hal::i2c::Error> Error<E> {
    /// Returns `true` when the underlying transaction was not acknowledged by the peripheral.
    pub fn is_no_acknowledge(&self) -> bool {
        matches!(
            self,
            Error::Bus(err) if matches!(err.kind(), embedded_hal::i2c::ErrorKind::NoAcknowledge(_))
        )
    }
}
