//! Scoped unlocking of the configuration registers.
//!
//! The chip ignores configuration writes unless [`UNLOCK_SEQUENCE`] has been written to
//! [`Sw35xxRegister::I2cEnable`] first, and should be locked again afterwards. A
//! [`WriteUnlocked`] issues the unlock sequence when created and the lock write when it is
//! finished or dropped, so every exit path of a mutating operation relocks the chip.

use embedded_hal::i2c::I2c;

use crate::{
    bus::Channel,
    error::Result,
    register::{LOCK_VALUE, Sw35xxRegister, UNLOCK_SEQUENCE},
};

/// Configuration registers of one chip, unlocked for writing.
pub struct WriteUnlocked<'g, 'c, B: I2c> {
    channel: &'g mut Channel<'c, B>,
    address: u8,
    locked: bool,
}

impl<'g, 'c, B: I2c> WriteUnlocked<'g, 'c, B> {
    /// Unlock the configuration registers of the chip at `address`.
    ///
    /// If the unlock sequence fails part way, the lock write is still attempted.
    pub fn acquire(channel: &'g mut Channel<'c, B>, address: u8) -> Result<Self, B::Error> {
        let guard = Self {
            channel,
            address,
            locked: false,
        };
        for value in UNLOCK_SEQUENCE {
            guard
                .channel
                .write_register(address, Sw35xxRegister::I2cEnable, value)?;
        }
        log::trace!("channel {}: configuration unlocked", guard.channel.index());
        Ok(guard)
    }

    /// Write a configuration register.
    pub fn write(&mut self, register: Sw35xxRegister, value: u8) -> Result<(), B::Error> {
        self.channel.write_register(self.address, register, value)
    }

    /// Lock the configuration registers again and report whether that worked.
    pub fn finish(mut self) -> Result<(), B::Error> {
        self.locked = true;
        self.lock()
    }

    fn lock(&mut self) -> Result<(), B::Error> {
        let result = self
            .channel
            .write_register(self.address, Sw35xxRegister::I2cEnable, LOCK_VALUE);
        log::trace!("channel {}: configuration locked", self.channel.index());
        result
    }
}

impl<B: I2c> Drop for WriteUnlocked<'_, '_, B> {
    fn drop(&mut self) {
        if self.locked {
            return;
        }
        self.locked = true;
        if let Err(err) = self.lock() {
            log::warn!(
                "channel {}: failed to relock configuration: {:?}",
                self.channel.index(),
                err
            );
        }
    }
}
