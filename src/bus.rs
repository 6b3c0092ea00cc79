//! Access to the shared two-wire bus.
//!
//! Several chips share one bus behind a channel switch, and all of them answer on the same
//! address. [`Bus`] owns the bus handle; the only way to reach a chip is through a
//! [`Channel`], which [`Bus::channel`] hands out after selecting it. The channel mutably
//! borrows the bus, so exactly one downstream device is reachable at a time.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::{
    error::{Error, Result},
    register::Sw35xxRegister,
};

/// Default address of a TCA9548A channel switch.
pub const TCA9548A_ADDRESS: u8 = 0x70;

/// Highest 7-bit address probed by [`Channel::scan`].
const SCAN_LAST_ADDRESS: u8 = 0x7E;

/// Makes one downstream channel of the bus reachable.
pub trait ChannelSelector<B: I2c> {
    fn select(&mut self, bus: &mut B, channel: u8) -> Result<(), B::Error>;
}

/// Selector for a bus with a single chip and no channel switch.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMux;

impl<B: I2c> ChannelSelector<B> for NoMux {
    fn select(&mut self, _bus: &mut B, _channel: u8) -> Result<(), B::Error> {
        Ok(())
    }
}

/// TCA9548A style 8 channel switch, one enable bit per channel.
#[derive(Debug, Clone, Copy)]
pub struct Tca9548a {
    address: u8,
}

impl Tca9548a {
    pub const CHANNELS: u8 = 8;

    pub fn new(address: u8) -> Self {
        Self { address }
    }
}

impl Default for Tca9548a {
    fn default() -> Self {
        Self::new(TCA9548A_ADDRESS)
    }
}

impl<B: I2c> ChannelSelector<B> for Tca9548a {
    fn select(&mut self, bus: &mut B, channel: u8) -> Result<(), B::Error> {
        if channel >= Self::CHANNELS {
            return Err(Error::InvalidChannel(channel));
        }
        bus.write(self.address, &[1 << channel]).map_err(Error::Bus)
    }
}

/// The bus handle plus the selector used to switch between its channels.
pub struct Bus<B, S> {
    i2c: B,
    selector: S,
}

impl<B: I2c, S: ChannelSelector<B>> Bus<B, S> {
    pub fn new(i2c: B, selector: S) -> Self {
        Self { i2c, selector }
    }

    /// Select `index` and return a token for talking to the device behind it.
    pub fn channel(&mut self, index: u8) -> Result<Channel<'_, B>, B::Error> {
        self.selector.select(&mut self.i2c, index)?;
        Ok(Channel {
            i2c: &mut self.i2c,
            index,
        })
    }

    /// Give back the bus handle and selector.
    pub fn release(self) -> (B, S) {
        (self.i2c, self.selector)
    }
}

/// Proof that a channel has been selected. Every chip operation requires one.
pub struct Channel<'a, B> {
    i2c: &'a mut B,
    index: u8,
}

impl<B: I2c> Channel<'_, B> {
    /// Index of the selected channel.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Check whether a device acknowledges `address`, using a zero length write.
    ///
    /// A missing acknowledge is reported as `Ok(false)`, any other failure as an error.
    pub fn probe(&mut self, address: u8) -> Result<bool, B::Error> {
        match self.i2c.write(address, &[]) {
            Ok(()) => Ok(true),
            Err(err) if matches!(err.kind(), ErrorKind::NoAcknowledge(_)) => Ok(false),
            Err(err) => Err(Error::Bus(err)),
        }
    }

    /// Return every 7-bit address on this channel which acknowledges a probe.
    pub fn scan(&mut self) -> Result<heapless::Vec<u8, 128>, B::Error> {
        let mut found = heapless::Vec::new();
        for address in 0x01..=SCAN_LAST_ADDRESS {
            if self.probe(address)? && found.push(address).is_err() {
                break;
            }
        }
        log::debug!("channel {}: {} device(s) found", self.index, found.len());
        Ok(found)
    }

    /// Read a single register.
    pub(crate) fn read_register(
        &mut self,
        address: u8,
        register: Sw35xxRegister,
    ) -> Result<u8, B::Error> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(address, &[register.into()], &mut buffer)
            .map_err(Error::Bus)?;
        Ok(buffer[0])
    }

    /// Write a single register.
    ///
    /// Configuration registers must only be written through
    /// [`WriteUnlocked`](crate::write_guard::WriteUnlocked).
    pub(crate) fn write_register(
        &mut self,
        address: u8,
        register: Sw35xxRegister,
        value: u8,
    ) -> Result<(), B::Error> {
        self.i2c
            .write(address, &[register.into(), value])
            .map_err(Error::Bus)
    }
}
