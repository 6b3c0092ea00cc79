//! We use this mocking module in unit tests to emulate the shared two-wire bus.
//!
//! The emulated board has a TCA9548A style switch at `0x70` and one SW35xx at `0x3C` behind
//! each of its eight channels. Chips can be removed per channel.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::{
    bus::TCA9548A_ADDRESS,
    register::{SW35XX_ADDRESS, Sw35xxRegister},
};

const CHANNELS: usize = 8;

/// Our mock type used to emulate the bus.
pub struct MockBus {
    /// Register file of the chip behind each channel.
    registers: [[u8; 256]; CHANNELS],
    /// Whether a chip answers behind each channel.
    present: [bool; CHANNELS],
    /// Register pointer of the chip behind each channel.
    pointer: [u8; CHANNELS],
    /// Channel enabled on the switch. `None` behaves as channel 0, for setups without a switch.
    selected: Option<u8>,
    /// Every value written to the switch.
    mux_writes: heapless::Vec<u8, 64>,
    /// Every register write as `(channel, register, value)`.
    write_log: heapless::Vec<(u8, u8, u8), 256>,
    /// Number of transactions addressed to the chip, per channel.
    chip_transactions: [usize; CHANNELS],
    /// Flag to simulate write errors on the chip.
    should_error_on_write: bool,
    /// Flag to simulate read errors on the chip.
    should_error_on_read: bool,
    /// Number of register reads which succeed before reads start failing.
    reads_before_error: Option<usize>,
}

#[derive(Debug)]
pub enum MockBusError {
    /// Nothing acknowledged the address.
    NoAcknowledge,
    /// Generic simulated error for testing.
    SimulatedError,
}

impl embedded_hal::i2c::Error for MockBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            MockBusError::NoAcknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            MockBusError::SimulatedError => ErrorKind::Other,
        }
    }
}

impl ErrorType for MockBus {
    type Error = MockBusError;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address == TCA9548A_ADDRESS {
            return self.mux_transaction(operations);
        }

        let channel = self.active_channel();
        if address == SW35XX_ADDRESS {
            self.chip_transactions[channel] += 1;
        }
        if address != SW35XX_ADDRESS || !self.present[channel] {
            return Err(MockBusError::NoAcknowledge);
        }

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => self.chip_write(channel, bytes)?,
                Operation::Read(buffer) => self.chip_read(channel, buffer)?,
            }
        }
        Ok(())
    }
}

impl MockBus {
    /// Create a new MockBus with every chip absent and all registers zeroed.
    pub fn new() -> Self {
        Self {
            registers: [[0u8; 256]; CHANNELS],
            present: [false; CHANNELS],
            pointer: [0u8; CHANNELS],
            selected: None,
            mux_writes: heapless::Vec::new(),
            write_log: heapless::Vec::new(),
            chip_transactions: [0; CHANNELS],
            should_error_on_write: false,
            should_error_on_read: false,
            reads_before_error: None,
        }
    }

    /// Plug or unplug the chip behind `channel`.
    pub fn set_present(&mut self, channel: u8, present: bool) {
        self.present[channel as usize] = present;
    }

    /// Preload a register of the chip behind `channel`.
    pub fn set_register(&mut self, channel: u8, register: Sw35xxRegister, value: u8) {
        self.registers[channel as usize][register as usize] = value;
    }

    /// Current value of a register of the chip behind `channel`.
    pub fn register(&self, channel: u8, register: Sw35xxRegister) -> u8 {
        self.registers[channel as usize][register as usize]
    }

    /// Channel currently enabled on the switch.
    pub fn selected_channel(&self) -> Option<u8> {
        self.selected
    }

    /// Values written to the switch.
    pub fn mux_writes(&self) -> &[u8] {
        &self.mux_writes
    }

    /// Register writes as `(channel, register, value)`.
    pub fn write_log(&self) -> &[(u8, u8, u8)] {
        &self.write_log
    }

    /// Values written to one register of the chip behind `channel`, in order.
    pub fn writes_to(&self, channel: u8, register: Sw35xxRegister) -> heapless::Vec<u8, 256> {
        self.write_log
            .iter()
            .filter(|(c, r, _)| *c == channel && *r == register as u8)
            .map(|(_, _, v)| *v)
            .collect()
    }

    /// Number of transactions addressed to the chip behind `channel`, probes included.
    pub fn chip_transactions(&self, channel: u8) -> usize {
        self.chip_transactions[channel as usize]
    }

    /// Configure whether chip writes should fail with an error.
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether chip reads should fail with an error.
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    /// Let `count` more register reads succeed, then fail every read after that.
    pub fn set_read_error_after(&mut self, count: usize) {
        self.reads_before_error = Some(count);
    }

    fn active_channel(&self) -> usize {
        self.selected.unwrap_or(0) as usize
    }

    fn mux_transaction(&mut self, operations: &mut [Operation<'_>]) -> Result<(), MockBusError> {
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    if let Some(&mask) = bytes.last() {
                        self.mux_writes
                            .push(mask)
                            .map_err(|_| MockBusError::SimulatedError)?;
                        self.selected = (mask.count_ones() == 1).then(|| mask.trailing_zeros() as u8);
                    }
                }
                Operation::Read(buffer) => {
                    let mask = self.selected.map_or(0, |channel| 1 << channel);
                    buffer.fill(mask);
                }
            }
        }
        Ok(())
    }

    fn chip_write(&mut self, channel: usize, bytes: &[u8]) -> Result<(), MockBusError> {
        if self.should_error_on_write {
            return Err(MockBusError::SimulatedError);
        }
        let Some((&register, data)) = bytes.split_first() else {
            // Zero length write, the address was acknowledged and that is all.
            return Ok(());
        };
        self.pointer[channel] = register;
        for &value in data {
            let register = self.pointer[channel];
            self.registers[channel][register as usize] = value;
            self.write_log
                .push((channel as u8, register, value))
                .map_err(|_| MockBusError::SimulatedError)?;
            self.pointer[channel] = register.wrapping_add(1);
        }
        Ok(())
    }

    fn chip_read(&mut self, channel: usize, buffer: &mut [u8]) -> Result<(), MockBusError> {
        if self.should_error_on_read {
            return Err(MockBusError::SimulatedError);
        }
        if let Some(remaining) = self.reads_before_error.as_mut() {
            if *remaining == 0 {
                return Err(MockBusError::SimulatedError);
            }
            *remaining -= 1;
        }
        for byte in buffer.iter_mut() {
            let register = self.pointer[channel];
            *byte = self.registers[channel][register as usize];
            self.pointer[channel] = register.wrapping_add(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error;

    #[test]
    fn test_new_mock_bus() {
        let mock = MockBus::new();
        assert!(mock.write_log().is_empty());
        assert!(mock.mux_writes().is_empty());
        assert_eq!(mock.selected_channel(), None);
        assert!(!mock.should_error_on_write);
        assert!(!mock.should_error_on_read);
    }

    #[test]
    fn test_absent_chip_does_not_acknowledge() {
        let mut mock = MockBus::new();
        let result = mock.write(SW35XX_ADDRESS, &[]);
        assert!(matches!(result, Err(MockBusError::NoAcknowledge)));
        assert_eq!(mock.chip_transactions(0), 1);
    }

    #[test]
    fn test_unknown_address_does_not_acknowledge() {
        let mut mock = MockBus::new();
        mock.set_present(0, true);
        assert!(matches!(mock.write(0x50, &[]), Err(MockBusError::NoAcknowledge)));
        assert_eq!(mock.chip_transactions(0), 0);
    }

    #[test]
    fn test_channels_have_separate_registers() {
        let mut mock = MockBus::new();
        mock.set_present(1, true);
        mock.set_present(2, true);

        mock.write(TCA9548A_ADDRESS, &[1 << 1]).unwrap();
        mock.write(SW35XX_ADDRESS, &[0x30, 0xAA]).unwrap();
        mock.write(TCA9548A_ADDRESS, &[1 << 2]).unwrap();
        mock.write(SW35XX_ADDRESS, &[0x30, 0x55]).unwrap();

        assert_eq!(mock.register(1, Sw35xxRegister::AdcVinH), 0xAA);
        assert_eq!(mock.register(2, Sw35xxRegister::AdcVinH), 0x55);
        assert_eq!(mock.write_log(), &[(1, 0x30, 0xAA), (2, 0x30, 0x55)]);
    }

    #[test]
    fn test_write_read() {
        let mut mock = MockBus::new();
        mock.set_present(0, true);
        mock.set_register(0, Sw35xxRegister::FcxStatus, 0x25);

        let mut buffer = [0u8; 1];
        mock.write_read(SW35XX_ADDRESS, &[0x06], &mut buffer).unwrap();
        assert_eq!(buffer, [0x25]);
    }

    #[test]
    fn test_mux_with_no_channel_selected() {
        let mut mock = MockBus::new();
        mock.write(TCA9548A_ADDRESS, &[0x00]).unwrap();
        assert_eq!(mock.selected_channel(), None);
    }

    #[test]
    fn test_error_simulation() {
        let mut mock = MockBus::new();
        mock.set_present(0, true);

        mock.set_write_error(true);
        assert!(matches!(
            mock.write(SW35XX_ADDRESS, &[0x12, 0x20]),
            Err(MockBusError::SimulatedError)
        ));
        assert!(mock.write_log().is_empty());
        mock.set_write_error(false);

        mock.set_read_error(true);
        let mut buffer = [0u8; 1];
        assert!(mock.write_read(SW35XX_ADDRESS, &[0x06], &mut buffer).is_err());
        mock.set_read_error(false);

        mock.set_read_error_after(1);
        assert!(mock.write_read(SW35XX_ADDRESS, &[0x06], &mut buffer).is_ok());
        assert!(mock.write_read(SW35XX_ADDRESS, &[0x06], &mut buffer).is_err());
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            MockBusError::NoAcknowledge.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        ));
        assert!(matches!(MockBusError::SimulatedError.kind(), ErrorKind::Other));
    }
}
