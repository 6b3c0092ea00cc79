//! Per-port state built on top of the driver.
//!
//! A [`Port`] turns the raw telemetry of its chip into the values shown on the display and
//! served to clients: volts, amps, watts and a protocol label.

use embedded_hal::i2c::I2c;

use crate::{bus::Channel, driver::Sw35xx, error::Result};

/// Lifecycle of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortState {
    /// Created, never updated.
    #[default]
    Uninitialized,
    /// Chip answered and the record holds its last reading.
    Active,
    /// Chip did not answer. The record is zeroed.
    Inactive,
}

/// Normalized values of one port.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortRecord {
    /// Output voltage in volts.
    pub voltage: f32,
    /// Output current of both paths combined, in amps.
    pub current: f32,
    /// Input voltage in volts.
    pub input_voltage: f32,
    /// Always zero: the NTC input is grounded on the reference board.
    pub temperature: f32,
    /// Negotiated protocol, empty while the port is inactive.
    pub protocol: &'static str,
}

impl PortRecord {
    /// Output power in watts.
    pub fn power(&self) -> f32 {
        self.voltage * self.current
    }
}

/// Read only view of a port, for the display and HTTP layers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PortSnapshot {
    pub voltage: f32,
    pub current: f32,
    pub input_voltage: f32,
    pub temperature: f32,
    pub protocol: &'static str,
    pub is_active: bool,
    pub power: f32,
}

/// One physical charging port and the chip driving it.
#[derive(Debug)]
pub struct Port {
    number: u8,
    driver: Sw35xx,
    record: PortRecord,
    state: PortState,
}

impl Port {
    /// Create port `number` (1 based, as printed on the enclosure).
    pub fn new(number: u8, mut driver: Sw35xx) -> Self {
        driver.begin();
        Self {
            number,
            driver,
            record: PortRecord::default(),
            state: PortState::Uninitialized,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn state(&self) -> PortState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == PortState::Active
    }

    pub fn record(&self) -> &PortRecord {
        &self.record
    }

    pub fn driver(&self) -> &Sw35xx {
        &self.driver
    }

    /// The driver, for configuration calls on the chip of this port.
    pub fn driver_mut(&mut self) -> &mut Sw35xx {
        &mut self.driver
    }

    /// Output voltage in volts.
    pub fn voltage(&self) -> f32 {
        self.record.voltage
    }

    /// Output current in amps.
    pub fn current(&self) -> f32 {
        self.record.current
    }

    /// Input voltage in volts.
    pub fn input_voltage(&self) -> f32 {
        self.record.input_voltage
    }

    pub fn temperature(&self) -> f32 {
        self.record.temperature
    }

    pub fn protocol(&self) -> &'static str {
        self.record.protocol
    }

    /// Output power in watts, from the last update.
    pub fn power(&self) -> f32 {
        self.record.power()
    }

    /// Refresh the chip telemetry and republish it.
    ///
    /// On a bus error the record is left as it was and the error is returned.
    pub fn update<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
        use_adc_buffer: bool,
    ) -> Result<(), B::Error> {
        self.driver.refresh_status(channel, use_adc_buffer)?;
        let status = self.driver.status();

        self.record = PortRecord {
            voltage: f32::from(status.vout_mv) / 1000.0,
            current: status.iout_total_ma() as f32 / 1000.0,
            input_voltage: f32::from(status.vin_mv) / 1000.0,
            temperature: 0.0,
            protocol: status.protocol_label(),
        };
        log::debug!(
            "port {}: {}V {}A ({}V in), {}",
            self.number,
            self.record.voltage,
            self.record.current,
            self.record.input_voltage,
            self.record.protocol,
        );

        if self.state != PortState::Active {
            log::info!("port {} is active", self.number);
        }
        self.state = PortState::Active;
        Ok(())
    }

    /// Zero all values and mark the port inactive.
    pub fn reset(&mut self) {
        if self.state == PortState::Active {
            log::info!("port {} is inactive", self.number);
        }
        self.record = PortRecord::default();
        self.state = PortState::Inactive;
    }

    pub fn snapshot(&self) -> PortSnapshot {
        PortSnapshot {
            voltage: self.record.voltage,
            current: self.record.current,
            input_voltage: self.record.input_voltage,
            temperature: self.record.temperature,
            protocol: self.record.protocol,
            is_active: self.is_active(),
            power: self.power(),
        }
    }
}
