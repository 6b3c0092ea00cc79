//! This crate provides a driver for the SW35xx family of USB fast-charge controllers
//! (SW3516, SW3518 and relatives), and the per-port bookkeeping of a multi-port charger built
//! around them.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! Every chip answers on the same two-wire address, so a board with several ports places them
//! behind a TCA9548A style channel switch. The [`bus::Bus`] type owns the bus and hands out a
//! [`bus::Channel`] per selected channel; all chip operations take that channel, so a register
//! can never be read from the wrong port.
//!
//! The layers, bottom up:
//! * [`register`] and [`scaling`]: register map, bit layouts and ADC scaling.
//! * [`driver`]: the [`Sw35xx`] register driver.
//! * [`port`]: converts raw telemetry into volts, amps, watts and a protocol label.
//! * [`monitor`]: polls every port on a fixed cadence.
//!
//! The register map follows the SW3518 datasheet. Other family members share the telemetry
//! registers but may differ in the configuration area.

#![cfg_attr(feature = "no-std", no_std)]

pub mod bus;
pub mod driver;
pub mod error;
pub mod monitor;
pub mod port;
pub mod protocol;
pub mod register;
pub mod scaling;
pub mod write_guard;

#[cfg(test)]
mod mock_bus;

pub use bus::{Bus, Channel, ChannelSelector, NoMux, Tca9548a};
pub use driver::{Status, Sw35xx};
pub use error::{Error, Result};
pub use monitor::{MAX_PORTS, MonitorConfig, PortMonitor};
pub use port::{Port, PortSnapshot, PortState};
pub use protocol::FastChargeType;
