//! This module is used to define the registers on the SW35xx fast-charge controllers.
//!
//! Layout follows the SW3518 register map. Other members of the family share most of it,
//! but nothing here detects which variant is attached.

use bitflags::bitflags;
use modular_bitfield::prelude::*;
use strum_macros::EnumIter;

/// Default 7-bit bus address of the chip.
pub const SW35XX_ADDRESS: u8 = 0x3C;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum Sw35xxRegister {
    /// __R__ - Chip revision, bits 2:0.
    IcVersion = 0x01,
    /// __R__ - Fast charge status.
    ///
    /// See [`FcxStatus`] for the layout.
    FcxStatus = 0x06,
    /// __R/W__ - Write protection.
    ///
    /// Writing `0x20`, `0x40`, `0x80` in order unlocks the configuration registers,
    /// writing `0x00` locks them again.
    I2cEnable = 0x12,
    /// __R/W__ - PD control. Writing [`PD_CTRL_REBROADCAST`] re-announces the PDOs.
    PdCtrl = 0x13,
    /// __R__ - Input voltage, ADC bits 11:4.
    AdcVinH = 0x30,
    /// __R__ - Output voltage, ADC bits 11:4.
    AdcVoutH = 0x31,
    /// __R__ - Low nibbles of input (bits 7:4) and output (bits 3:0) voltage.
    AdcVinVoutL = 0x32,
    /// __R__ - USB-C path output current, ADC bits 11:4.
    AdcIoutCH = 0x33,
    /// __R__ - USB-A path output current, ADC bits 11:4.
    AdcIoutAH = 0x34,
    /// __R__ - Low nibbles of USB-C (bits 7:4) and USB-A (bits 3:0) current.
    AdcIoutL = 0x35,
    /// __R__ - NTC voltage, ADC bits 11:4.
    AdcTsH = 0x37,
    /// __R__ - NTC voltage low nibble, bits 3:0.
    AdcTsL = 0x38,
    /// __R/W__ - Selects which channel is latched into the ADC data buffer.
    ///
    /// See [`AdcChannel`].
    AdcDataType = 0x3A,
    /// __R__ - Buffered ADC sample, bits 11:4.
    AdcDataBufH = 0x3B,
    /// __R__ - Buffered ADC sample, bits 3:0.
    AdcDataBufL = 0x3C,
    /// __W__ - PD source request. Value is `0x80 | command`.
    PdSrcReq = 0x70,
    /// __R/W__ - Fixed voltage power class in bits 3:2.
    QcConf0 = 0xAA,
    /// __R/W__ - 5V group maximum current, 50mA per step.
    PdConf1 = 0xB0,
    /// __R/W__ - 9V group maximum current, 50mA per step.
    PdConf2 = 0xB1,
    /// __R/W__ - 12V group maximum current, 50mA per step.
    PdConf3 = 0xB2,
    /// __R/W__ - 15V group maximum current, 50mA per step.
    PdConf4 = 0xB3,
    /// __R/W__ - 20V group maximum current, 50mA per step.
    PdConf5 = 0xB4,
    /// __R/W__ - PPS group 1 maximum current, 50mA per step.
    PdConf6 = 0xB5,
    /// __R/W__ - PPS group 2 maximum current, 50mA per step.
    PdConf7 = 0xB6,
    /// __R/W__ - PD group enables.
    ///
    /// See [`PdGroupEnable`].
    PdConf8 = 0xB7,
    /// __R/W__ - Protocol enables, low byte of [`QuickChargeConfig`].
    QcConf1 = 0xB8,
    /// __R/W__ - Protocol enables, high byte of [`QuickChargeConfig`].
    QcConf2 = 0xB9,
}

impl From<Sw35xxRegister> for u8 {
    fn from(value: Sw35xxRegister) -> Self {
        value as u8
    }
}

/// Bytes written to [`Sw35xxRegister::I2cEnable`] to unlock configuration writes.
pub const UNLOCK_SEQUENCE: [u8; 3] = [0x20, 0x40, 0x80];
/// Byte written to [`Sw35xxRegister::I2cEnable`] to lock configuration writes.
pub const LOCK_VALUE: u8 = 0x00;
/// Value written to [`Sw35xxRegister::PdCtrl`] to rebroadcast the PDOs.
pub const PD_CTRL_REBROADCAST: u8 = 0x03;
/// Flag which triggers a PD source request.
pub const PD_SRC_REQ_TRIGGER: u8 = 0x80;

/// "Fast charge status register".
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct FcxStatus {
    /// Raw [`FastChargeType`](crate::protocol::FastChargeType) code.
    pub fast_charge_type: B4,
    /// PD major version minus one.
    pub pd_version_minus_one: B2,
    #[skip]
    __: B2,
}

impl FcxStatus {
    /// PD major version, `2` for PD2.0 and `3` for PD3.0.
    pub fn pd_version(&self) -> u8 {
        self.pd_version_minus_one() + 1
    }
}

/// Enable bits for the PD power groups. The 5V group cannot be disabled and has no bit.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct PdGroupEnable {
    #[skip]
    __: B2,
    pub fixed_9v: bool,
    pub fixed_12v: bool,
    pub fixed_15v: bool,
    pub fixed_20v: bool,
    pub pps1: bool,
    pub pps2: bool,
}

/// Layout of [`Sw35xxRegister::QcConf0`].
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct QcConf0 {
    #[skip]
    __: B2,
    pub power_class: B2,
    #[skip]
    __: B4,
}

bitflags! {
    /// Protocol families which the chip may negotiate. Combine with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QuickChargeConfig: u16 {
        const PE = 1 << 0;
        const SCP = 1 << 2;
        const FCP = 1 << 3;
        const QC = 1 << 4;
        const PD = 1 << 5;
        const PORT2 = 1 << 6;
        const PORT1 = 1 << 7;
        const AFC = 1 << (8 + 6);
        const SFCP = 1 << (8 + 7);
    }
}

impl QuickChargeConfig {
    /// Bits of [`Sw35xxRegister::QcConf1`] owned by this mask.
    pub const fn low_mask() -> u8 {
        Self::all().bits() as u8
    }

    /// Bits of [`Sw35xxRegister::QcConf2`] owned by this mask.
    pub const fn high_mask() -> u8 {
        (Self::all().bits() >> 8) as u8
    }

    pub const fn low_byte(&self) -> u8 {
        self.bits() as u8
    }

    pub const fn high_byte(&self) -> u8 {
        (self.bits() >> 8) as u8
    }
}

/// Voltage class offered for fixed voltage negotiation (QC and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum QuickChargePowerClass {
    _9V = 0,
    _12V = 1,
    _20V1 = 2,
    _20V2 = 3,
}

/// Channels which can be latched into the ADC data buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum AdcChannel {
    Vin = 1,
    Vout = 2,
    IoutUsbC = 3,
    IoutUsbA = 4,
    Ntc = 6,
}

/// PD commands accepted by [`Sw35xxRegister::PdSrcReq`].
///
/// Only hard reset is documented. Codes 2 to 15 are accepted by the chip but their meaning
/// is unknown, so they are not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PdCommand {
    HardReset = 1,
}

impl PdCommand {
    /// Value to write to [`Sw35xxRegister::PdSrcReq`].
    pub const fn request_byte(self) -> u8 {
        PD_SRC_REQ_TRIGGER | self as u8
    }
}
