use embedded_hal::i2c::I2c;

use crate::{
    bus::Channel,
    error::{Error, Result},
    protocol::FastChargeType,
    register::{
        AdcChannel, FcxStatus, PD_CTRL_REBROADCAST, PdCommand, PdGroupEnable, QcConf0,
        QuickChargeConfig, QuickChargePowerClass, SW35XX_ADDRESS, Sw35xxRegister,
    },
    scaling::{current_ma_to_steps, join_sample},
    write_guard::WriteUnlocked,
};

/// Register steps for a 5A current limit.
const STEPS_5A: u8 = 100;

/// Last telemetry read back from the chip.
///
/// Fields keep their previous value until the next successful
/// [`Sw35xx::refresh_status`] or [`Sw35xx::read_temperature_mv`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Status {
    /// Input voltage in millivolts.
    pub vin_mv: u16,
    /// Output voltage in millivolts.
    pub vout_mv: u16,
    /// Output current of the USB-C path in milliamps.
    pub iout_usbc_ma: u16,
    /// Output current of the USB-A path in milliamps.
    pub iout_usba_ma: u16,
    /// Negotiated fast charge protocol.
    pub fast_charge_type: FastChargeType,
    /// PD major version. Only meaningful for the PD protocols.
    pub pd_version: u8,
    /// NTC voltage in millivolts.
    pub ntc_mv: f32,
}

impl Status {
    /// Combined output current of both paths in milliamps.
    pub fn iout_total_ma(&self) -> u32 {
        u32::from(self.iout_usbc_ma) + u32::from(self.iout_usba_ma)
    }

    /// Human readable label of the negotiated protocol.
    pub fn protocol_label(&self) -> &'static str {
        self.fast_charge_type.label(self.pd_version)
    }
}

/// Driver for one SW35xx fast charge controller.
///
/// The driver does not own the bus. Every operation takes the [`Channel`] the chip sits
/// behind, so the caller has to select it first.
///
/// For its methods, "read" means a measured value and "set" writes configuration. Every
/// "set" method unlocks the configuration registers for its own writes and locks them again
/// before returning.
#[derive(Debug)]
pub struct Sw35xx {
    address: u8,
    ready: bool,
    status: Status,
}

impl Default for Sw35xx {
    fn default() -> Self {
        Self::new(SW35XX_ADDRESS)
    }
}

impl Sw35xx {
    /// Create a new driver for the chip at `address`.
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ready: false,
            status: Status::default(),
        }
    }

    /// Mark the session ready. No bus traffic is generated.
    ///
    /// Whether the chip is actually reachable has to be checked with
    /// [`Channel::probe`].
    pub fn begin(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Telemetry from the last successful refresh.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Read voltages, currents and the negotiated protocol.
    ///
    /// With `use_adc_buffer` the samples are taken one by one through the ADC data buffer,
    /// otherwise from the live ADC registers. Nothing is published unless every read
    /// succeeds.
    pub fn refresh_status<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
        use_adc_buffer: bool,
    ) -> Result<(), B::Error> {
        let (vin, vout, iout_usbc, iout_usba) = if use_adc_buffer {
            (
                self.read_adc_buffer(channel, AdcChannel::Vin)?,
                self.read_adc_buffer(channel, AdcChannel::Vout)?,
                self.read_adc_buffer(channel, AdcChannel::IoutUsbC)?,
                self.read_adc_buffer(channel, AdcChannel::IoutUsbA)?,
            )
        } else {
            let vin_h = self.read(channel, Sw35xxRegister::AdcVinH)?;
            let vout_h = self.read(channel, Sw35xxRegister::AdcVoutH)?;
            let vin_vout_l = self.read(channel, Sw35xxRegister::AdcVinVoutL)?;
            let iout_usbc_h = self.read(channel, Sw35xxRegister::AdcIoutCH)?;
            let iout_usba_h = self.read(channel, Sw35xxRegister::AdcIoutAH)?;
            let iout_l = self.read(channel, Sw35xxRegister::AdcIoutL)?;
            (
                join_sample(vin_h, vin_vout_l >> 4),
                join_sample(vout_h, vin_vout_l),
                join_sample(iout_usbc_h, iout_l >> 4),
                join_sample(iout_usba_h, iout_l),
            )
        };
        let fcx = FcxStatus::from_bytes([self.read(channel, Sw35xxRegister::FcxStatus)?]);

        // 12-bit samples stay below u16::MAX after scaling on every channel.
        self.status.vin_mv = AdcChannel::Vin.scaling().raw_to_milli(vin) as u16;
        self.status.vout_mv = AdcChannel::Vout.scaling().raw_to_milli(vout) as u16;
        self.status.iout_usbc_ma = AdcChannel::IoutUsbC.scaling().raw_to_milli(iout_usbc) as u16;
        self.status.iout_usba_ma = AdcChannel::IoutUsbA.scaling().raw_to_milli(iout_usba) as u16;
        self.status.fast_charge_type = FastChargeType::from(fcx.fast_charge_type());
        self.status.pd_version = fcx.pd_version();

        log::debug!(
            "channel {}: vin {}mV, vout {}mV, usb-c {}mA, usb-a {}mA, {:?} (PD version {})",
            channel.index(),
            self.status.vin_mv,
            self.status.vout_mv,
            self.status.iout_usbc_ma,
            self.status.iout_usba_ma,
            self.status.fast_charge_type,
            self.status.pd_version,
        );
        Ok(())
    }

    /// Return the voltage on the NTC pin in millivolts.
    ///
    /// Converting this to a temperature depends on the thermistor fitted and is left to the
    /// caller. On boards where the NTC pin is grounded the value carries no information.
    pub fn read_temperature_mv<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
        use_adc_buffer: bool,
    ) -> Result<f32, B::Error> {
        let raw = if use_adc_buffer {
            self.read_adc_buffer(channel, AdcChannel::Ntc)?
        } else {
            let high = self.read(channel, Sw35xxRegister::AdcTsH)?;
            let low = self.read(channel, Sw35xxRegister::AdcTsL)?;
            join_sample(high, low)
        };
        let ntc_mv = AdcChannel::Ntc.scaling().raw_to_milli_f32(raw);
        self.status.ntc_mv = ntc_mv;
        Ok(ntc_mv)
    }

    /// Return the chip revision.
    pub fn read_ic_version<B: I2c>(&mut self, channel: &mut Channel<'_, B>) -> Result<u8, B::Error> {
        let value = self.read(channel, Sw35xxRegister::IcVersion)?;
        Ok(value & 0x07)
    }

    /// Send a PD command to the attached sink.
    pub fn send_pd_command<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
        command: PdCommand,
    ) -> Result<(), B::Error> {
        log::debug!("channel {}: PD command {:?}", channel.index(), command);
        channel.write_register(self.address, Sw35xxRegister::PdSrcReq, command.request_byte())
    }

    /// Send a PD hard reset to the attached sink.
    pub fn send_hard_reset<B: I2c>(&mut self, channel: &mut Channel<'_, B>) -> Result<(), B::Error> {
        self.send_pd_command(channel, PdCommand::HardReset)
    }

    /// Re-announce the PDOs to the attached sink.
    ///
    /// Current limit changes only take effect after this, or after the cable is replugged.
    pub fn rebroadcast_pdo<B: I2c>(&mut self, channel: &mut Channel<'_, B>) -> Result<(), B::Error> {
        channel.write_register(self.address, Sw35xxRegister::PdCtrl, PD_CTRL_REBROADCAST)
    }

    /// Enable the protocol families in `flags` and disable all others, and select the
    /// voltage class used for fixed voltage negotiation.
    ///
    /// Reserved bits of the configuration registers are preserved.
    pub fn set_quick_charge_config<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
        flags: QuickChargeConfig,
        power_class: QuickChargePowerClass,
    ) -> Result<(), B::Error> {
        let flags = flags.intersection(QuickChargeConfig::all());
        let conf1 = self.read(channel, Sw35xxRegister::QcConf1)?;
        let conf2 = self.read(channel, Sw35xxRegister::QcConf2)?;
        let mut conf0 = QcConf0::from_bytes([self.read(channel, Sw35xxRegister::QcConf0)?]);
        conf0.set_power_class(power_class as u8);

        let mut guard = WriteUnlocked::acquire(channel, self.address)?;
        guard.write(
            Sw35xxRegister::QcConf1,
            (conf1 & !QuickChargeConfig::low_mask()) | flags.low_byte(),
        )?;
        guard.write(
            Sw35xxRegister::QcConf2,
            (conf2 & !QuickChargeConfig::high_mask()) | flags.high_byte(),
        )?;
        guard.write(Sw35xxRegister::QcConf0, conf0.into_bytes()[0])?;
        guard.finish()
    }

    /// Set the maximum current of the fixed voltage PD groups, in milliamps.
    ///
    /// Values are truncated to 50mA steps. A group set to `0` is no longer offered, except
    /// for 5V which cannot be disabled and must not be set to `0`.
    pub fn set_max_current_fixed<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
        ma_5v: u32,
        ma_9v: u32,
        ma_12v: u32,
        ma_15v: u32,
        ma_20v: u32,
    ) -> Result<(), B::Error> {
        let steps = [
            (Sw35xxRegister::PdConf1, steps_or_invalid::<B::Error>(ma_5v)?),
            (Sw35xxRegister::PdConf2, steps_or_invalid::<B::Error>(ma_9v)?),
            (Sw35xxRegister::PdConf3, steps_or_invalid::<B::Error>(ma_12v)?),
            (Sw35xxRegister::PdConf4, steps_or_invalid::<B::Error>(ma_15v)?),
            (Sw35xxRegister::PdConf5, steps_or_invalid::<B::Error>(ma_20v)?),
        ];
        let mut enable = PdGroupEnable::from_bytes([self.read(channel, Sw35xxRegister::PdConf8)?]);
        enable.set_fixed_9v(ma_9v != 0);
        enable.set_fixed_12v(ma_12v != 0);
        enable.set_fixed_15v(ma_15v != 0);
        enable.set_fixed_20v(ma_20v != 0);

        let mut guard = WriteUnlocked::acquire(channel, self.address)?;
        for (register, value) in steps {
            guard.write(register, value)?;
        }
        guard.write(Sw35xxRegister::PdConf8, enable.into_bytes()[0])?;
        guard.finish()
    }

    /// Set the maximum current of the PPS groups, in milliamps. `0` disables a group.
    ///
    /// The chip decides on its own what gets broadcast: PPS1 is dropped when the configured
    /// PD power exceeds 60W, and PPS2 is only offered when its maximum voltage is above
    /// that of PPS1. None of this is checked here.
    pub fn set_max_current_pps<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
        ma_pps1: u32,
        ma_pps2: u32,
    ) -> Result<(), B::Error> {
        let pps1 = steps_or_invalid::<B::Error>(ma_pps1)?;
        let pps2 = steps_or_invalid::<B::Error>(ma_pps2)?;
        let mut enable = PdGroupEnable::from_bytes([self.read(channel, Sw35xxRegister::PdConf8)?]);
        enable.set_pps1(ma_pps1 != 0);
        enable.set_pps2(ma_pps2 != 0);

        let mut guard = WriteUnlocked::acquire(channel, self.address)?;
        guard.write(Sw35xxRegister::PdConf6, pps1)?;
        guard.write(Sw35xxRegister::PdConf7, pps2)?;
        guard.write(Sw35xxRegister::PdConf8, enable.into_bytes()[0])?;
        guard.finish()
    }

    /// Set the maximum current of every PD group to 5A.
    ///
    /// Only safe on the SW3518S. Nothing here checks which chip is attached.
    pub fn set_max_current_all_5a<B: I2c>(
        &mut self,
        channel: &mut Channel<'_, B>,
    ) -> Result<(), B::Error> {
        let mut guard = WriteUnlocked::acquire(channel, self.address)?;
        for register in [
            Sw35xxRegister::PdConf1,
            Sw35xxRegister::PdConf2,
            Sw35xxRegister::PdConf3,
            Sw35xxRegister::PdConf4,
            Sw35xxRegister::PdConf5,
            Sw35xxRegister::PdConf6,
            Sw35xxRegister::PdConf7,
        ] {
            guard.write(register, STEPS_5A)?;
        }
        guard.finish()
    }

    /// Latch `adc` into the ADC data buffer and read it back.
    fn read_adc_buffer<B: I2c>(
        &self,
        channel: &mut Channel<'_, B>,
        adc: AdcChannel,
    ) -> Result<u16, B::Error> {
        channel.write_register(self.address, Sw35xxRegister::AdcDataType, adc as u8)?;
        let high = self.read(channel, Sw35xxRegister::AdcDataBufH)?;
        let low = self.read(channel, Sw35xxRegister::AdcDataBufL)?;
        Ok(join_sample(high, low))
    }

    fn read<B: I2c>(
        &self,
        channel: &mut Channel<'_, B>,
        register: Sw35xxRegister,
    ) -> Result<u8, B::Error> {
        channel.read_register(self.address, register)
    }
}

fn steps_or_invalid<E: embedded_hal::i2c::Error>(current_ma: u32) -> Result<u8, E> {
    current_ma_to_steps(current_ma).ok_or(Error::InvalidRange)
}
