//! Scaling factors for the SW35xx ADC channels and current limit registers.
//!
//! Each ADC channel is a 12-bit sample with its own LSB weight. Factors are kept as a
//! numerator/denominator pair so the conversions stay in integer arithmetic.

use crate::register::AdcChannel;

/// Step size of every PD current limit register.
pub const CURRENT_LIMIT_STEP_MA: u32 = 50;

/// Mask of a 12-bit ADC sample.
pub const ADC_SAMPLE_MASK: u16 = 0x0FFF;

/// Weight of one ADC LSB, as `numerator / denominator` milli-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingFactor {
    pub numerator: u32,
    pub denominator: u32,
}

impl ScalingFactor {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert a raw sample to millivolts or milliamps, truncating.
    #[inline]
    pub const fn raw_to_milli(&self, raw: u16) -> u32 {
        ((raw & ADC_SAMPLE_MASK) as u32 * self.numerator) / self.denominator
    }

    /// Convert a raw sample to fractional millivolts or milliamps.
    #[inline]
    pub fn raw_to_milli_f32(&self, raw: u16) -> f32 {
        (raw & ADC_SAMPLE_MASK) as f32 * self.numerator as f32 / self.denominator as f32
    }
}

impl AdcChannel {
    /// Get the LSB weight of this channel.
    ///
    /// * VIN: 10mV
    /// * VOUT: 6mV
    /// * IOUT: 2.5mA
    /// * NTC: 0.5mV
    pub const fn scaling(&self) -> ScalingFactor {
        match self {
            AdcChannel::Vin => ScalingFactor::new(10, 1),
            AdcChannel::Vout => ScalingFactor::new(6, 1),
            AdcChannel::IoutUsbC | AdcChannel::IoutUsbA => ScalingFactor::new(5, 2),
            AdcChannel::Ntc => ScalingFactor::new(1, 2),
        }
    }
}

/// Join a high byte (bits 11:4) and a nibble (bits 3:0) into a 12-bit sample.
#[inline]
pub const fn join_sample(high: u8, low_nibble: u8) -> u16 {
    ((high as u16) << 4) | (low_nibble & 0x0F) as u16
}

/// Convert a current limit in milliamps into register steps.
///
/// Values are truncated to the 50mA grid. Returns `None` when the step count does not fit
/// the register.
#[inline]
pub fn current_ma_to_steps(current_ma: u32) -> Option<u8> {
    u8::try_from(current_ma / CURRENT_LIMIT_STEP_MA).ok()
}

/// Convert register steps back into milliamps.
#[inline]
pub const fn steps_to_current_ma(steps: u8) -> u32 {
    steps as u32 * CURRENT_LIMIT_STEP_MA
}
