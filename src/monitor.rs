//! Polling of every port on the shared bus.
//!
//! Each tick selects the channel of a port, checks that its chip answers, and either updates
//! the port or resets it. Nothing is retried: a port that fails on one tick is simply tried
//! again on the next.

use embedded_hal::i2c::I2c;
use fugit::{MillisDurationU32, TimerInstantU32};

use crate::{
    bus::{Bus, ChannelSelector},
    driver::Sw35xx,
    error::Result,
    port::{Port, PortSnapshot},
    register::SW35XX_ADDRESS,
};

/// Millisecond timestamp used to schedule polls.
pub type Instant = TimerInstantU32<1000>;

/// Largest number of ports a [`PortMonitor`] can hold.
pub const MAX_PORTS: usize = u8::MAX as usize;

/// Settings of a [`PortMonitor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Bus address shared by every chip.
    pub chip_address: u8,
    /// Channel of the first port. Port `n` sits on `first_channel + n`.
    pub first_channel: u8,
    /// Minimum time between two polls.
    pub poll_interval: MillisDurationU32,
    /// Read samples through the ADC data buffer instead of the live registers.
    pub use_adc_buffer: bool,
}

impl Default for MonitorConfig {
    /// Reference board: display on channel 0, ports on 1 to 4, polled every second.
    fn default() -> Self {
        Self {
            chip_address: SW35XX_ADDRESS,
            first_channel: 1,
            poll_interval: MillisDurationU32::secs(1),
            use_adc_buffer: false,
        }
    }
}

impl MonitorConfig {
    pub fn with_chip_address(mut self, address: u8) -> Self {
        self.chip_address = address;
        self
    }

    pub fn with_first_channel(mut self, channel: u8) -> Self {
        self.first_channel = channel;
        self
    }

    pub fn with_poll_interval(mut self, interval: MillisDurationU32) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_adc_buffer(mut self, use_adc_buffer: bool) -> Self {
        self.use_adc_buffer = use_adc_buffer;
        self
    }
}

/// Fixed set of `N` ports, indexed by port number minus one.
#[derive(Debug)]
pub struct PortMonitor<const N: usize = 4> {
    config: MonitorConfig,
    ports: [Port; N],
    last_poll: Option<Instant>,
}

impl<const N: usize> PortMonitor<N> {
    /// Create the monitor with ports numbered `1..=N`.
    ///
    /// Port numbers are a `u8`, so `N` may not exceed [`MAX_PORTS`].
    pub fn new(config: MonitorConfig) -> Self {
        const { assert!(N <= MAX_PORTS, "port numbers must fit in a u8") };
        let ports = core::array::from_fn(|index| {
            let number = u8::try_from(index + 1).unwrap_or(u8::MAX);
            Port::new(number, Sw35xx::new(config.chip_address))
        });
        Self {
            config,
            ports,
            last_poll: None,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn ports(&self) -> &[Port; N] {
        &self.ports
    }

    /// Port at `index` (zero based).
    pub fn port(&self, index: usize) -> Option<&Port> {
        self.ports.get(index)
    }

    /// Port at `index` (zero based), for configuring its chip.
    pub fn port_mut(&mut self, index: usize) -> Option<&mut Port> {
        self.ports.get_mut(index)
    }

    /// Bus channel of the port at `index`.
    pub fn channel_of(&self, index: usize) -> u8 {
        channel_of(&self.config, index)
    }

    pub fn snapshots(&self) -> [PortSnapshot; N] {
        core::array::from_fn(|index| self.ports[index].snapshot())
    }

    /// Combined output power of all active ports, in watts.
    pub fn total_power(&self) -> f32 {
        self.ports
            .iter()
            .filter(|port| port.is_active())
            .map(Port::power)
            .sum()
    }

    /// Number of ports which answered on the last poll.
    pub fn active_count(&self) -> usize {
        self.ports.iter().filter(|port| port.is_active()).count()
    }

    /// Probe and update every port once. Returns the number of active ports.
    pub fn poll<B: I2c, S: ChannelSelector<B>>(&mut self, bus: &mut Bus<B, S>) -> usize {
        let config = self.config;
        for (index, port) in self.ports.iter_mut().enumerate() {
            if let Err(err) = poll_port(&config, bus, index, port) {
                if err.is_no_acknowledge() {
                    // Unplugged between the probe and the reads.
                    log::info!("port {}: chip stopped answering", port.number());
                } else {
                    log::warn!("port {}: {:?}", port.number(), err);
                }
                port.reset();
            }
        }
        self.active_count()
    }

    /// Poll when at least one interval has passed since the last poll.
    ///
    /// Returns `None` when it was not yet time to poll.
    pub fn poll_if_due<B: I2c, S: ChannelSelector<B>>(
        &mut self,
        bus: &mut Bus<B, S>,
        now: Instant,
    ) -> Option<usize> {
        if let Some(last) = self.last_poll {
            // `None` means `now` is behind the last poll, so poll right away.
            if let Some(elapsed) = now.checked_duration_since(last) {
                if elapsed < self.config.poll_interval {
                    return None;
                }
            }
        }
        self.last_poll = Some(now);
        Some(self.poll(bus))
    }
}

fn channel_of(config: &MonitorConfig, index: usize) -> u8 {
    u8::try_from(index).map_or(u8::MAX, |offset| config.first_channel.saturating_add(offset))
}

fn poll_port<B: I2c, S: ChannelSelector<B>>(
    config: &MonitorConfig,
    bus: &mut Bus<B, S>,
    index: usize,
    port: &mut Port,
) -> Result<(), B::Error> {
    let mut channel = bus.channel(channel_of(config, index))?;
    if channel.probe(config.chip_address)? {
        port.update(&mut channel, config.use_adc_buffer)
    } else {
        port.reset();
        Ok(())
    }
}
