//! Classification of the negotiated fast charge protocol.

use strum_macros::EnumIter;

/// Fast charge protocol reported in the low nibble of the FCX status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter)]
#[repr(u8)]
pub enum FastChargeType {
    /// No fast charge protocol negotiated.
    #[default]
    None = 0,
    Qc2 = 1,
    Qc3 = 2,
    Fcp = 3,
    Scp = 4,
    /// PD fixed voltage.
    PdFixed = 5,
    /// PD programmable power supply.
    PdPps = 6,
    MtkPe11 = 7,
    MtkPe20 = 8,
    Lvdc = 9,
    Sfcp = 10,
    Afc = 11,
    /// Any code outside of the documented set.
    Unknown = 0xFF,
}

impl From<u8> for FastChargeType {
    fn from(value: u8) -> Self {
        use FastChargeType as FCT;
        match value {
            0 => FCT::None,
            1 => FCT::Qc2,
            2 => FCT::Qc3,
            3 => FCT::Fcp,
            4 => FCT::Scp,
            5 => FCT::PdFixed,
            6 => FCT::PdPps,
            7 => FCT::MtkPe11,
            8 => FCT::MtkPe20,
            9 => FCT::Lvdc,
            10 => FCT::Sfcp,
            11 => FCT::Afc,
            _ => FCT::Unknown,
        }
    }
}

impl FastChargeType {
    /// Whether this protocol carries a PD version.
    pub const fn is_pd(&self) -> bool {
        matches!(self, Self::PdFixed | Self::PdPps)
    }

    /// Human readable label for this protocol, taking the PD version into account.
    pub const fn label(&self, pd_version: u8) -> &'static str {
        match self {
            Self::None => "None",
            Self::Qc2 => "QC2.0",
            Self::Qc3 => "QC3.0",
            Self::Fcp => "FCP",
            Self::Scp => "SCP",
            Self::PdFixed => match pd_version {
                2 => "PD2.0",
                3 => "PD3.0",
                _ => "Unknown PD",
            },
            Self::PdPps => match pd_version {
                3 => "PD3.0 PPS",
                _ => "Unknown PD PPS",
            },
            Self::MtkPe11 => "MTK PE1.1",
            Self::MtkPe20 => "MTK PE2.0",
            Self::Lvdc => "LVDC",
            Self::Sfcp => "SFCP",
            Self::Afc => "AFC",
            Self::Unknown => "Unknown",
        }
    }
}

/// Label for a raw fast charge code and PD version pair.
pub fn protocol_label(raw_type: u8, pd_version: u8) -> &'static str {
    FastChargeType::from(raw_type).label(pd_version)
}
