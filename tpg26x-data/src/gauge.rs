#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gauge slot of a TPG26x controller. The TPG261 only populates `One`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Gauge {
    One,
    Two,
}

impl Gauge {
    /// Both gauge slots in channel order.
    pub const ALL: [Gauge; 2] = [Gauge::One, Gauge::Two];

    /// Converts a 1-based channel number into a gauge slot.
    pub fn from_channel(channel: u8) -> Option<Gauge> {
        match channel {
            1 => Some(Gauge::One),
            2 => Some(Gauge::Two),
            _ => None,
        }
    }

    /// 1-based channel number as printed on the front panel.
    pub fn channel(&self) -> u8 {
        match self {
            Gauge::One => 1,
            Gauge::Two => 2,
        }
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "gauge {}", self.channel())
    }
}

/// Transmitter identification reported for a gauge slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GaugeId {
    /// Pirani Gauge or Pirani Capacitive gauge
    Tpr,
    /// Cold Cathode Gauge 10^-9
    Ikr9,
    /// Cold Cathode Gauge 10^-11
    Ikr11,
    /// FullRange CC Gauge
    Pkr,
    /// FullRange BA Gauge
    Pbr,
    /// Pirani / High Pressure Gauge
    Imr,
    /// Linear gauge
    Cmr,
    /// No gauge connected
    NoSensor,
    /// Gauge connected but not identified
    NoIdentifier,
    /// Identifier unknown to this driver
    Other(String),
}

impl fmt::Display for GaugeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            GaugeId::Tpr => "TPR",
            GaugeId::Ikr9 => "IKR9",
            GaugeId::Ikr11 => "IKR11",
            GaugeId::Pkr => "PKR",
            GaugeId::Pbr => "PBR",
            GaugeId::Imr => "IMR",
            GaugeId::Cmr => "CMR",
            GaugeId::NoSensor => "noSEn",
            GaugeId::NoIdentifier => "noid",
            GaugeId::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// On/off state of a gauge as reported by the sensor control command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorState {
    /// The gauge cannot be switched (e.g. not a switchable gauge type)
    CannotSwitch,
    Off,
    On,
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SensorState::CannotSwitch => f.write_str("cannot be switched"),
            SensorState::Off => f.write_str("off"),
            SensorState::On => f.write_str("on"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_channel() {
        assert_eq!(Gauge::from_channel(1), Some(Gauge::One));
        assert_eq!(Gauge::from_channel(2), Some(Gauge::Two));
        assert_eq!(Gauge::from_channel(0), None);
        assert_eq!(Gauge::from_channel(3), None);
        for gauge in Gauge::ALL {
            assert_eq!(Gauge::from_channel(gauge.channel()), Some(gauge));
        }
    }

    #[test]
    fn test_gauge_id_display() {
        assert_eq!(GaugeId::NoSensor.to_string(), "noSEn");
        assert_eq!(GaugeId::Other("XYZ".to_string()).to_string(), "XYZ");
    }
}
