use crate::gauge::Gauge;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code sent in front of every pressure value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeasurementStatus {
    Ok,
    Underrange,
    Overrange,
    SensorError,
    SensorOff,
    NoSensor,
    IdentificationError,
}

impl MeasurementStatus {
    /// Numeric code used on the wire.
    pub fn code(&self) -> u8 {
        match self {
            MeasurementStatus::Ok => 0,
            MeasurementStatus::Underrange => 1,
            MeasurementStatus::Overrange => 2,
            MeasurementStatus::SensorError => 3,
            MeasurementStatus::SensorOff => 4,
            MeasurementStatus::NoSensor => 5,
            MeasurementStatus::IdentificationError => 6,
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == MeasurementStatus::Ok
    }
}

impl fmt::Display for MeasurementStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            MeasurementStatus::Ok => "measurement data okay",
            MeasurementStatus::Underrange => "underrange",
            MeasurementStatus::Overrange => "overrange",
            MeasurementStatus::SensorError => "sensor error",
            MeasurementStatus::SensorOff => "sensor off",
            MeasurementStatus::NoSensor => "no sensor",
            MeasurementStatus::IdentificationError => "identification error",
        };
        write!(f, "{} (status {})", text, self.code())
    }
}

/// Pressure unit selected on the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PressureUnit {
    /// Factory default.
    #[default]
    Mbar,
    Torr,
    Pascal,
}

impl PressureUnit {
    pub fn code(&self) -> u8 {
        match self {
            PressureUnit::Mbar => 0,
            PressureUnit::Torr => 1,
            PressureUnit::Pascal => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<PressureUnit> {
        match code {
            0 => Some(PressureUnit::Mbar),
            1 => Some(PressureUnit::Torr),
            2 => Some(PressureUnit::Pascal),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PressureUnit::Mbar => "mbar",
            PressureUnit::Torr => "Torr",
            PressureUnit::Pascal => "Pa",
        }
    }
}

impl fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One pressure reading of a gauge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// Gauge the value was read from.
    pub gauge: Gauge,
    /// Pressure in `unit`. Only meaningful when `status` is `Ok`.
    pub pressure: f64,
    pub unit: PressureUnit,
    pub status: MeasurementStatus,
}
