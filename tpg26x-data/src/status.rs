#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Controller error flags reported by `ERR`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorStatus {
    pub controller_error: bool,
    pub no_hardware: bool,
    pub inadmissible_parameter: bool,
    pub syntax_error: bool,
}

impl ErrorStatus {
    pub fn is_ok(&self) -> bool {
        *self == ErrorStatus::default()
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("no error");
        }
        let flags = [
            (self.controller_error, "error"),
            (self.no_hardware, "no hardware"),
            (self.inadmissible_parameter, "inadmissible parameter"),
            (self.syntax_error, "syntax error"),
        ];
        let names = flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();
        f.write_str(&names.join(", "))
    }
}

/// Error reported by the controller after a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResetError {
    NoError,
    WatchdogResponded,
    TaskFailed,
    EpromError,
    RamError,
    EepromError,
    DisplayError,
    AdConverterError,
    Gauge1Error,
    Gauge1IdentificationError,
    Gauge2Error,
    Gauge2IdentificationError,
}

impl fmt::Display for ResetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            ResetError::NoError => "no error",
            ResetError::WatchdogResponded => "watchdog has responded",
            ResetError::TaskFailed => "task fail error",
            ResetError::EpromError => "EPROM error",
            ResetError::RamError => "RAM error",
            ResetError::EepromError => "EEPROM error",
            ResetError::DisplayError => "display error",
            ResetError::AdConverterError => "A/D converter error",
            ResetError::Gauge1Error => "gauge 1 error",
            ResetError::Gauge1IdentificationError => "gauge 1 identification error",
            ResetError::Gauge2Error => "gauge 2 error",
            ResetError::Gauge2IdentificationError => "gauge 2 identification error",
        };
        f.write_str(text)
    }
}
