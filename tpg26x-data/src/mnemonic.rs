#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command mnemonics of the TPG26x RS-232 protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mnemonic {
    /// A/D converter test
    Adc,
    /// Baud rate (transmission rate)
    Bau,
    /// Calibration factor
    Cal,
    /// Continuous mode
    Com,
    /// Display control digits (display resolution)
    Dcd,
    /// Degas
    Dgs,
    /// Display control (display changeover)
    Dic,
    /// Display test
    Dis,
    /// EEPROM test
    Eep,
    /// Error status
    Epr,
    /// Error status
    Err,
    /// Filter time constant (measurement value filter)
    Fil,
    /// Full scale range (measurement range of linear gauges)
    Fsr,
    /// I/O test
    Iot,
    /// Keylock
    Loc,
    /// Offset correction (linear gauges)
    Ofc,
    /// Offset display (linear gauges)
    Ofd,
    /// Program number (firmware version)
    Pnr,
    /// Pressure measurement gauge 1
    Pr1,
    /// Pressure measurement gauge 2
    Pr2,
    /// Pressure measurement gauge 1 and 2
    Prx,
    /// Penning underrange control
    Puc,
    /// RAM test
    Ram,
    /// Reset
    Res,
    /// RS232 test
    Rst,
    /// Save parameters to EEPROM
    Sav,
    /// Sensor control 1 (gauge control 1)
    Sc1,
    /// Sensor control 2 (gauge control 2)
    Sc2,
    /// Sensor channel change (measurement channel change)
    Sct,
    /// Sensors on/off
    Sen,
    /// Setpoint 1 (switching function 1)
    Sp1,
    /// Setpoint 2 (switching function 2)
    Sp2,
    /// Setpoint 3 (switching function 3)
    Sp3,
    /// Setpoint 4 (switching function 4)
    Sp4,
    /// Setpoint status (switching function status)
    Sps,
    /// Transmitter identification (gauge identification)
    Tid,
    /// Keyboard test (operator key test)
    Tkb,
    /// Torr lock
    Tlc,
    /// Pressure unit
    Uni,
    /// Watchdog control
    Wdt,
}

impl Mnemonic {
    /// ASCII code sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::Bau => "BAU",
            Mnemonic::Cal => "CAL",
            Mnemonic::Com => "COM",
            Mnemonic::Dcd => "DCD",
            Mnemonic::Dgs => "DGS",
            Mnemonic::Dic => "DIC",
            Mnemonic::Dis => "DIS",
            Mnemonic::Eep => "EEP",
            Mnemonic::Epr => "EPR",
            Mnemonic::Err => "ERR",
            Mnemonic::Fil => "FIL",
            Mnemonic::Fsr => "FSR",
            Mnemonic::Iot => "IOT",
            Mnemonic::Loc => "LOC",
            Mnemonic::Ofc => "OFC",
            Mnemonic::Ofd => "OFD",
            Mnemonic::Pnr => "PNR",
            Mnemonic::Pr1 => "PR1",
            Mnemonic::Pr2 => "PR2",
            Mnemonic::Prx => "PRX",
            Mnemonic::Puc => "PUC",
            Mnemonic::Ram => "RAM",
            Mnemonic::Res => "RES",
            Mnemonic::Rst => "RST",
            Mnemonic::Sav => "SAV",
            Mnemonic::Sc1 => "SC1",
            Mnemonic::Sc2 => "SC2",
            Mnemonic::Sct => "SCT",
            Mnemonic::Sen => "SEN",
            Mnemonic::Sp1 => "SP1",
            Mnemonic::Sp2 => "SP2",
            Mnemonic::Sp3 => "SP3",
            Mnemonic::Sp4 => "SP4",
            Mnemonic::Sps => "SPS",
            Mnemonic::Tid => "TID",
            Mnemonic::Tkb => "TKB",
            Mnemonic::Tlc => "TLC",
            Mnemonic::Uni => "UNI",
            Mnemonic::Wdt => "WDT",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
