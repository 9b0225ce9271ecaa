use crate::codes::{
    to_channel, to_error_status, to_gauge_id, to_measurement_status, to_pressure_unit,
    to_reset_error, to_sensor_state,
};
use crate::constants::{ACK, NACK, PARAM_SEPARATOR};
use crate::error::ProtocolError;
use crate::numeric::{parse_pressure, to_string};
use tpg26x_data::{
    ErrorStatus, Gauge, GaugeId, Measurement, Mnemonic, PressureUnit, ResetError, SensorState,
};

/// Answer to the first half of an exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Acknowledgement {
    Positive,
    Negative,
}

/// Decoded data line of a completed exchange.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// `PR1` / `PR2`
    Measurement(Measurement),
    /// `PRX`, gauge 1 then gauge 2
    Measurements(Measurement, Measurement),
    /// Any other acknowledged mnemonic
    Acknowledgement(AckData),
}

/// Data returned by mnemonics that are not pressure readings.
#[derive(Clone, Debug, PartialEq)]
pub enum AckData {
    GaugeIds(GaugeId, GaugeId),
    SensorStates(SensorState, SensorState),
    Channel(Gauge),
    Unit(PressureUnit),
    ErrorStatus(ErrorStatus),
    ResetErrors(Vec<ResetError>),
    Firmware(String),
    /// Data line of mnemonics without a dedicated decoder, verbatim.
    Raw(String),
}

pub(crate) fn parse_acknowledgement(line: &[u8]) -> Result<Acknowledgement, ProtocolError> {
    match line {
        [ACK] => Ok(Acknowledgement::Positive),
        [NACK] => Ok(Acknowledgement::Negative),
        _ => Err(ProtocolError::UnexpectedAcknowledgement(to_string(line))),
    }
}

fn fields(line: &str, expected: usize) -> Result<Vec<&str>, ProtocolError> {
    let fields = line.split(PARAM_SEPARATOR).collect::<Vec<_>>();
    if fields.len() != expected {
        return Err(ProtocolError::InvalidFieldCount {
            expected,
            actual: fields.len(),
        });
    }
    Ok(fields)
}

fn to_measurement(
    gauge: Gauge,
    status: &str,
    pressure: &str,
    unit: PressureUnit,
) -> Result<Measurement, ProtocolError> {
    let status = to_measurement_status(status)?;
    let value = parse_pressure(pressure)?;
    if status.is_ok() && value < 0. {
        return Err(ProtocolError::NegativePressure(pressure.to_string()));
    }
    Ok(Measurement {
        gauge,
        status,
        pressure: value,
        unit,
    })
}

/// Decodes the data line returned for `mnemonic`. `unit` is the pressure unit
/// currently selected on the controller.
pub(crate) fn decode_response(
    mnemonic: Mnemonic,
    line: &[u8],
    unit: PressureUnit,
) -> Result<Response, ProtocolError> {
    if !line.iter().all(|b| b.is_ascii() && !b.is_ascii_control()) {
        return Err(ProtocolError::NonAscii(to_string(line)));
    }
    // Checked above, every byte is printable ASCII
    let line = std::str::from_utf8(line).map_err(|_| ProtocolError::NonAscii(to_string(line)))?;

    let response = match mnemonic {
        Mnemonic::Pr1 | Mnemonic::Pr2 => {
            let gauge = if mnemonic == Mnemonic::Pr1 {
                Gauge::One
            } else {
                Gauge::Two
            };
            let f = fields(line, 2)?;
            Response::Measurement(to_measurement(gauge, f[0], f[1], unit)?)
        }
        Mnemonic::Prx => {
            let f = fields(line, 4)?;
            Response::Measurements(
                to_measurement(Gauge::One, f[0], f[1], unit)?,
                to_measurement(Gauge::Two, f[2], f[3], unit)?,
            )
        }
        Mnemonic::Tid => {
            let f = fields(line, 2)?;
            Response::Acknowledgement(AckData::GaugeIds(to_gauge_id(f[0]), to_gauge_id(f[1])))
        }
        Mnemonic::Sen => {
            let f = fields(line, 2)?;
            Response::Acknowledgement(AckData::SensorStates(
                to_sensor_state(f[0])?,
                to_sensor_state(f[1])?,
            ))
        }
        Mnemonic::Sct => Response::Acknowledgement(AckData::Channel(to_channel(line)?)),
        Mnemonic::Uni => Response::Acknowledgement(AckData::Unit(to_pressure_unit(line)?)),
        Mnemonic::Err => Response::Acknowledgement(AckData::ErrorStatus(to_error_status(line)?)),
        Mnemonic::Res => {
            let errors = line
                .split(PARAM_SEPARATOR)
                .map(to_reset_error)
                .collect::<Result<Vec<_>, _>>()?;
            Response::Acknowledgement(AckData::ResetErrors(errors))
        }
        Mnemonic::Pnr => Response::Acknowledgement(AckData::Firmware(line.trim().to_string())),
        _ => Response::Acknowledgement(AckData::Raw(line.to_string())),
    };
    Ok(response)
}
