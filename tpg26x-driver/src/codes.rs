use crate::error::ProtocolError;
use crate::numeric::parse_code;
use tpg26x_data::{ErrorStatus, Gauge, GaugeId, MeasurementStatus, PressureUnit, ResetError, SensorState};

fn unknown(field: &'static str, value: &str) -> ProtocolError {
    ProtocolError::UnknownCode {
        field,
        value: value.to_string(),
    }
}

pub(crate) fn to_measurement_status(raw: &str) -> Result<MeasurementStatus, ProtocolError> {
    match parse_code(raw)? {
        0 => Ok(MeasurementStatus::Ok),
        1 => Ok(MeasurementStatus::Underrange),
        2 => Ok(MeasurementStatus::Overrange),
        3 => Ok(MeasurementStatus::SensorError),
        4 => Ok(MeasurementStatus::SensorOff),
        5 => Ok(MeasurementStatus::NoSensor),
        6 => Ok(MeasurementStatus::IdentificationError),
        _ => Err(unknown("measurement status", raw)),
    }
}

pub(crate) fn to_gauge_id(raw: &str) -> GaugeId {
    match raw {
        "TPR" => GaugeId::Tpr,
        // Older firmware reports IK9
        "IKR9" | "IK9" => GaugeId::Ikr9,
        "IKR11" => GaugeId::Ikr11,
        "PKR" => GaugeId::Pkr,
        "PBR" => GaugeId::Pbr,
        "IMR" => GaugeId::Imr,
        "CMR" => GaugeId::Cmr,
        "noSEn" => GaugeId::NoSensor,
        "noid" => GaugeId::NoIdentifier,
        other => GaugeId::Other(other.to_string()),
    }
}

pub(crate) fn to_sensor_state(raw: &str) -> Result<SensorState, ProtocolError> {
    match parse_code(raw)? {
        0 => Ok(SensorState::CannotSwitch),
        1 => Ok(SensorState::Off),
        2 => Ok(SensorState::On),
        _ => Err(unknown("sensor state", raw)),
    }
}

/// Parameter of `SEN` for one gauge. `None` leaves the gauge untouched.
pub(crate) fn sensor_switch_code(turn_on: Option<bool>) -> &'static str {
    match turn_on {
        None => "0",
        Some(false) => "1",
        Some(true) => "2",
    }
}

pub(crate) fn to_channel(raw: &str) -> Result<Gauge, ProtocolError> {
    match parse_code(raw)? {
        0 => Ok(Gauge::One),
        1 => Ok(Gauge::Two),
        _ => Err(unknown("channel", raw)),
    }
}

pub(crate) fn channel_code(gauge: Gauge) -> &'static str {
    match gauge {
        Gauge::One => "0",
        Gauge::Two => "1",
    }
}

pub(crate) fn to_pressure_unit(raw: &str) -> Result<PressureUnit, ProtocolError> {
    PressureUnit::from_code(parse_code(raw)?).ok_or_else(|| unknown("pressure unit", raw))
}

pub(crate) fn to_error_status(raw: &str) -> Result<ErrorStatus, ProtocolError> {
    let bits = raw.as_bytes();
    if bits.len() != 4 || !bits.iter().all(|b| *b == b'0' || *b == b'1') {
        return Err(unknown("error status", raw));
    }
    Ok(ErrorStatus {
        controller_error: bits[0] == b'1',
        no_hardware: bits[1] == b'1',
        inadmissible_parameter: bits[2] == b'1',
        syntax_error: bits[3] == b'1',
    })
}

pub(crate) fn to_reset_error(raw: &str) -> Result<ResetError, ProtocolError> {
    match parse_code(raw)? {
        0 => Ok(ResetError::NoError),
        1 => Ok(ResetError::WatchdogResponded),
        2 => Ok(ResetError::TaskFailed),
        3 => Ok(ResetError::EpromError),
        4 => Ok(ResetError::RamError),
        5 => Ok(ResetError::EepromError),
        6 => Ok(ResetError::DisplayError),
        7 => Ok(ResetError::AdConverterError),
        9 => Ok(ResetError::Gauge1Error),
        10 => Ok(ResetError::Gauge1IdentificationError),
        11 => Ok(ResetError::Gauge2Error),
        12 => Ok(ResetError::Gauge2IdentificationError),
        _ => Err(unknown("reset error", raw)),
    }
}
