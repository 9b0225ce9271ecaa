use std::io;
use std::time::Duration;
use thiserror::Error;
use tpg26x_data::{Gauge, MeasurementStatus, Mnemonic, PressureUnit, SensorState};

/// Frame-level failures. The bytes on the line did not match the protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Lines must end with CR LF. Observed = {0}.")]
    InvalidTerminator(String),
    #[error("Reply exceeds {0} bytes without a terminator.")]
    FrameTooLong(usize),
    #[error("Expected ACK or NAK but received {0}.")]
    UnexpectedAcknowledgement(String),
    #[error("Expected {expected} fields but found {actual}.")]
    InvalidFieldCount { expected: usize, actual: usize },
    #[error("\"{0}\" is not a valid number.")]
    InvalidNumber(String),
    #[error("Valid measurement with negative pressure \"{0}\".")]
    NegativePressure(String),
    #[error("Unknown {field} code \"{value}\".")]
    UnknownCode { field: &'static str, value: String },
    #[error("Reply is not ASCII text. Observed = {0}.")]
    NonAscii(String),
    #[error("{mnemonic} answered with {response}.")]
    UnexpectedResponse {
        mnemonic: Mnemonic,
        response: String,
    },
}

#[derive(Debug, Error)]
pub enum Tpg26xError {
    #[error("Failed to open \"{port}\". Error: {source}")]
    Connection {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("No complete response within {} ms.", .0.as_millis())]
    Timeout(Duration),
    #[error("Malformed response. {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Mnemonic {0} was rejected by the TPG26x.")]
    NegativeAcknowledge(Mnemonic),
    #[error("Measurement failed on {gauge}: {status}.")]
    Device {
        gauge: Gauge,
        status: MeasurementStatus,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Gauges cannot be turned on or off. Status: gauge 1 -> {0}, gauge 2 -> {1}.")]
    SensorControl(SensorState, SensorState),
    #[error("Measurement channel wasn't changed. Requested {requested}, device reports {actual}.")]
    ChannelMismatch { requested: Gauge, actual: Gauge },
    #[error("Pressure unit wasn't changed. Requested {requested}, device reports {actual}.")]
    UnitMismatch {
        requested: PressureUnit,
        actual: PressureUnit,
    },
    #[error(transparent)]
    Serial(#[from] serialport::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Tpg26xError {
    /// Errors after which the line may still hold bytes of the failed exchange.
    pub(crate) fn leaves_line_dirty(&self) -> bool {
        matches!(
            self,
            Tpg26xError::Timeout(_) | Tpg26xError::Protocol(_) | Tpg26xError::Io(_)
        )
    }
}
