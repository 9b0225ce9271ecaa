pub mod gauge;
pub mod measurement;
pub mod mnemonic;
pub mod status;

pub use gauge::{Gauge, GaugeId, SensorState};
pub use measurement::{Measurement, MeasurementStatus, PressureUnit};
pub use mnemonic::Mnemonic;
pub use status::{ErrorStatus, ResetError};
