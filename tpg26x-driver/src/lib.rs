//! Driver for Pfeiffer TPG26x (TPG261 / TPG262) vacuum gauge controllers.
//!
//! ```no_run
//! let mut tpg = tpg26x_driver::new("/dev/ttyUSB0").open()?;
//! let measurement = tpg.read_pressure(1)?;
//! println!("{} {}", measurement.pressure, measurement.unit);
//! # Ok::<(), tpg26x_driver::Tpg26xError>(())
//! ```
use std::time::Duration;

mod client;
mod codes;
mod command;
mod constants;
mod error;
#[cfg(test)]
mod fake_device;
mod numeric;
mod response;
mod serial;
mod time;

pub use crate::client::{ExchangeState, Tpg26x};
pub use crate::command::Command;
pub use crate::constants::DEFAULT_TIMEOUT_MS;
pub use crate::error::{ProtocolError, Tpg26xError};
pub use crate::numeric::format_pressure;
pub use crate::response::{AckData, Response};
pub use tpg26x_data::*;

use crate::constants::BAUD_RATE;
use serialport::{DataBits, FlowControl, Parity, StopBits};
use tracing::info;

/// Builder for a [`Tpg26x`] connection.
#[derive(Clone, Debug)]
pub struct Tpg26xBuilder {
    port_name: String,
    timeout: Duration,
}

/// Starts building a connection on `port_name`, such as `/dev/ttyUSB0` or `COM3`.
pub fn new(port_name: &str) -> Tpg26xBuilder {
    Tpg26xBuilder {
        port_name: port_name.to_string(),
        timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
    }
}

impl Tpg26xBuilder {
    /// Time allowed for each reply line.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Opens the port with the controller's fixed line settings (9600 8N1).
    pub fn open(self) -> Result<Tpg26x, Tpg26xError> {
        let port = serialport::new(&self.port_name, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.timeout)
            .open()
            .map_err(|source| Tpg26xError::Connection {
                port: self.port_name.clone(),
                source,
            })?;
        info!(port = %self.port_name, timeout_ms = self.timeout.as_millis() as u64, "connection opened");
        Ok(Tpg26x::from_port(port, self.timeout))
    }
}
