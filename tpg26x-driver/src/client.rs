use crate::codes::{channel_code, sensor_switch_code};
use crate::command::Command;
use crate::error::{ProtocolError, Tpg26xError};
use crate::response::{decode_response, parse_acknowledgement, Acknowledgement, AckData, Response};
use crate::serial::{discard_input, read_line, reset_interface, send_command, send_enquiry};
use serialport::SerialPort;
use std::time::Duration;
use tpg26x_data::{
    ErrorStatus, Gauge, GaugeId, Measurement, Mnemonic, PressureUnit, ResetError, SensorState,
};
use tracing::{info, trace, warn};

/// Progress of the exchange currently running on a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    /// Command written, waiting for ACK/NAK.
    AwaitingAck,
    /// Enquiry written, waiting for the data line.
    AwaitingData,
    /// The last exchange failed. Left as soon as the error is reported.
    Error,
}

/// Connection to a TPG26x controller.
///
/// Owns the serial port; the port is closed when the value is dropped. Every
/// exchange borrows the connection mutably, so a second command can never be
/// written while a response is pending. Share it between threads behind a
/// `Mutex`.
pub struct Tpg26x {
    port: Box<dyn SerialPort>,
    timeout: Duration,
    unit: PressureUnit,
    state: ExchangeState,
}

impl Tpg26x {
    /// Wraps an opened port. `timeout` bounds the wait for each reply line.
    pub fn from_port(port: Box<dyn SerialPort>, timeout: Duration) -> Tpg26x {
        Tpg26x {
            port,
            timeout,
            unit: PressureUnit::default(),
            state: ExchangeState::Idle,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Pressure unit stamped on measurements. Refreshed by every `UNI`
    /// exchange; the controller's factory default is mbar.
    pub fn unit(&self) -> PressureUnit {
        self.unit
    }

    pub fn port_name(&self) -> Option<String> {
        self.port.name()
    }

    /// Closes the port.
    pub fn close(self) {
        info!(port = ?self.port.name(), "closing connection");
    }

    fn set_state(&mut self, state: ExchangeState) {
        trace!(from = ?self.state, to = ?state, "exchange state");
        self.state = state;
    }

    /// Runs one command/enquiry exchange and decodes the data line.
    ///
    /// A single-gauge measurement with a non-OK status fails with
    /// [`Tpg26xError::Device`]. After any error the connection is ready for
    /// the next command.
    pub fn send_command(&mut self, command: &Command) -> Result<Response, Tpg26xError> {
        match self.exchange(command) {
            Ok(response) => {
                self.set_state(ExchangeState::Idle);
                Ok(response)
            }
            Err(e) => {
                self.set_state(ExchangeState::Error);
                warn!(mnemonic = %command.mnemonic(), error = %e, "exchange failed");
                if e.leaves_line_dirty() {
                    if let Err(reset_error) = reset_interface(&mut self.port) {
                        warn!(error = %reset_error, "failed to reset the interface");
                    }
                }
                self.set_state(ExchangeState::Idle);
                Err(e)
            }
        }
    }

    fn exchange(&mut self, command: &Command) -> Result<Response, Tpg26xError> {
        let mnemonic = command.mnemonic();

        // A reply that missed its deadline must not be taken for this one
        discard_input(&mut self.port)?;
        send_command(&mut self.port, command)?;
        self.set_state(ExchangeState::AwaitingAck);
        let ack = read_line(&mut self.port, self.timeout)?;
        if parse_acknowledgement(&ack)? == Acknowledgement::Negative {
            return Err(Tpg26xError::NegativeAcknowledge(mnemonic));
        }

        send_enquiry(&mut self.port)?;
        self.set_state(ExchangeState::AwaitingData);
        let line = read_line(&mut self.port, self.timeout)?;
        let response = decode_response(mnemonic, &line, self.unit)?;

        match &response {
            Response::Measurement(m) if !m.status.is_ok() => {
                return Err(Tpg26xError::Device {
                    gauge: m.gauge,
                    status: m.status,
                });
            }
            Response::Acknowledgement(AckData::Unit(unit)) => self.unit = *unit,
            _ => (),
        }
        Ok(response)
    }

    fn query(&mut self, mnemonic: Mnemonic) -> Result<Response, Tpg26xError> {
        self.send_command(&Command::new(mnemonic))
    }

    /// Reads the pressure of gauge `channel` (1 or 2). Nothing is written to
    /// the port when the channel is out of range.
    pub fn read_pressure(&mut self, channel: u8) -> Result<Measurement, Tpg26xError> {
        let gauge = Gauge::from_channel(channel).ok_or_else(|| {
            Tpg26xError::InvalidArgument(format!("channel must be 1 or 2, got {}", channel))
        })?;
        self.read_gauge(gauge)
    }

    pub fn read_gauge(&mut self, gauge: Gauge) -> Result<Measurement, Tpg26xError> {
        let mnemonic = match gauge {
            Gauge::One => Mnemonic::Pr1,
            Gauge::Two => Mnemonic::Pr2,
        };
        match self.query(mnemonic)? {
            Response::Measurement(m) => Ok(m),
            other => Err(unexpected(mnemonic, &other)),
        }
    }

    pub fn read_gauge1(&mut self) -> Result<Measurement, Tpg26xError> {
        self.read_gauge(Gauge::One)
    }

    pub fn read_gauge2(&mut self) -> Result<Measurement, Tpg26xError> {
        self.read_gauge(Gauge::Two)
    }

    /// Reads both gauges in one exchange. Statuses are reported per gauge
    /// rather than as an error.
    pub fn read_both(&mut self) -> Result<(Measurement, Measurement), Tpg26xError> {
        match self.query(Mnemonic::Prx)? {
            Response::Measurements(m1, m2) => Ok((m1, m2)),
            other => Err(unexpected(Mnemonic::Prx, &other)),
        }
    }

    pub fn gauge_ids(&mut self) -> Result<(GaugeId, GaugeId), Tpg26xError> {
        match self.query(Mnemonic::Tid)? {
            Response::Acknowledgement(AckData::GaugeIds(id1, id2)) => Ok((id1, id2)),
            other => Err(unexpected(Mnemonic::Tid, &other)),
        }
    }

    /// Switches gauges on (`Some(true)`) or off (`Some(false)`); `None` leaves
    /// a gauge as it is. Fails if the controller did not apply a requested
    /// change.
    pub fn switch_sensors(
        &mut self,
        gauge1: Option<bool>,
        gauge2: Option<bool>,
    ) -> Result<(SensorState, SensorState), Tpg26xError> {
        let command = Command::with_params(
            Mnemonic::Sen,
            [sensor_switch_code(gauge1), sensor_switch_code(gauge2)],
        )?;
        let (state1, state2) = match self.send_command(&command)? {
            Response::Acknowledgement(AckData::SensorStates(s1, s2)) => (s1, s2),
            other => return Err(unexpected(Mnemonic::Sen, &other)),
        };
        let applied = |requested: Option<bool>, state: SensorState| match requested {
            None => true,
            Some(true) => state == SensorState::On,
            Some(false) => state == SensorState::Off,
        };
        if !applied(gauge1, state1) || !applied(gauge2, state2) {
            return Err(Tpg26xError::SensorControl(state1, state2));
        }
        Ok((state1, state2))
    }

    pub fn turn_on(&mut self, gauge: Gauge) -> Result<(), Tpg26xError> {
        self.switch_gauge(gauge, true)
    }

    pub fn turn_off(&mut self, gauge: Gauge) -> Result<(), Tpg26xError> {
        self.switch_gauge(gauge, false)
    }

    fn switch_gauge(&mut self, gauge: Gauge, on: bool) -> Result<(), Tpg26xError> {
        match gauge {
            Gauge::One => self.switch_sensors(Some(on), None)?,
            Gauge::Two => self.switch_sensors(None, Some(on))?,
        };
        Ok(())
    }

    /// Selects the gauge shown on the measurement display.
    pub fn change_channel(&mut self, gauge: Gauge) -> Result<(), Tpg26xError> {
        let command = Command::with_params(Mnemonic::Sct, [channel_code(gauge)])?;
        match self.send_command(&command)? {
            Response::Acknowledgement(AckData::Channel(actual)) if actual == gauge => Ok(()),
            Response::Acknowledgement(AckData::Channel(actual)) => {
                Err(Tpg26xError::ChannelMismatch {
                    requested: gauge,
                    actual,
                })
            }
            other => Err(unexpected(Mnemonic::Sct, &other)),
        }
    }

    pub fn error_status(&mut self) -> Result<ErrorStatus, Tpg26xError> {
        match self.query(Mnemonic::Err)? {
            Response::Acknowledgement(AckData::ErrorStatus(status)) => Ok(status),
            other => Err(unexpected(Mnemonic::Err, &other)),
        }
    }

    /// Resets the controller and returns the errors it reports afterwards.
    pub fn reset(&mut self) -> Result<Vec<ResetError>, Tpg26xError> {
        let command = Command::with_params(Mnemonic::Res, ["1"])?;
        match self.send_command(&command)? {
            Response::Acknowledgement(AckData::ResetErrors(errors)) => Ok(errors),
            other => Err(unexpected(Mnemonic::Res, &other)),
        }
    }

    /// Reads the unit selected on the controller and caches it.
    pub fn pressure_unit(&mut self) -> Result<PressureUnit, Tpg26xError> {
        match self.query(Mnemonic::Uni)? {
            Response::Acknowledgement(AckData::Unit(unit)) => Ok(unit),
            other => Err(unexpected(Mnemonic::Uni, &other)),
        }
    }

    pub fn set_pressure_unit(&mut self, unit: PressureUnit) -> Result<(), Tpg26xError> {
        let command = Command::with_params(Mnemonic::Uni, [unit.code().to_string()])?;
        match self.send_command(&command)? {
            Response::Acknowledgement(AckData::Unit(actual)) if actual == unit => Ok(()),
            Response::Acknowledgement(AckData::Unit(actual)) => Err(Tpg26xError::UnitMismatch {
                requested: unit,
                actual,
            }),
            other => Err(unexpected(Mnemonic::Uni, &other)),
        }
    }

    pub fn firmware_version(&mut self) -> Result<String, Tpg26xError> {
        match self.query(Mnemonic::Pnr)? {
            Response::Acknowledgement(AckData::Firmware(version)) => Ok(version),
            other => Err(unexpected(Mnemonic::Pnr, &other)),
        }
    }
}

// Unreachable as long as decode_response maps each mnemonic to one variant
fn unexpected(mnemonic: Mnemonic, response: &Response) -> Tpg26xError {
    ProtocolError::UnexpectedResponse {
        mnemonic,
        response: format!("{:?}", response),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ACK, END_OF_TEXT, ENQUIRY, NACK};
    use crate::fake_device::{with_device, FakeDevice};
    use crate::time::sleep_ms;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;
    use tpg26x_data::MeasurementStatus;

    const TIMEOUT: Duration = Duration::from_millis(300);

    #[test]
    fn test_read_pressure() {
        with_device(
            |device| {
                device.serve(b"PR1\r\n", b"0,1.2340E-03");
                device.serve(b"PR2\r\n", b"0,+5.6000E+02");
                device.assert_silent();
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                let m = tpg.read_pressure(1).unwrap();
                assert_eq!(m.gauge, Gauge::One);
                assert_eq!(m.pressure, 1.234e-3);
                assert_eq!(m.unit, PressureUnit::Mbar);
                assert_eq!(m.status, MeasurementStatus::Ok);

                let m = tpg.read_pressure(2).unwrap();
                assert_eq!(m.gauge, Gauge::Two);
                assert_eq!(m.pressure, 560.);
                assert_eq!(tpg.state(), ExchangeState::Idle);
            },
        );
    }

    #[test]
    fn test_read_pressure_invalid_channel() {
        let (device, port) = FakeDevice::pair();
        let mut tpg = Tpg26x::from_port(port, TIMEOUT);

        for channel in [0, 3, 255] {
            assert!(matches!(
                tpg.read_pressure(channel),
                Err(Tpg26xError::InvalidArgument(_))
            ));
        }
        device.assert_silent();
    }

    #[test]
    fn test_timeout_awaiting_ack() {
        with_device(
            |device| {
                device.expect(b"PR1\r\n");
                // Silent until the client gives up and resets the interface
                device.expect(&[END_OF_TEXT]);
                device.serve(b"PR1\r\n", b"0,1.0000E-02");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                let start = Instant::now();
                let result = tpg.read_pressure(1);
                let elapsed = start.elapsed();
                assert!(matches!(result, Err(Tpg26xError::Timeout(t)) if t == TIMEOUT));
                assert!(elapsed >= TIMEOUT.mul_f64(0.9), "elapsed {:?}", elapsed);
                assert!(elapsed <= TIMEOUT.mul_f64(1.1), "elapsed {:?}", elapsed);
                assert_eq!(tpg.state(), ExchangeState::Idle);

                assert_eq!(tpg.read_pressure(1).unwrap().pressure, 1.0e-2);
            },
        );
    }

    #[test]
    fn test_timeout_awaiting_data() {
        with_device(
            |device| {
                device.expect(b"PR2\r\n");
                device.queue_ack();
                device.expect(&[ENQUIRY]);
                // The data line never comes
                device.expect(&[END_OF_TEXT]);
                device.serve(b"PR2\r\n", b"0,2.0000E-07");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                let start = Instant::now();
                let result = tpg.read_pressure(2);
                let elapsed = start.elapsed();
                assert!(matches!(result, Err(Tpg26xError::Timeout(t)) if t == TIMEOUT));
                assert!(elapsed >= TIMEOUT.mul_f64(0.9), "elapsed {:?}", elapsed);
                assert!(elapsed <= TIMEOUT.mul_f64(1.1), "elapsed {:?}", elapsed);
                assert_eq!(tpg.state(), ExchangeState::Idle);

                assert_eq!(tpg.read_pressure(2).unwrap().pressure, 2.0e-7);
            },
        );
    }

    #[test]
    fn test_late_reply_is_discarded() {
        let timeout = Duration::from_millis(100);
        with_device(
            |device| {
                device.expect(b"PR1\r\n");
                // Answers after the deadline
                sleep_ms(150);
                device.queue_ack();
                device.queue_line(b"0,1.0000E-03");
                device.expect(&[END_OF_TEXT]);
                device.serve(b"PR2\r\n", b"0,9.0000E-09");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, timeout);
                assert!(matches!(
                    tpg.read_pressure(1),
                    Err(Tpg26xError::Timeout(_))
                ));
                // Let the late reply land in the input buffer
                sleep_ms(150);

                let m = tpg.read_pressure(2).unwrap();
                assert_eq!(m.gauge, Gauge::Two);
                assert_eq!(m.pressure, 9.0e-9);
            },
        );
    }

    #[test]
    fn test_device_error() {
        with_device(
            |device| {
                device.serve(b"PR2\r\n", b"4,0.0000E+00");
                device.serve(b"PR1\r\n", b"2,1.0000E+03");
                // No interface reset after a well-formed status report
                device.assert_silent();
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                assert!(matches!(
                    tpg.read_pressure(2),
                    Err(Tpg26xError::Device {
                        gauge: Gauge::Two,
                        status: MeasurementStatus::SensorOff
                    })
                ));
                assert!(matches!(
                    tpg.read_pressure(1),
                    Err(Tpg26xError::Device {
                        gauge: Gauge::One,
                        status: MeasurementStatus::Overrange
                    })
                ));
            },
        );
    }

    #[test]
    fn test_negative_acknowledge() {
        with_device(
            |device| {
                device.expect(b"PR2\r\n");
                device.queue(&[NACK, b'\r', b'\n']);
                // No enquiry after NAK
                device.assert_silent();
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                assert!(matches!(
                    tpg.read_pressure(2),
                    Err(Tpg26xError::NegativeAcknowledge(Mnemonic::Pr2))
                ));
            },
        );
    }

    #[test]
    fn test_malformed_then_recovered() {
        with_device(
            |device| {
                device.expect(b"PR1\r\n");
                device.queue(&[ACK, b'\n']);
                device.expect(&[END_OF_TEXT]);

                device.serve(b"PR1\r\n", b"0,abc");
                device.expect(&[END_OF_TEXT]);

                device.serve(b"PR1\r\n", b"0,3.0000E-04");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                assert!(matches!(
                    tpg.read_pressure(1),
                    Err(Tpg26xError::Protocol(ProtocolError::InvalidTerminator(_)))
                ));
                assert!(matches!(
                    tpg.read_pressure(1),
                    Err(Tpg26xError::Protocol(ProtocolError::InvalidNumber(_)))
                ));
                assert_eq!(tpg.read_pressure(1).unwrap().pressure, 3.0e-4);
            },
        );
    }

    #[test]
    fn test_sequential_reads_never_interleave() {
        let fixtures = [(b"PR1\r\n", "0,1.0000E-03"), (b"PR2\r\n", "0,2.0000E-03")];
        with_device(
            move |device| {
                for (command, line) in fixtures.iter() {
                    device.expect(*command);
                    // Nothing else may arrive while the reply is pending
                    device.assert_silent();
                    device.queue_ack();
                    device.expect(&[ENQUIRY]);
                    device.assert_silent();
                    device.queue_line(line.as_bytes());
                }
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, Duration::from_millis(1000));
                assert_eq!(tpg.read_pressure(1).unwrap().pressure, 1.0e-3);
                assert_eq!(tpg.read_pressure(2).unwrap().pressure, 2.0e-3);
            },
        );
    }

    #[test]
    fn test_shared_connection() {
        with_device(
            |device| {
                for _ in 0..4 {
                    device.serve(b"PR1\r\n", b"0,7.5000E-06");
                }
            },
            |port| {
                let tpg = Arc::new(Mutex::new(Tpg26x::from_port(
                    port,
                    Duration::from_millis(1000),
                )));
                let readers = (0..2)
                    .map(|_| {
                        let tpg = Arc::clone(&tpg);
                        std::thread::spawn(move || {
                            for _ in 0..2 {
                                let m = tpg.lock().unwrap().read_pressure(1).unwrap();
                                assert_eq!(m.pressure, 7.5e-6);
                            }
                        })
                    })
                    .collect::<Vec<_>>();
                for reader in readers {
                    reader.join().unwrap();
                }
            },
        );
    }

    #[test]
    fn test_read_both() {
        with_device(
            |device| device.serve(b"PRX\r\n", b"0,1.0000E-03,5,0.0000E+00"),
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                let (m1, m2) = tpg.read_both().unwrap();
                assert_eq!(m1.pressure, 1.0e-3);
                assert_eq!(m1.status, MeasurementStatus::Ok);
                assert_eq!(m2.gauge, Gauge::Two);
                assert_eq!(m2.status, MeasurementStatus::NoSensor);
            },
        );
    }

    #[test]
    fn test_pressure_unit_is_cached() {
        with_device(
            |device| {
                device.serve(b"UNI\r\n", b"1");
                device.serve(b"PR1\r\n", b"0,7.6000E+02");
                device.serve(b"UNI,2\r\n", b"2");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                assert_eq!(tpg.pressure_unit().unwrap(), PressureUnit::Torr);
                assert_eq!(tpg.unit(), PressureUnit::Torr);
                assert_eq!(tpg.read_gauge1().unwrap().unit, PressureUnit::Torr);

                tpg.set_pressure_unit(PressureUnit::Pascal).unwrap();
                assert_eq!(tpg.unit(), PressureUnit::Pascal);
            },
        );
    }

    #[test]
    fn test_set_pressure_unit_refused() {
        with_device(
            |device| device.serve(b"UNI,1\r\n", b"0"),
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                assert!(matches!(
                    tpg.set_pressure_unit(PressureUnit::Torr),
                    Err(Tpg26xError::UnitMismatch {
                        requested: PressureUnit::Torr,
                        actual: PressureUnit::Mbar
                    })
                ));
                // The cache follows what the controller reports
                assert_eq!(tpg.unit(), PressureUnit::Mbar);
            },
        );
    }

    #[test]
    fn test_unexpected_response() {
        let response = Response::Acknowledgement(AckData::Raw("1".to_string()));
        assert!(matches!(
            unexpected(Mnemonic::Pr1, &response),
            Tpg26xError::Protocol(ProtocolError::UnexpectedResponse {
                mnemonic: Mnemonic::Pr1,
                ..
            })
        ));
    }

    #[test]
    fn test_switch_sensors() {
        with_device(
            |device| {
                device.serve(b"SEN,2,0\r\n", b"2,1");
                device.serve(b"SEN,0,1\r\n", b"0,0");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                tpg.turn_on(Gauge::One).unwrap();
                assert!(matches!(
                    tpg.turn_off(Gauge::Two),
                    Err(Tpg26xError::SensorControl(
                        SensorState::CannotSwitch,
                        SensorState::CannotSwitch
                    ))
                ));
            },
        );
    }

    #[test]
    fn test_change_channel() {
        with_device(
            |device| {
                device.serve(b"SCT,1\r\n", b"1");
                device.serve(b"SCT,0\r\n", b"1");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                tpg.change_channel(Gauge::Two).unwrap();
                assert!(matches!(
                    tpg.change_channel(Gauge::One),
                    Err(Tpg26xError::ChannelMismatch {
                        requested: Gauge::One,
                        actual: Gauge::Two
                    })
                ));
            },
        );
    }

    #[test]
    fn test_gauge_ids_and_status() {
        with_device(
            |device| {
                device.serve(b"TID\r\n", b"TPR,noSEn");
                device.serve(b"ERR\r\n", b"0010");
                device.serve(b"RES,1\r\n", b"0,11");
                device.serve(b"PNR\r\n", b"BG 5540 C");
            },
            |port| {
                let mut tpg = Tpg26x::from_port(port, TIMEOUT);
                assert_eq!(
                    tpg.gauge_ids().unwrap(),
                    (GaugeId::Tpr, GaugeId::NoSensor)
                );

                let status = tpg.error_status().unwrap();
                assert!(status.inadmissible_parameter);
                assert!(!status.is_ok());

                assert_eq!(
                    tpg.reset().unwrap(),
                    vec![ResetError::NoError, ResetError::Gauge2Error]
                );
                assert_eq!(tpg.firmware_version().unwrap(), "BG 5540 C");
            },
        );
    }
}
