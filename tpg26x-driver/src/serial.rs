use crate::command::Command;
use crate::constants::{CR, END_OF_TEXT, ENQUIRY, LF, MAX_FRAME_SIZE};
use crate::error::{ProtocolError, Tpg26xError};
use crate::numeric::to_string;
use crate::time::sleep_ms;
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use tracing::debug;

fn send_data(port: &mut Box<dyn SerialPort>, data: &[u8]) -> io::Result<()> {
    port.write_all(data)?;
    port.flush()
}

pub(crate) fn send_command(port: &mut Box<dyn SerialPort>, command: &Command) -> io::Result<()> {
    let data = command.encode();
    debug!(mnemonic = %command.mnemonic(), bytes = %to_string(&data), "write command");
    send_data(port, &data)
}

pub(crate) fn send_enquiry(port: &mut Box<dyn SerialPort>) -> io::Result<()> {
    debug!("write enquiry");
    send_data(port, &[ENQUIRY])
}

/// Drops bytes left over from an earlier exchange.
pub(crate) fn discard_input(port: &mut Box<dyn SerialPort>) -> Result<(), Tpg26xError> {
    let n_read = port.bytes_to_read()?;
    if n_read > 0 {
        debug!(n_read, "discarding stale input");
    }
    port.clear(ClearBuffer::Input)?;
    Ok(())
}

/// Drops unread input and asks the controller to reset its interface buffer.
pub(crate) fn reset_interface(port: &mut Box<dyn SerialPort>) -> Result<(), Tpg26xError> {
    discard_input(port)?;
    send_data(port, &[END_OF_TEXT])?;
    Ok(())
}

/// Reads one CR LF terminated line and returns it without the terminator.
pub(crate) fn read_line(
    port: &mut Box<dyn SerialPort>,
    timeout: Duration,
) -> Result<Vec<u8>, Tpg26xError> {
    let deadline = Instant::now() + timeout;
    let mut line: Vec<u8> = Vec::with_capacity(MAX_FRAME_SIZE);
    let mut byte = [0u8; 1];
    loop {
        let now = Instant::now();
        if now >= deadline {
            debug!(partial = %to_string(&line), "read timed out");
            return Err(Tpg26xError::Timeout(timeout));
        }
        port.set_timeout(deadline - now)?;
        match port.read(&mut byte) {
            Ok(0) => {
                sleep_ms(1);
                continue;
            }
            Ok(_) => (),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Tpg26xError::Io(e)),
        }

        if byte[0] != LF {
            line.push(byte[0]);
            if line.len() > MAX_FRAME_SIZE {
                return Err(ProtocolError::FrameTooLong(MAX_FRAME_SIZE).into());
            }
            continue;
        }
        if line.last() != Some(&CR) {
            line.push(LF);
            return Err(ProtocolError::InvalidTerminator(to_string(&line)).into());
        }
        line.pop();
        debug!(bytes = %to_string(&line), "read line");
        return Ok(line);
    }
}
