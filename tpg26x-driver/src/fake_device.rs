use crate::constants::{ACK, CR, ENQUIRY, LF};
use crate::time::sleep_ms;
use serialport::{SerialPort, TTYPort};
use std::io::{Read, Write};
use std::time::Duration;

/// Controller side of a pseudo-terminal pair, driven by a script running on
/// its own thread.
pub(crate) struct FakeDevice {
    port: TTYPort,
}

impl FakeDevice {
    pub(crate) fn pair() -> (FakeDevice, Box<dyn SerialPort>) {
        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        master
            .set_timeout(Duration::from_millis(1000))
            .expect("Unable to set timeout");
        (
            FakeDevice { port: master },
            Box::new(slave) as Box<dyn SerialPort>,
        )
    }

    pub(crate) fn queue(&mut self, data: &[u8]) {
        self.port.write_all(data).unwrap();
    }

    pub(crate) fn queue_ack(&mut self) {
        self.queue(&[ACK, CR, LF]);
    }

    pub(crate) fn queue_line(&mut self, line: &[u8]) {
        self.queue(&[line, &[CR, LF]].concat());
    }

    /// Number of bytes written by the client and not read yet.
    pub(crate) fn pending(&self) -> u32 {
        self.port.bytes_to_read().unwrap()
    }

    /// Blocks until `expected.len()` bytes arrive and compares them.
    pub(crate) fn expect(&mut self, expected: &[u8]) {
        let mut data = vec![0u8; expected.len()];
        self.port.read_exact(&mut data).unwrap();
        assert_eq!(data, expected);
    }

    /// Answers one complete command/enquiry exchange.
    pub(crate) fn serve(&mut self, command: &[u8], line: &[u8]) {
        self.expect(command);
        self.queue_ack();
        self.expect(&[ENQUIRY]);
        self.queue_line(line);
    }

    /// Checks that the client wrote nothing more.
    pub(crate) fn assert_silent(&self) {
        sleep_ms(20);
        assert_eq!(self.pending(), 0);
    }
}

/// Runs `script` against a fake controller while `client` talks to it.
///
/// The device outlives the client, so the last reply is never cut off by the
/// pty closing. Panics of the script are re-raised here.
pub(crate) fn with_device<S, C, T>(script: S, client: C) -> T
where
    S: FnOnce(&mut FakeDevice) + Send,
    C: FnOnce(Box<dyn SerialPort>) -> T,
{
    let (device, port) = FakeDevice::pair();
    crossbeam_utils::thread::scope(|s| {
        let handle = s.spawn(move |_| {
            let mut device = device;
            script(&mut device);
            device
        });
        let result = client(port);
        let device = handle.join().expect("fake device script failed");
        drop(device);
        result
    })
    .expect("fake device thread panicked")
}
