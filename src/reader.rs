use std::io::Write;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::read::{self, BufferRead, ByteRead};
use crate::{
    Device, Error, SerialConnection, DEFAULT_BAUD_RATE, DEFAULT_DEVICE, DEFAULT_POLL_INTERVAL,
    DEFAULT_READ_TIMEOUT,
};

/// Written to the diagnostic stream when the single-byte read times out.
pub const BYTE_TIMEOUT_MESSAGE: &str = "The single-byte read timed out";

/// Written to the diagnostic stream when the buffer read times out.
pub const BUFFER_TIMEOUT_MESSAGE: &str = "The buffer read timed out waiting for additional data";

/// Where to read from and how long to wait for it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReaderConfig {
    /// Path of the serial device node
    pub device: String,
    /// Baud rate to configure after opening
    pub baud_rate: u32,
    /// Bound on each of the two reads
    pub read_timeout: Duration,
    /// Delay between availability polls, also used as the pause before the buffer read
    pub poll_interval: Duration,
    /// Bound on the wait for the first byte, `None` to wait forever
    pub wait_timeout: Option<Duration>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            device: DEFAULT_DEVICE.to_owned(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: None,
        }
    }
}

/// What a finished run received.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunReport {
    pub byte: ByteRead,
    pub buffer: BufferRead,
}

/// Reads one byte and then a timed buffer from a device, echoing what arrives.
#[derive(Debug)]
pub struct SerialReader<D: Device> {
    device: D,
    config: ReaderConfig,
}

impl SerialReader<SerialConnection> {
    /// Opens the device named in `config` and sets its baud rate.
    ///
    /// Nothing is read from the device until `run` is called.
    pub fn open(config: ReaderConfig) -> Result<Self, Error> {
        let mut connection = SerialConnection::open(&config.device)?;

        connection.configure_baud_rate(config.baud_rate)?;

        info!("Opened {} at {} baud", config.device, config.baud_rate);

        Ok(SerialReader::new(connection, config))
    }
}

impl<D: Device> SerialReader<D> {
    pub fn new(device: D, config: ReaderConfig) -> Self {
        SerialReader { device, config }
    }

    /// Waits for the device to send something, then performs the single-byte read followed by
    /// the buffer read.
    ///
    /// Received bytes are written to `out` and flushed one at a time. Read timeouts are reported
    /// on `diag` and do not fail the run. The device is closed before this returns, on every path.
    pub fn run<O, E>(self, out: &mut O, diag: &mut E) -> Result<RunReport, Error>
    where
        O: Write + ?Sized,
        E: Write + ?Sized,
    {
        let SerialReader { mut device, config } = self;

        let report = receive(&mut device, &config, out, diag);

        drop(device);
        debug!("Closed {}", config.device);

        report
    }
}

fn receive<D, O, E>(
    device: &mut D,
    config: &ReaderConfig,
    out: &mut O,
    diag: &mut E,
) -> Result<RunReport, Error>
where
    D: Device + ?Sized,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    read::wait_for_data(device, config.poll_interval, config.wait_timeout)?;

    let byte = read::read_byte(device, config.read_timeout)?;

    match byte {
        ByteRead::Byte(b) => emit(out, &[b])?,
        ByteRead::Timeout => writeln!(diag, "{}", BYTE_TIMEOUT_MESSAGE)?,
    }

    thread::sleep(config.poll_interval);

    let buffer = read::read_buffer(device, None, config.read_timeout)?;

    match &buffer {
        BufferRead::TimedOut(bytes) => {
            emit(out, bytes)?;
            writeln!(diag, "{}", BUFFER_TIMEOUT_MESSAGE)?;
        }
        BufferRead::Complete(bytes) => {
            // Only a timeout is expected to end this read; anything else is left unhandled.
            warn!(
                "Buffer read completed before the timeout, discarding {} byte(s)",
                bytes.len()
            );
        }
    }

    Ok(RunReport { byte, buffer })
}

/// Writes `bytes` to `out` one at a time, flushing after each.
fn emit<O: Write + ?Sized>(out: &mut O, bytes: &[u8]) -> Result<(), Error> {
    for byte in bytes {
        out.write_all(std::slice::from_ref(byte))?;
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_hex::assert_eq_hex;
    use hex_literal::hex;

    use super::*;
    use crate::device::scripted::ScriptedDevice;

    fn config() -> ReaderConfig {
        ReaderConfig {
            device: "scripted".to_owned(),
            ..ReaderConfig::default()
        }
    }

    /// Runs a reader over `device` and returns its report along with stdout and stderr contents
    fn run(
        device: ScriptedDevice,
        config: ReaderConfig,
    ) -> (Result<RunReport, Error>, Vec<u8>, String) {
        let mut out = Vec::new();
        let mut diag = Vec::new();

        let report = SerialReader::new(device, config).run(&mut out, &mut diag);

        (report, out, String::from_utf8(diag).unwrap())
    }

    #[test]
    fn it_should_use_the_fixed_defaults() {
        let config = ReaderConfig::default();

        assert_eq!(config.device, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.read_timeout, Duration::from_millis(250));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert_eq!(config.wait_timeout, None);
    }

    #[test]
    fn it_should_print_a_lone_byte_then_time_out() {
        let device = ScriptedDevice::new().arriving(b"A");
        let probe = device.probe();

        let (report, out, diag) = run(device, config());
        let report = report.unwrap();

        assert_eq!(out, b"A");
        assert_eq!(diag, format!("{}\n", BUFFER_TIMEOUT_MESSAGE));
        assert_eq!(report.byte, ByteRead::Byte(b'A'));
        assert_eq!(report.buffer, BufferRead::TimedOut(Vec::new()));
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn it_should_split_a_burst_between_the_two_reads() {
        let device = ScriptedDevice::new().arriving(b"HELLO");
        let probe = device.probe();

        let (report, out, diag) = run(device, config());
        let report = report.unwrap();

        assert_eq!(out, b"HELLO");
        assert_eq!(report.byte, ByteRead::Byte(b'H'));
        assert_eq!(report.buffer, BufferRead::TimedOut(b"ELLO".to_vec()));
        assert_eq!(diag, format!("{}\n", BUFFER_TIMEOUT_MESSAGE));
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn it_should_continue_after_a_single_byte_timeout() {
        let device = ScriptedDevice::new().spurious_ready();
        let probe = device.probe();

        let (report, out, diag) = run(device, config());
        let report = report.unwrap();

        assert!(out.is_empty());
        assert_eq!(report.byte, ByteRead::Timeout);
        assert_eq!(
            diag,
            format!("{}\n{}\n", BYTE_TIMEOUT_MESSAGE, BUFFER_TIMEOUT_MESSAGE)
        );
        // One read for the byte and one for the buffer
        assert_eq!(probe.reads(), 2);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn it_should_echo_raw_bytes_in_order() {
        let device = ScriptedDevice::new().arriving(&hex!("7E 00 FF 0D 0A"));

        let (report, out, _) = run(device, config());

        assert!(report.is_ok());
        assert_eq_hex!(out, hex!("7E 00 FF 0D 0A").to_vec());
    }

    #[test]
    fn it_should_not_emit_a_buffer_that_completes_early() {
        let device = ScriptedDevice::new().arriving(b"AB").end_of_stream();
        let probe = device.probe();

        let (report, out, diag) = run(device, config());
        let report = report.unwrap();

        assert_eq!(out, b"A");
        assert!(diag.is_empty());
        assert_eq!(report.buffer, BufferRead::Complete(b"B".to_vec()));
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn it_should_close_the_device_when_the_wait_times_out() {
        let device = ScriptedDevice::new();
        let probe = device.probe();
        let config = ReaderConfig {
            wait_timeout: Some(Duration::from_millis(5)),
            ..config()
        };

        let (report, out, diag) = run(device, config);

        assert!(matches!(report, Err(Error::WaitTimedOut(_))));
        assert!(out.is_empty());
        assert!(diag.is_empty());
        assert_eq!(probe.reads(), 0);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn it_should_not_read_when_the_device_cannot_be_opened() {
        let config = ReaderConfig {
            device: "/dev/ttyACM-does-not-exist".to_owned(),
            ..ReaderConfig::default()
        };

        let err = SerialReader::open(config).unwrap_err();

        assert!(matches!(
            err,
            Error::DeviceOpen(ref path, _) if path == "/dev/ttyACM-does-not-exist"
        ));
    }
}
