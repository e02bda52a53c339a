pub mod device;
mod error;
pub mod read;
pub mod reader;

use std::ffi::OsStr;
use std::fmt;
use std::io::{self, Read};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

pub use error::Error;

pub use device::Device;
pub use read::{BufferRead, ByteRead};
pub use reader::{ReaderConfig, RunReport, SerialReader};

use log::debug;
pub use serialport;
use serialport::prelude::*;

/// The device node a USB-serial microcontroller usually shows up as.
pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// The baud rate the attached microcontroller is expected to transmit at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// How long each of the two reads may wait for data.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Delay between polls while waiting for the first byte, and before the buffer read.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Serial connection with an open serial port.
pub struct SerialConnection {
    inner_port: Box<dyn serialport::SerialPort>,
}

impl fmt::Debug for SerialConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialConnection")
            .field("name", &self.name())
            .field("settings", &self.settings())
            .finish()
    }
}

impl Deref for SerialConnection {
    type Target = Box<dyn serialport::SerialPort>;

    fn deref(&self) -> &Self::Target {
        &self.inner_port
    }
}

impl DerefMut for SerialConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner_port
    }
}

impl Read for SerialConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner_port.read(buf)
    }
}

impl SerialConnection {
    /// Opens the given `port` as a `SerialConnection` using 8N1 framing, no flow control and the
    /// default baud rate.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ttyacm::SerialConnection;
    ///
    /// let connection = SerialConnection::open("/dev/ttyACM0")?;
    ///
    /// # Ok::<(), ttyacm::Error>(())
    /// ```
    pub fn open<S: AsRef<OsStr>>(port: S) -> Result<SerialConnection, Error> {
        let settings = SerialPortSettings {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            parity: Parity::None,
            stop_bits: StopBits::One,
            timeout: DEFAULT_READ_TIMEOUT,
        };

        debug!("Opening serial port {:?}", port.as_ref());

        let serial_port = serialport::open_with_settings(port.as_ref(), &settings).map_err(|err| {
            Error::DeviceOpen(port.as_ref().to_string_lossy().into_owned(), err)
        })?;

        Ok(SerialConnection {
            inner_port: serial_port,
        })
    }

    /// Sets the baud rate of the open port.
    pub fn configure_baud_rate(&mut self, baud_rate: u32) -> Result<(), Error> {
        debug!("Setting baud rate to {}", baud_rate);

        self.inner_port
            .set_baud_rate(baud_rate)
            .map_err(|err| Error::BaudRate(baud_rate, err))
    }
}
