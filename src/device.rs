//! The byte source a `SerialReader` talks to.

use std::io::Read;
use std::time::Duration;

use log::trace;
use serialport::SerialPort;

use crate::{Error, SerialConnection};

/// An interface for a readable device that can report pending input and bound how long a read
/// may block.
pub trait Device: Read {
    /// Returns the number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<u32, Error>;

    /// Sets how long a subsequent `read` may block before failing with `TimedOut`.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), Error>;
}

impl Device for SerialConnection {
    fn bytes_available(&mut self) -> Result<u32, Error> {
        Ok(self.inner_port.bytes_to_read()?)
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), Error> {
        trace!("Setting read timeout to {:?}", timeout);

        self.inner_port
            .set_timeout(timeout)
            .map_err(|err| Error::Timeout(timeout, err))
    }
}
