use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not open serial device {}: {}", _0, _1)]
    DeviceOpen(String, serialport::Error),
    #[error("Error when trying to set serial port baud rate to {}: {}", _0, _1)]
    BaudRate(u32, serialport::Error),
    #[error("Error when setting serial read timeout to {:?}: {}", _0, _1)]
    Timeout(Duration, serialport::Error),
    #[error("Serial port error: {}", _0)]
    Serial(#[from] serialport::Error),
    #[error("No data arrived from the device within {:?}", _0)]
    WaitTimedOut(Duration),
    #[error("I/O error: {}", _0)]
    Io(#[from] io::Error),
}
