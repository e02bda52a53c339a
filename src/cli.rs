use std::time::Duration;

use structopt::StructOpt;
use ttyacm::ReaderConfig;

#[derive(StructOpt, Debug)]
#[structopt(about = "Waits for a serial device to send data and prints what it received")]
pub struct Opts {
    /// The serial device to read from
    #[structopt(
        env = "SERIAL_PORT",
        short = "p",
        long = "port",
        default_value = "/dev/ttyACM0"
    )]
    pub serial_port: String,
    /// The serial baud rate to configure
    #[structopt(
        env = "BAUD_RATE",
        short = "b",
        long = "baud-rate",
        default_value = "115200"
    )]
    pub baud_rate: u32,
    /// How long each read may wait for data, in milliseconds
    #[structopt(short = "t", long = "read-timeout", default_value = "250")]
    pub read_timeout: u64,
    /// Delay between checks for incoming data, in milliseconds
    #[structopt(long = "poll-interval", default_value = "1")]
    pub poll_interval: u64,
    /// Give up if no data arrives within this many milliseconds (waits forever when omitted)
    #[structopt(short = "w", long = "wait-timeout")]
    pub wait_timeout: Option<u64>,
}

impl Opts {
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            device: self.serial_port.clone(),
            baud_rate: self.baud_rate,
            read_timeout: Duration::from_millis(self.read_timeout),
            poll_interval: Duration::from_millis(self.poll_interval),
            wait_timeout: self.wait_timeout.map(Duration::from_millis),
        }
    }
}
