//! Bounded reads against a `Device`.
//!
//! A read that runs out of time is an expected outcome here rather than an error, so the
//! functions in this module return tagged outcomes and reserve `Err` for genuine I/O failures.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::{Device, Error};

/// The largest number of bytes requested from the device in a single `read` call.
const CHUNK_SIZE: usize = 256;

/// The result of reading a single byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ByteRead {
    /// A byte arrived within the timeout.
    Byte(u8),
    /// Nothing arrived within the timeout.
    Timeout,
}

/// The result of accumulating bytes for a bounded amount of time.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BufferRead {
    /// The timeout elapsed. Holds every byte received before it did, in order.
    TimedOut(Vec<u8>),
    /// The read finished before the timeout, either because the requested limit was reached or
    /// because the device reported the end of the stream.
    Complete(Vec<u8>),
}

impl BufferRead {
    /// Returns the bytes received, regardless of how the read finished.
    pub fn bytes(&self) -> &[u8] {
        match self {
            BufferRead::TimedOut(bytes) | BufferRead::Complete(bytes) => bytes,
        }
    }
}

/// Polls `device` every `poll_interval` until it reports pending input and returns the number of
/// bytes available.
///
/// Without a `timeout` this blocks for as long as the device stays silent. With one, it fails with
/// `Error::WaitTimedOut` once the timeout has passed.
pub fn wait_for_data<D: Device + ?Sized>(
    device: &mut D,
    poll_interval: Duration,
    timeout: Option<Duration>,
) -> Result<u32, Error> {
    let started = Instant::now();

    debug!("Waiting for data (timeout: {:?})", timeout);

    loop {
        let available = device.bytes_available()?;

        if available > 0 {
            debug!("{} byte(s) available after {:?}", available, started.elapsed());

            return Ok(available);
        }

        if let Some(timeout) = timeout {
            if started.elapsed() >= timeout {
                return Err(Error::WaitTimedOut(timeout));
            }
        }

        thread::sleep(poll_interval);
    }
}

/// Reads exactly one byte, waiting at most `timeout` for it.
pub fn read_byte<D: Device + ?Sized>(device: &mut D, timeout: Duration) -> Result<ByteRead, Error> {
    let mut buf = [0u8; 1];

    device.set_read_timeout(timeout)?;

    loop {
        match device.read(&mut buf) {
            Ok(1) => return Ok(ByteRead::Byte(buf[0])),
            Ok(_) => return Ok(ByteRead::Timeout),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => return Ok(ByteRead::Timeout),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
}

/// Accumulates bytes until `timeout` has elapsed, or until `limit` bytes have been received when
/// a limit is given.
pub fn read_buffer<D: Device + ?Sized>(
    device: &mut D,
    limit: Option<usize>,
    timeout: Duration,
) -> Result<BufferRead, Error> {
    let deadline = Instant::now() + timeout;
    let mut received = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let wanted = match limit {
            Some(limit) if received.len() >= limit => return Ok(BufferRead::Complete(received)),
            Some(limit) => (limit - received.len()).min(CHUNK_SIZE),
            None => CHUNK_SIZE,
        };

        let remaining = deadline.saturating_duration_since(Instant::now());

        if remaining == Duration::from_millis(0) {
            return Ok(BufferRead::TimedOut(received));
        }

        device.set_read_timeout(remaining)?;

        match device.read(&mut chunk[..wanted]) {
            Ok(0) => {
                trace!("Device reported end of stream after {} byte(s)", received.len());

                return Ok(BufferRead::Complete(received));
            }
            Ok(n) => {
                trace!("Received {} byte(s)", n);

                received.extend_from_slice(&chunk[..n]);
            }
            Err(err) if err.kind() == io::ErrorKind::TimedOut => {
                return Ok(BufferRead::TimedOut(received))
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
}
