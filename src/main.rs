use std::io;

use anyhow::Context;
use structopt::StructOpt;

use ttyacm::SerialReader;

mod cli;

fn main() -> Result<(), anyhow::Error> {
    // Create a logger with a timestamp, silent unless RUST_LOG says otherwise
    pretty_env_logger::init_timed();

    // Parse the command-line arguments
    let opts = cli::Opts::from_args();

    let reader = SerialReader::open(opts.reader_config()).with_context(|| {
        format!(
            "The serial port {} did not open correctly",
            opts.serial_port
        )
    })?;

    let stdout = io::stdout();
    let stderr = io::stderr();

    // Timeouts are reported on stderr by the reader and don't affect the exit code
    reader.run(&mut stdout.lock(), &mut stderr.lock())?;

    Ok(())
}
