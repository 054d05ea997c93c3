use crate::error::{ProcessingError, Result};
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global fmt subscriber. Logs go to stderr unless `log_file` is set.
///
/// Colour codes are only emitted when stderr is a terminal.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            subscriber(verbose, false, Mutex::new(file)).try_init()
        }
        None => subscriber(verbose, io::stderr().is_terminal(), io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Config(format!("Failed to initialise logging: {}", e)))
}

fn subscriber<W>(verbose: bool, ansi: bool, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish()
}
