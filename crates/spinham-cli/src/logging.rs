use crate::error::{CliError, Result};
use std::fs::File;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{
        self, MakeWriter,
        format::{Compact, DefaultFields, Format},
    },
    prelude::*,
    registry::LookupSpan,
};

/// Maps `-v` repetitions to a level. `-q` keeps only faults caught at the api
/// boundary, so a quiet run still reports what it refused to do.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// One line per event with `idx_image`/`idx_chain` inline after the message.
fn terminal_layer<S, W>(writer: W, ansi: bool) -> fmt::Layer<S, DefaultFields, Format<Compact>, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .compact()
}

/// Full format with thread ids, to tell solver threads from request threads.
fn file_layer<S, W>(writer: W) -> fmt::Layer<S, DefaultFields, Format, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let file = log_file.map(File::create).transpose()?;

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(terminal_layer(std::io::stderr, std::io::stderr().is_terminal()));

    let installed = match file {
        Some(file) => subscriber.with(file_layer(Mutex::new(file))).try_init(),
        None => subscriber.try_init(),
    };
    installed.map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}
