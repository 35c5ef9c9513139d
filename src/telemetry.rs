//! Tracing setup
//!
//! Subscribers are built explicitly and installed once by the binary (or the test helper).
//! Library code only emits spans and events.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::error::AppErrors as Error;

/// Compose multiple layers into a `tracing` subscriber writing bunyan json lines to `sink`.
///
/// `RUST_LOG` takes precedence over `env_filter`.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Register a subscriber as global default to process span data.
///
/// # Errors
/// Will return an error if a logger or global subscriber is already installed.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), Error> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}

/// Open (or create) the side log file in append mode, ready to be used as a sink.
///
/// # Errors
/// Will return an error if the file can't be opened.
pub fn log_file(path: impl AsRef<Path>) -> Result<Mutex<File>, Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Mutex::new(file))
}
