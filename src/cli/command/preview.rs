//! Preview
//!
//! This command checks the requested range, then fetches the preview stats for each day
//! of it and returns them as one json array.

use std::time::Duration;

use secrecy::Secret;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    cli::Cli,
    client::DataSiftClient,
    configuration::{Credentials, Settings},
    error::AppErrors as Error,
    preview::PreviewTaskManager,
    splitter::TimespanSplitter,
};

pub struct PreviewCommand {
    client: DataSiftClient,
    splitter: TimespanSplitter,
    stream_hash: String,
    poll_interval: Duration,
    max_wait: Option<Duration>,
    cancel: CancellationToken,
}

impl PreviewCommand {
    /// Validate the arguments and build the client.
    ///
    /// Flags given on the command line take precedence over `settings`.
    ///
    /// # Errors
    /// Will return `InvalidDateRange` before anything else is built if the end date is not
    /// after the start date, or an error if the client can't be built.
    pub fn new(cli: Cli, settings: &Settings) -> Result<Self, Error> {
        let splitter = TimespanSplitter::new(cli.start_date, cli.end_date)?;

        let credentials = Credentials {
            username: cli.username,
            api_key: Secret::new(cli.api_key),
        };
        let client = DataSiftClient::new(&settings.api, &credentials)?;

        let poll_interval = cli
            .poll_interval
            .map_or_else(|| settings.polling.interval(), Duration::from_secs);
        let max_wait = cli
            .max_wait
            .map(Duration::from_secs)
            .or_else(|| settings.polling.max_wait());

        Ok(Self {
            client,
            splitter,
            stream_hash: cli.stream_hash,
            poll_interval,
            max_wait,
            cancel: CancellationToken::new(),
        })
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn splitter(&self) -> &TimespanSplitter {
        &self.splitter
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[must_use]
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }

    /// Returns the combined results of the individual preview grabs for each day
    /// in the requested range.
    ///
    /// # Errors
    /// Will return the first error raised by any preview job.
    pub async fn run(&self) -> Result<Vec<Value>, Error> {
        info!("Running the preview grab...");
        PreviewTaskManager::new(&self.client, self.splitter, self.stream_hash.as_str())
            .with_poll_interval(self.poll_interval)
            .with_max_wait(self.max_wait)
            .with_cancellation(self.cancel.clone())
            .run()
            .await
    }
}

/// Render the results as the single json array written to stdout.
///
/// # Errors
/// Will return an error if the results can't be serialised.
pub fn results_json(results: &[Value]) -> Result<String, Error> {
    Ok(serde_json::to_string(results)?)
}
