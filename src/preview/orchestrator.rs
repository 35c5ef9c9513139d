//! Run one preview job per day of the requested range
//!
//! Jobs run one after another in split order, so `results[i]` always belongs to
//! `splits[i]`. The first failure aborts the run; no partial results are returned.

use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::job::{PreviewJob, DEFAULT_POLL_INTERVAL};
use crate::client::PreviewApi;
use crate::error::AppErrors as Error;
use crate::splitter::TimespanSplitter;

pub struct PreviewTaskManager<'a, A: PreviewApi + ?Sized> {
    api: &'a A,
    splitter: TimespanSplitter,
    stream_hash: String,
    poll_interval: Duration,
    max_wait: Option<Duration>,
    cancel: CancellationToken,
}

impl<'a, A: PreviewApi + ?Sized> PreviewTaskManager<'a, A> {
    #[must_use]
    pub fn new(api: &'a A, splitter: TimespanSplitter, stream_hash: impl Into<String>) -> Self {
        Self {
            api,
            splitter,
            stream_hash: stream_hash.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
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

    /// Fetch the preview for every split, in order.
    ///
    /// # Errors
    /// Will return the first error raised while creating or polling any job.
    #[tracing::instrument(name = "Run preview jobs", skip_all, fields(stream_hash = %self.stream_hash))]
    pub async fn run(self) -> Result<Vec<Value>, Error> {
        let splits = self.splitter.splits();
        info!(count = splits.len(), "Running preview jobs");

        let mut results = Vec::with_capacity(splits.len());
        for interval in splits {
            debug!(
                "Getting preview data for {} to {}",
                interval.start, interval.end
            );
            let mut job = PreviewJob::new(interval, self.stream_hash.as_str())
                .with_poll_interval(self.poll_interval)
                .with_max_wait(self.max_wait)
                .with_cancellation(self.cancel.clone());

            job.create(self.api).await?;
            results.push(job.get_result(self.api).await?);
        }

        Ok(results)
    }
}
