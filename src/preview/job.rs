//! A single preview job
//!
//! One job covers one time window: `create` submits it to `preview/create`, then
//! `get_result` polls `preview/get` at a fixed interval until the job has succeeded.
//! There is no retry beyond that poll loop; any other failure is returned to the caller.

use std::str::FromStr;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::{Params, PreviewApi, PREVIEW_CREATE, PREVIEW_GET};
use crate::error::AppErrors as Error;
use crate::model::{PreviewStatus, TimeInterval};

/// Metrics requested for every preview
pub const PREVIEW_PARAMETERS: &str = "interaction.id,targetVol,hour";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// A job the remote API has accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
    created_at: Instant,
}

#[derive(Debug)]
enum JobState {
    Uncreated,
    Submitted(JobHandle),
}

#[derive(Debug)]
pub struct PreviewJob {
    interval: TimeInterval,
    stream_hash: String,
    poll_interval: Duration,
    max_wait: Option<Duration>,
    cancel: CancellationToken,
    state: JobState,
}

impl PreviewJob {
    #[must_use]
    pub fn new(interval: TimeInterval, stream_hash: impl Into<String>) -> Self {
        Self {
            interval,
            stream_hash: stream_hash.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
            cancel: CancellationToken::new(),
            state: JobState::Uncreated,
        }
    }

    /// Time slept between status polls
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Give up with `DeadlineExceeded` once the job has been pending this long.
    /// `None` polls until the job finishes.
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Stop polling with `Cancelled` when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    #[must_use]
    pub fn handle(&self) -> Option<&JobHandle> {
        match &self.state {
            JobState::Uncreated => None,
            JobState::Submitted(handle) => Some(handle),
        }
    }

    fn create_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("start".to_string(), json!(self.interval.start_epoch()));
        params.insert("end".to_string(), json!(self.interval.end_epoch()));
        params.insert("parameters".to_string(), json!(PREVIEW_PARAMETERS));
        params.insert("hash".to_string(), json!(self.stream_hash));
        params
    }

    /// Submit the job and record the id the API assigns to it.
    ///
    /// # Errors
    /// Will return any error from the api call, or `MissingField` if the response
    /// carries no job id.
    #[tracing::instrument(name = "Create preview", skip_all, fields(start = %self.interval.start, end = %self.interval.end))]
    pub async fn create<A>(&mut self, api: &A) -> Result<JobHandle, Error>
    where
        A: PreviewApi + ?Sized,
    {
        let params = self.create_params();
        info!(parameters = ?params, "Creating preview");

        let response = api.call(PREVIEW_CREATE, &params).await?;
        log_rate_limit(api);
        info!(response = %response, "Create preview response");

        let id = response
            .get("id")
            .and_then(Value::as_str)
            .ok_or(Error::MissingField("id"))?
            .to_string();

        let handle = JobHandle {
            id,
            created_at: Instant::now(),
        };
        self.state = JobState::Submitted(handle.clone());
        Ok(handle)
    }

    /// Poll until the job succeeds and return the full final response.
    ///
    /// # Errors
    /// Will return `JobNotCreated` without calling the api if `create` has not succeeded,
    /// `UnknownStatus` for a status outside the known set, `Cancelled` or
    /// `DeadlineExceeded` if polling is cut short, and any error from the api call.
    #[tracing::instrument(name = "Get preview result", skip_all)]
    pub async fn get_result<A>(&self, api: &A) -> Result<Value, Error>
    where
        A: PreviewApi + ?Sized,
    {
        let JobState::Submitted(handle) = &self.state else {
            return Err(Error::JobNotCreated);
        };

        let mut params = Params::new();
        params.insert("id".to_string(), json!(handle.id));

        loop {
            let response = api.call(PREVIEW_GET, &params).await?;
            log_rate_limit(api);

            let status = response
                .get("status")
                .and_then(Value::as_str)
                .and_then(|s| PreviewStatus::from_str(s).ok());

            match status {
                Some(PreviewStatus::Succeeded) => return Ok(response),
                Some(PreviewStatus::Running) => {
                    info!(
                        job_id = %handle.id,
                        progress = ?response.get("progress"),
                        "Preview task running"
                    );
                }
                Some(status) => info!(job_id = %handle.id, %status, "Preview task status"),
                None => return Err(Error::UnknownStatus(response)),
            }

            if let Some(max_wait) = self.max_wait {
                let next_poll = handle.created_at.elapsed().checked_add(self.poll_interval);
                if next_poll.map_or(true, |next| next > max_wait) {
                    return Err(Error::DeadlineExceeded(max_wait));
                }
            }

            info!(
                "Waiting {} seconds before retrying",
                self.poll_interval.as_secs_f64()
            );
            tokio::select! {
                () = self.cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

fn log_rate_limit<A: PreviewApi + ?Sized>(api: &A) {
    info!(
        limit = ?api.rate_limit(),
        remaining = ?api.rate_limit_remaining(),
        "Rate limit"
    );
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::tests::test::{
        complete_response, created_response, in_progress_response, MockPreviewApi,
    };

    fn create_job(stream_hash: &str) -> PreviewJob {
        let start = Utc.with_ymd_and_hms(2013, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2013, 3, 1, 1, 0, 0).unwrap();
        PreviewJob::new(TimeInterval::new(start, end), stream_hash)
            .with_poll_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn create_calls_preview_create_with_epoch_bounds() {
        let api = MockPreviewApi::new(vec![Ok(created_response())]);
        let mut job = create_job("asdfasdf");

        let handle = job.create(&api).await.unwrap();
        assert_eq!(handle.id, "d48077141e6cf6c71c01");

        assert_eq!(
            api.calls(),
            vec![(
                PREVIEW_CREATE.to_string(),
                json!({
                    "start": 1_362_096_000,
                    "end": 1_362_099_600,
                    "hash": "asdfasdf",
                    "parameters": "interaction.id,targetVol,hour",
                })
            )]
        );
    }

    #[tokio::test]
    async fn get_result_before_create_fails_without_calling_api() {
        let api = MockPreviewApi::new(vec![]);
        let job = create_job("sadgnjkwer");

        assert!(matches!(
            job.get_result(&api).await,
            Err(Error::JobNotCreated)
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn get_result_polls_until_succeeded() {
        let api = MockPreviewApi::new(vec![
            Ok(created_response()),
            Ok(in_progress_response()),
            Ok(json!({"status": "queued", "id": "d48077141e6cf6c71c01"})),
            Ok(complete_response()),
        ]);
        let mut job = create_job("asdfasdf");

        job.create(&api).await.unwrap();
        let result = job.get_result(&api).await.unwrap();

        // The final result returned is the complete preview response
        assert_eq!(result, complete_response());

        let expected = (
            PREVIEW_GET.to_string(),
            json!({"id": "d48077141e6cf6c71c01"}),
        );
        assert_eq!(api.calls()[1..].to_vec(), vec![expected; 3]);
    }

    #[tokio::test]
    async fn unknown_status_fails_with_full_response() {
        let failed = json!({"id": "d48077141e6cf6c71c01", "status": "failed"});
        let api = MockPreviewApi::new(vec![Ok(created_response()), Ok(failed.clone())]);
        let mut job = create_job("asdfasdf");

        job.create(&api).await.unwrap();
        match job.get_result(&api).await {
            Err(Error::UnknownStatus(response)) => assert_eq!(response, failed),
            other => panic!("expected UnknownStatus, got {other:?}"),
        }
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn missing_status_is_unknown() {
        let api = MockPreviewApi::new(vec![Ok(created_response()), Ok(json!({"id": "x"}))]);
        let mut job = create_job("asdfasdf");

        job.create(&api).await.unwrap();
        assert!(matches!(
            job.get_result(&api).await,
            Err(Error::UnknownStatus(_))
        ));
    }

    #[tokio::test]
    async fn create_without_id_fails() {
        let api = MockPreviewApi::new(vec![Ok(json!({"created_at": 1_364_487_833}))]);
        let mut job = create_job("asdfasdf");

        assert!(matches!(
            job.create(&api).await,
            Err(Error::MissingField("id"))
        ));
        assert!(job.handle().is_none());
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let api = MockPreviewApi::new(vec![
            Ok(created_response()),
            Err(Error::ReqwestError("connection reset".to_string())),
        ]);
        let mut job = create_job("asdfasdf");

        job.create(&api).await.unwrap();
        assert!(matches!(
            job.get_result(&api).await,
            Err(Error::ReqwestError(_))
        ));
    }

    #[tokio::test]
    async fn cancellation_stops_polling() {
        let api = MockPreviewApi::new(vec![Ok(created_response()), Ok(in_progress_response())]);
        let cancel = CancellationToken::new();
        let mut job = create_job("asdfasdf")
            .with_poll_interval(Duration::from_secs(3_600))
            .with_cancellation(cancel.clone());

        job.create(&api).await.unwrap();
        cancel.cancel();

        assert!(matches!(job.get_result(&api).await, Err(Error::Cancelled)));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn max_wait_bounds_polling() {
        let api = MockPreviewApi::new(vec![Ok(created_response()), Ok(in_progress_response())]);
        let mut job = create_job("asdfasdf")
            .with_poll_interval(Duration::from_secs(60))
            .with_max_wait(Some(Duration::from_secs(30)));

        job.create(&api).await.unwrap();

        assert!(matches!(
            job.get_result(&api).await,
            Err(Error::DeadlineExceeded(d)) if d == Duration::from_secs(30)
        ));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_poll_interval_hits_deadline_instead_of_overflowing() {
        let api = MockPreviewApi::new(vec![Ok(created_response()), Ok(in_progress_response())]);
        let mut job = create_job("asdfasdf")
            .with_poll_interval(Duration::from_secs(u64::MAX))
            .with_max_wait(Some(Duration::from_secs(10)));

        job.create(&api).await.unwrap();
        tokio::time::advance(Duration::from_millis(1_100)).await;

        assert!(matches!(
            job.get_result(&api).await,
            Err(Error::DeadlineExceeded(d)) if d == Duration::from_secs(10)
        ));
        assert_eq!(api.calls().len(), 2);
    }
}
