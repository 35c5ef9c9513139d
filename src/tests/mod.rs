#[cfg(test)]
pub mod test {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};

    use crate::client::{Params, PreviewApi};
    use crate::error::AppErrors as Error;
    use crate::telemetry::{get_subscriber, init_subscriber};

    // Ensure that the `tracing` stack is only initialised once using `once_cell`
    static TRACING: Lazy<()> = Lazy::new(|| {
        let default_filter_level = "info".to_string();
        let subscriber_name = "test".to_string();
        // The sink is part of the type returned by `get_subscriber`, so each branch
        // installs its own subscriber.
        if std::env::var("TEST_LOG").is_ok() {
            let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
            let _ = init_subscriber(subscriber);
        } else {
            let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
            let _ = init_subscriber(subscriber);
        };
    });

    /// A `PreviewApi` that replays scripted responses and records every call.
    ///
    /// Running out of responses is reported as an error so an unexpected extra call
    /// fails the test instead of hanging it.
    pub struct MockPreviewApi {
        responses: Mutex<VecDeque<Result<Value, Error>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockPreviewApi {
        pub fn new(responses: Vec<Result<Value, Error>>) -> Self {
            Lazy::force(&TRACING);

            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Every `(endpoint, params)` seen so far, in call order
        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PreviewApi for MockPreviewApi {
        async fn call(&self, endpoint: &str, params: &Params) -> Result<Value, Error> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), Value::Object(params.clone())));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Error(format!("unexpected call to {endpoint}"))))
        }

        fn rate_limit(&self) -> Option<u64> {
            Some(10_000)
        }

        fn rate_limit_remaining(&self) -> Option<u64> {
            let used = self.calls.lock().unwrap().len() as u64;
            Some(10_000 - used)
        }
    }

    pub fn created_response() -> Value {
        json!({
            "created_at": 1_364_487_833,
            "id": "d48077141e6cf6c71c01"
        })
    }

    pub fn in_progress_response() -> Value {
        json!({
            "id": "d48077141e6cf6c71c01",
            "status": "running",
            "progress": 42,
            "created_at": 1_364_487_833,
            "user": "dsusername",
            "start": 1_362_096_000,
            "end": 1_362_099_600,
            "hash": "asdfasdf",
            "parameters": ["interaction.id,targetVol,hour"]
        })
    }

    pub fn complete_response() -> Value {
        json!({
            "id": "d48077141e6cf6c71c01",
            "status": "succeeded",
            "progress": 100,
            "created_at": 1_364_487_833,
            "start": 1_362_096_000,
            "end": 1_362_099_600,
            "hash": "asdfasdf",
            "data": [
                {
                    "target": "interaction.id",
                    "analysis": {
                        "analysis_type": "targetVol",
                        "parameters": {"interval": "hour"},
                        "results": [{"interval": 1_362_096_000, "value": 1_376}]
                    }
                }
            ]
        })
    }
}
