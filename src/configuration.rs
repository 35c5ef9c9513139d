use std::path::Path;
use std::time::Duration;

use secrecy::Secret;
use serde::Deserialize;

use crate::error::AppErrors as Error;

pub const DEFAULT_CONFIG_FILE: &str = "configuration.yaml";
pub const DEFAULT_BASE_URL: &str = "https://api.datasift.com/v1/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "datasift_preview_grabber.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub polling: PollingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// How preview jobs are polled
#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    pub interval_secs: u64,
    pub max_wait_secs: Option<u64>,
}

impl PollingSettings {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub file: String,
    pub level: String,
}

/// Structure for representing the DataSift account credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub api_key: Secret<String>,
}

/// Get the configuration from defaults, the configuration file and the environment
///
/// The file is `configuration.yaml` in the working directory unless `path` names another.
/// The default file may be absent; an explicitly named one must exist. Environment variables
/// prefixed `PREVIEW__` (e.g. `PREVIEW__POLLING__INTERVAL_SECS`) override the file.
///
/// # Errors
/// Will return errors if the config can't be read or deserialised.
pub fn get_configuration(path: Option<&Path>) -> Result<Settings, Error> {
    let file = match path {
        Some(path) => config::File::from(path)
            .format(config::FileFormat::Yaml)
            .required(true),
        None => config::File::new(DEFAULT_CONFIG_FILE, config::FileFormat::Yaml).required(false),
    };

    // Initialise our configuration reader
    let settings = config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
        .set_default("polling.interval_secs", DEFAULT_POLL_INTERVAL_SECS)?
        .set_default("logging.file", DEFAULT_LOG_FILE)?
        .set_default("logging.level", DEFAULT_LOG_LEVEL)?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("PREVIEW")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(settings.try_deserialize::<Settings>()?)
}
