//! DataSift Preview Grabber Command Line Interface

pub mod command;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;

use crate::model::parse_utc;

/// Grab DataSift preview stats for a date range and write them to stdout as json
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Start of the range (inclusive), read as UTC
    #[arg(value_parser = parse_utc)]
    pub start_date: DateTime<Utc>,

    /// End of the range (exclusive), read as UTC
    #[arg(value_parser = parse_utc)]
    pub end_date: DateTime<Utc>,

    /// Hash of the stream to preview
    pub stream_hash: String,

    /// DataSift username
    pub username: String,

    /// DataSift API key
    pub api_key: String,

    /// Settings file (defaults to ./configuration.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait between status polls
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Give up on a preview job after this many seconds
    #[arg(long)]
    pub max_wait: Option<u64>,
}
