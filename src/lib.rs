// clippy lint unwrap
#![warn(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
// ban unsafe
#![forbid(unsafe_code)]

pub mod cli;
pub mod client;
pub mod configuration;
pub mod error;
pub mod model;
pub mod preview;
pub mod splitter;
pub mod telemetry;
pub mod tests;
