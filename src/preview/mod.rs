//! Preview jobs and the orchestration of a multi-day run

pub mod job;
pub mod orchestrator;

pub use job::{JobHandle, PreviewJob};
pub use orchestrator::PreviewTaskManager;
