//! Statuses reported by the `preview/get` endpoint

use strum::{Display, EnumString};

/// The known lifecycle states of a remote preview job.
///
/// Anything else the API reports fails to parse and is treated as a protocol error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PreviewStatus {
    Queued,
    Prep,
    Submitted,
    Running,
    Succeeded,
}

impl PreviewStatus {
    /// True for the states that are retried by the poll loop.
    #[must_use]
    pub fn is_pending(self) -> bool {
        !matches!(self, PreviewStatus::Succeeded)
    }
}
