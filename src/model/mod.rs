//! Domain models shared between the splitter, the preview jobs and the command line.

pub mod interval;
pub mod status;

pub use interval::{parse_utc, TimeInterval};
pub use status::PreviewStatus;
