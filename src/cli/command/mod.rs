pub mod preview;

pub use preview::PreviewCommand;
