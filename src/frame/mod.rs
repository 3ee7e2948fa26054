mod processor;
mod types;

pub use processor::{buffer_size, FrameProcessor};
pub use types::{Frame, Pixels};
