mod metadata;
mod stream;

pub use metadata::{save_video_metadata, FrameRecord};
pub use stream::{StreamEnd, VideoFrame, VideoOptions, VideoStats, VideoStream};
