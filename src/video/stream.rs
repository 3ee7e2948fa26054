use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, error, info, warn};

use crate::camera::{recommended_timeout_ms, Camera};
use crate::error::{AsiError, Result};
use crate::frame::{buffer_size, Frame, FrameProcessor};
use crate::types::{ControlType, RoiFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoOptions {
    /// Frames buffered between the capture thread and the consumer.
    pub capacity: usize,
    /// Per-frame timeout. `None` derives it from the current exposure.
    pub timeout_ms: Option<i32>,
    /// Stop after this many frames have been read from the camera.
    pub max_frames: Option<u64>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            capacity: 8,
            timeout_ms: None,
            max_frames: None,
        }
    }
}

/// A frame read in video mode.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// 1-based count of frames read by the capture thread.
    pub sequence: u64,
    pub captured_at: DateTime<Local>,
    pub frame: Frame,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoStats {
    pub captured: u64,
    /// Frames discarded because the consumer fell behind.
    pub dropped: u64,
    pub timeouts: u64,
    /// Dropped frame count reported by the SDK.
    pub sdk_dropped: i32,
}

/// What is left when a stream ends.
#[derive(Debug)]
pub struct StreamEnd {
    pub camera: Camera,
    pub stats: VideoStats,
    /// The error that ended capture early, if any.
    pub error: Option<AsiError>,
}

impl StreamEnd {
    pub fn into_result(self) -> Result<(Camera, VideoStats)> {
        match self.error {
            Some(e) => Err(e),
            None => Ok((self.camera, self.stats)),
        }
    }
}

/// Continuous capture on a background thread.
///
/// The camera is moved into the thread and handed back by [`VideoStream::stop`].
#[derive(Debug)]
pub struct VideoStream {
    receiver: Receiver<VideoFrame>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<StreamEnd>>,
}

impl VideoStream {
    /// Enter video mode and start reading frames.
    ///
    /// If video mode cannot be started the camera is dropped, which closes it.
    pub fn start(mut camera: Camera, options: VideoOptions) -> Result<Self> {
        let timeout = match options.timeout_ms {
            Some(timeout) => timeout,
            None => recommended_timeout_ms(camera.control_value(ControlType::EXPOSURE)?.0),
        };
        let format = camera.roi_format()?;
        camera.start_video_capture()?;

        let (sender, receiver) = bounded(options.capacity.max(1));
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        info!(
            "Starting video stream {}x{} {:?}, timeout {} ms",
            format.width, format.height, format.image_type, timeout
        );
        let handle = thread::Builder::new()
            .name("asi-video".to_string())
            .spawn(move || {
                capture_loop(camera, sender, worker_stop, format, timeout, options)
            })?;

        Ok(Self {
            receiver,
            stop,
            handle: Some(handle),
        })
    }

    pub fn receiver(&self) -> &Receiver<VideoFrame> {
        &self.receiver
    }

    /// Next frame, or `None` once capture has ended and the queue is empty.
    pub fn recv(&self) -> Option<VideoFrame> {
        self.receiver.recv().ok()
    }

    /// Next frame within `timeout`. `None` on timeout or when capture ended.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<VideoFrame> {
        match self.receiver.recv_timeout(timeout) {
            Ok(frame) => Some(frame),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Leave video mode and get the camera back.
    pub fn stop(mut self) -> Result<StreamEnd> {
        self.stop.store(true, Ordering::Relaxed);
        let handle = self.handle.take().ok_or(AsiError::WorkerPanicked)?;
        let end = handle.join().map_err(|_| AsiError::WorkerPanicked)?;
        info!(
            "Video stream stopped: {} captured, {} dropped, {} timeouts",
            end.stats.captured, end.stats.dropped, end.stats.timeouts
        );
        Ok(end)
    }
}

impl Drop for VideoStream {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Relaxed);
            if handle.join().is_err() {
                error!("Video capture thread panicked");
            }
        }
    }
}

fn capture_loop(
    mut camera: Camera,
    sender: Sender<VideoFrame>,
    stop: Arc<AtomicBool>,
    format: RoiFormat,
    timeout: i32,
    options: VideoOptions,
) -> StreamEnd {
    let mut stats = VideoStats::default();
    let mut failure = None;
    let mut buffer = vec![0u8; buffer_size(&format)];

    while !stop.load(Ordering::Relaxed) {
        if options.max_frames.is_some_and(|max| stats.captured >= max) {
            debug!("Reached {} frames", stats.captured);
            break;
        }

        if let Err(e) = camera.video_data_into(&mut buffer, Some(timeout)) {
            if e.is_timeout() {
                stats.timeouts += 1;
                warn!("Timed out waiting for video frame ({} ms)", timeout);
                continue;
            }
            error!("Video capture failed: {}", e);
            failure = Some(e);
            break;
        }
        stats.captured += 1;

        let frame = match FrameProcessor::decode(&buffer, &format) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Could not decode video frame: {}", e);
                failure = Some(e);
                break;
            }
        };

        let item = VideoFrame {
            sequence: stats.captured,
            captured_at: Local::now(),
            frame,
        };
        match sender.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                stats.dropped += 1;
                if stats.dropped % 100 == 1 {
                    debug!("Consumer is behind, {} frames dropped", stats.dropped);
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Frame receiver dropped, ending capture");
                break;
            }
        }
    }

    match camera.dropped_frames() {
        Ok(n) => stats.sdk_dropped = n,
        Err(e) => warn!("Could not read dropped frame count: {}", e),
    }
    if let Err(e) = camera.stop_video_capture() {
        warn!("Failed to stop video capture: {}", e);
        failure.get_or_insert(e);
    }

    StreamEnd {
        camera,
        stats,
        error: failure,
    }
}
