//! End-to-end camera workflows against the simulated SDK.

use std::sync::Arc;
use std::time::Duration;

use zwo_asi::camera::{Asi, CameraState, CaptureOptions, RoiRequest, DEFAULT_AUTO_EXPOSURE};
use zwo_asi::output::{output_path, save_frame, OutputFormat};
use zwo_asi::sdk::mock::{MockCameraSpec, MockSdk};
use zwo_asi::video::{VideoOptions, VideoStream};
use zwo_asi::{AsiError, ControlType, ErrorCode, ImageType, Pixels};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast() -> CaptureOptions {
    CaptureOptions {
        initial_sleep: Duration::ZERO,
        poll: Duration::from_millis(1),
        is_dark: false,
    }
}

fn rig() -> (Arc<MockSdk>, Asi) {
    let mock = Arc::new(
        MockSdk::new()
            .with_camera(MockCameraSpec::mono("ZWO ASI178MM", 3096, 2080))
            .with_camera(MockCameraSpec::color("ZWO ASI224MC", 1304, 976)),
    );
    (mock.clone(), Asi::new(mock))
}

#[test]
fn still_capture_with_binned_roi() {
    init_logging();
    let (_, asi) = rig();
    let camera = asi.open("ASI178MM").unwrap();

    camera
        .set_roi(
            &RoiRequest::new()
                .with_bins(2)
                .with_size(256, 128)
                .with_image_type(ImageType::Raw16),
        )
        .unwrap();
    camera.set_control_value(ControlType::EXPOSURE, 50_000, false).unwrap();

    let frame = camera.capture(&fast()).unwrap();
    assert_eq!(frame.shape(), vec![128, 256]);
    assert!(matches!(frame.pixels, Pixels::U16(_)));
    assert_eq!(camera.bins().unwrap(), 2);

    let roi = camera.roi().unwrap();
    assert_eq!((roi.start_x, roi.start_y), ((1548 - 256) / 2, (1040 - 128) / 2));
}

#[test]
fn dark_frames_are_dimmer_than_lights() {
    let (_, asi) = rig();
    let camera = asi.open(0).unwrap();
    camera.set_roi(&RoiRequest::new().with_size(64, 64)).unwrap();

    let light = camera.capture(&fast()).unwrap();
    let dark = camera.capture(&fast().dark()).unwrap();
    assert!(dark.mean() < light.mean());
    assert!(dark.min_max().unwrap().1 < 16);
}

#[test]
fn color_camera_rgb_frame_and_auto_controls() {
    let (_, asi) = rig();
    let camera = asi.open("ZWO ASI224MC").unwrap();
    camera
        .set_roi(&RoiRequest::new().with_size(64, 32).with_image_type(ImageType::Rgb24))
        .unwrap();

    let frame = camera.capture(&fast()).unwrap();
    assert_eq!(frame.shape(), vec![32, 64, 3]);

    let enabled = camera.auto_exposure(&DEFAULT_AUTO_EXPOSURE).unwrap();
    assert_eq!(enabled, vec!["Exposure".to_string(), "Gain".to_string()]);
    assert!(camera.control_value(ControlType::GAIN).unwrap().1);
}

#[test]
fn mono_camera_rejects_rgb() {
    let (_, asi) = rig();
    let camera = asi.open(0).unwrap();
    let err = camera.set_image_type(ImageType::Rgb24).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InvalidImageType));
}

#[test]
fn exposure_refused_in_video_mode() {
    let (_, asi) = rig();
    let mut camera = asi.open(0).unwrap();
    camera.set_roi(&RoiRequest::new().with_size(64, 64)).unwrap();
    camera.start_video_capture().unwrap();

    let err = camera.capture(&fast()).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::VideoModeActive));

    camera.stop_video_capture().unwrap();
    assert!(camera.capture(&fast()).is_ok());
}

#[test]
fn video_stream_to_files() {
    init_logging();
    let (mock, asi) = rig();
    let camera = asi.open(0).unwrap();
    camera.set_roi(&RoiRequest::new().with_size(64, 48)).unwrap();

    let stream = VideoStream::start(
        camera,
        VideoOptions {
            capacity: 16,
            timeout_ms: Some(200),
            max_frames: Some(3),
        },
    )
    .unwrap();
    assert!(mock.is_video_active(0));

    let dir = tempfile::tempdir().unwrap();
    let mut saved = Vec::new();
    while let Some(item) = stream.recv() {
        let path = output_path(dir.path(), &format!("f{}", item.sequence), OutputFormat::Png);
        save_frame(&item.frame, &path).unwrap();
        saved.push(path);
    }
    assert_eq!(saved.len(), 3);
    assert!(saved.iter().all(|p| p.is_file()));

    let (mut camera, stats) = stream.stop().unwrap().into_result().unwrap();
    assert_eq!(stats.captured, 3);
    assert_eq!(camera.state(), CameraState::Open);
    camera.close().unwrap();
    assert!(!mock.is_open(0));
}

#[test]
fn failed_open_leaves_camera_closed() {
    let (mock, asi) = rig();
    assert!(matches!(asi.open("ASI6200MM"), Err(AsiError::CameraNotFound(_))));
    assert!(!mock.is_open(0));
    assert!(!mock.is_open(1));
}

#[test]
fn failed_init_leaves_camera_closed() {
    let mock = Arc::new(
        MockSdk::new()
            .with_camera(MockCameraSpec::mono("ZWO ASI178MM", 3096, 2080).with_failing_init()),
    );
    let asi = Asi::new(mock.clone());
    let err = asi.open("ASI178MM").unwrap_err();
    assert!(matches!(err, AsiError::Sdk(ErrorCode::GeneralError)));
    assert!(!mock.is_open(0));
}
