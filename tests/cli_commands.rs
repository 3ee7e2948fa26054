//! Subcommands run against the simulated SDK.

use std::sync::Arc;

use clap::Parser;
use zwo_asi::camera::Asi;
use zwo_asi::cli::{run, CliArgs, Command};
use zwo_asi::config::Config;
use zwo_asi::sdk::mock::{MockCameraSpec, MockSdk};

fn asi() -> Asi {
    Asi::new(Arc::new(
        MockSdk::new().with_camera(MockCameraSpec::mono("ZWO ASI290MM Mini", 64, 48)),
    ))
}

fn config(save_folder: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.output.save_folder = save_folder.display().to_string();
    config
}

fn run_to_string(asi: &Asi, config: &Config, command: Command) -> String {
    let mut out = Vec::new();
    run(asi, config, &command, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn list_prints_models() {
    let dir = tempfile::tempdir().unwrap();
    let text = run_to_string(&asi(), &config(dir.path()), Command::List { json: false });
    assert_eq!(text.trim(), "0: ZWO ASI290MM Mini");
}

#[test]
fn list_json_is_camera_info() {
    let dir = tempfile::tempdir().unwrap();
    let text = run_to_string(&asi(), &config(dir.path()), Command::List { json: true });
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value[0]["name"], "ZWO ASI290MM Mini");
    assert_eq!(value[0]["max_width"], 64);
}

#[test]
fn info_json_includes_serial() {
    let dir = tempfile::tempdir().unwrap();
    let text = run_to_string(&asi(), &config(dir.path()), Command::Info { json: true });
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["serial_number"], "123456789abcdef0");
    assert_eq!(value["camera_id"], 0);
}

#[test]
fn controls_json_has_values() {
    let dir = tempfile::tempdir().unwrap();
    let text = run_to_string(&asi(), &config(dir.path()), Command::Controls { json: true });
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let gain = value
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Gain")
        .unwrap();
    assert_eq!(gain["control_type"], 0);
    assert_eq!(gain["auto"], false);
}

#[test]
fn capture_writes_fits_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("still.fits");
    let text = run_to_string(
        &asi(),
        &config(dir.path()),
        Command::Capture {
            output: Some(output.clone()),
            dark: false,
        },
    );
    assert!(text.starts_with("Saved 64x48 frame"));
    assert!(std::fs::read(&output).unwrap().starts_with(b"SIMPLE"));
}

#[test]
fn video_writes_frames_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("run");
    let mut config = config(dir.path());
    config.camera.timeout_ms = Some(200);

    run_to_string(
        &asi(),
        &config,
        Command::Video {
            frames: 2,
            output_dir: Some(out_dir.clone()),
        },
    );

    let metadata = std::fs::read_to_string(out_dir.join("metadata.csv")).unwrap();
    assert!(metadata.starts_with("sequence,captured_at,file,mean"));
    assert!(out_dir.join("frame_000001.fits").is_file());
}

#[test]
fn configured_camera_settings_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let args = CliArgs::parse_from([
        "asi-capture",
        "--image-type",
        "raw16",
        "--save-folder",
        dir.path().to_str().unwrap(),
        "capture",
        "--output",
        dir.path().join("x.png").to_str().unwrap(),
    ]);
    let config = Config::load(&args).unwrap();
    run_to_string(&asi(), &config, args.command.clone());

    let img = image::open(dir.path().join("x.png")).unwrap();
    assert!(matches!(img, image::DynamicImage::ImageLuma16(_)));
}

#[test]
fn info_json_reports_bayer_for_color_cameras() {
    let dir = tempfile::tempdir().unwrap();
    let color = Asi::new(Arc::new(
        MockSdk::new().with_camera(MockCameraSpec::color("ZWO ASI224MC", 64, 48)),
    ));
    let text = run_to_string(&color, &config(dir.path()), Command::Info { json: true });
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["bayer"], "Rg");

    let text = run_to_string(&asi(), &config(dir.path()), Command::Info { json: true });
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(value["bayer"].is_null());
}

#[test]
fn read_only_commands_leave_settings_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.camera.exposure_us = Some(50_000);
    config.camera.gain = Some(200);
    config.camera.bins = Some(2);

    let asi = asi();
    run_to_string(&asi, &config, Command::Info { json: true });
    let text = run_to_string(&asi, &config, Command::Controls { json: true });
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let setting = |name: &str| {
        value
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == name)
            .unwrap()["value"]
            .clone()
    };
    assert_eq!(setting("Exposure"), 10_000);
    assert_eq!(setting("Gain"), 0);

    let camera = asi.open(0).unwrap();
    assert_eq!(camera.bins().unwrap(), 1);
}
