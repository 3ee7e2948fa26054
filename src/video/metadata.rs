use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::stream::VideoFrame;

/// Per-frame CSV row written next to saved video frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub sequence: u64,
    pub captured_at: String,
    pub file: String,
    pub mean: f64,
}

impl FrameRecord {
    pub fn new(frame: &VideoFrame, file: &str) -> Self {
        Self {
            sequence: frame.sequence,
            captured_at: frame.captured_at.to_rfc3339(),
            file: file.to_string(),
            mean: frame.frame.mean(),
        }
    }
}

pub fn save_video_metadata(records: &[FrameRecord], save_path: &Path) -> Result<()> {
    info!("Saving video metadata to {}", save_path.display());

    let mut file = File::create(save_path)
        .with_context(|| format!("Failed to create metadata file at {}", save_path.display()))?;

    writeln!(file, "sequence,captured_at,file,mean")
        .context("Failed to write header to metadata file")?;

    for record in records {
        writeln!(
            file,
            "{},{},{},{:.3}",
            record.sequence, record.captured_at, record.file, record.mean
        )
        .context("Failed to write frame metadata")?;
    }

    info!("Successfully saved metadata for {} frames", records.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        let records = vec![
            FrameRecord {
                sequence: 1,
                captured_at: "2024-05-01T21:00:00+00:00".into(),
                file: "frame_000001.fits".into(),
                mean: 12.5,
            },
            FrameRecord {
                sequence: 3,
                captured_at: "2024-05-01T21:00:01+00:00".into(),
                file: "frame_000003.fits".into(),
                mean: 13.0,
            },
        ];
        save_video_metadata(&records, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "sequence,captured_at,file,mean");
        assert_eq!(lines[1], "1,2024-05-01T21:00:00+00:00,frame_000001.fits,12.500");
        assert_eq!(lines.len(), 3);
    }
}
