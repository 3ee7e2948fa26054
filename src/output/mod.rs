//! Saving frames to disk.

mod fits;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{AsiError, Result};
use crate::frame::Frame;

pub use fits::{fits_bytes, write_fits};

/// File format for saved frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Fits,
    Png,
    Tiff,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Fits => "fits",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fits" | "fit" | "fts" => Some(OutputFormat::Fits),
            "png" => Some(OutputFormat::Png),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = AsiError;

    fn from_str(s: &str) -> Result<Self> {
        OutputFormat::from_path(Path::new(&format!("x.{}", s))).ok_or_else(|| {
            AsiError::invalid_argument(format!("unknown output format '{}'", s))
        })
    }
}

/// `folder/stem.ext` for the given format.
pub fn output_path(folder: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    folder.join(format!("{}.{}", stem, format.extension()))
}

/// Save a frame, choosing FITS for `.fits`/`.fit`/`.fts` and the `image`
/// crate's encoder for anything else.
pub fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
    if OutputFormat::from_path(path) == Some(OutputFormat::Fits) {
        return write_fits(frame, path);
    }
    frame.to_image()?.save(path)?;
    debug!("wrote {}", path.display());
    Ok(())
}
