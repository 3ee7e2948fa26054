use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{AsiError, Result};

/// Environment variable naming the SDK library file.
pub const LIBRARY_ENV_VAR: &str = "ZWO_ASI_LIB";

/// Where to try loading the SDK from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// A file known to exist.
    Path(PathBuf),
    /// A bare name left to the system loader search path.
    System(&'static str),
}

impl fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibrarySource::Path(path) => write!(f, "{}", path.display()),
            LibrarySource::System(name) => write!(f, "{} (system search)", name),
        }
    }
}

pub fn library_names() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &["ASICamera2.dll"]
    } else if cfg!(target_os = "macos") {
        &["libASICamera2.dylib", "ASICamera2.dylib"]
    } else {
        &["libASICamera2.so", "ASICamera2.so"]
    }
}

/// Build the ordered candidate list without touching process state.
pub fn candidates(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    search_dirs: &[PathBuf],
) -> Result<Vec<LibrarySource>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(AsiError::LibraryNotFound {
                tried: vec![path.display().to_string()],
            });
        }
        return Ok(vec![LibrarySource::Path(path.to_path_buf())]);
    }

    let mut found = Vec::new();

    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        let path = PathBuf::from(value);
        if path.is_file() {
            found.push(LibrarySource::Path(path));
        } else {
            debug!("{} points at missing file {}", LIBRARY_ENV_VAR, path.display());
        }
    }

    for dir in search_dirs {
        for name in library_names() {
            let path = dir.join(name);
            if path.is_file() {
                found.push(LibrarySource::Path(path));
            }
        }
    }

    found.extend(library_names().iter().copied().map(LibrarySource::System));
    Ok(found)
}

/// Candidate list for this process: explicit path, `ZWO_ASI_LIB`, a `lib/`
/// directory beside the executable, then the system loader.
pub fn locate(explicit: Option<&Path>) -> Result<Vec<LibrarySource>> {
    let search_dirs: Vec<PathBuf> = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("lib")))
        .into_iter()
        .collect();

    candidates(explicit, env::var_os(LIBRARY_ENV_VAR), &search_dirs)
}
