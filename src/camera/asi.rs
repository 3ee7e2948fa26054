use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info};

use super::control::Camera;
use crate::error::{AsiError, Result};
use crate::sdk::{self, AsiSdk};
use crate::types::CameraInfo;

/// How to pick a camera: by position or by model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSelector {
    Index(i32),
    /// Matches `"ZWO " + model` as well as the name itself.
    Model(String),
}

impl From<i32> for CameraSelector {
    fn from(index: i32) -> Self {
        CameraSelector::Index(index)
    }
}

impl From<&str> for CameraSelector {
    fn from(model: &str) -> Self {
        CameraSelector::Model(model.to_string())
    }
}

impl From<String> for CameraSelector {
    fn from(model: String) -> Self {
        CameraSelector::Model(model)
    }
}

impl fmt::Display for CameraSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSelector::Index(index) => write!(f, "#{}", index),
            CameraSelector::Model(model) => write!(f, "{}", model),
        }
    }
}

/// Entry point for enumerating and opening cameras.
#[derive(Clone)]
pub struct Asi {
    sdk: Arc<dyn AsiSdk>,
}

impl fmt::Debug for Asi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asi").finish_non_exhaustive()
    }
}

impl Asi {
    pub fn new(sdk: Arc<dyn AsiSdk>) -> Self {
        Self { sdk }
    }

    /// Load the vendor library (once per process) and wrap it.
    pub fn load(library_file: Option<&Path>) -> Result<Self> {
        let lib: Arc<dyn AsiSdk> = sdk::init(library_file)?;
        Ok(Self::new(lib))
    }

    pub fn sdk(&self) -> &Arc<dyn AsiSdk> {
        &self.sdk
    }

    pub fn num_cameras(&self) -> i32 {
        self.sdk.num_connected_cameras()
    }

    pub fn camera_property(&self, index: i32) -> Result<CameraInfo> {
        if index < 0 || index >= self.num_cameras() {
            return Err(AsiError::InvalidIndex(index));
        }
        self.sdk.camera_property(index)
    }

    /// Model names of every connected camera, in index order.
    pub fn list_cameras(&self) -> Result<Vec<String>> {
        (0..self.num_cameras())
            .map(|index| self.sdk.camera_property(index).map(|info| info.name))
            .collect()
    }

    /// Resolve a selector to a camera index.
    pub fn find(&self, selector: &CameraSelector) -> Result<i32> {
        match selector {
            CameraSelector::Index(index) => {
                if *index < 0 || *index >= self.num_cameras() {
                    Err(AsiError::InvalidIndex(*index))
                } else {
                    Ok(*index)
                }
            }
            CameraSelector::Model(model) => {
                let prefixed = format!("ZWO {}", model);
                for index in 0..self.num_cameras() {
                    let name = self.sdk.camera_property(index)?.name;
                    if name == *model || name == prefixed {
                        return Ok(index);
                    }
                }
                Err(AsiError::CameraNotFound(model.clone()))
            }
        }
    }

    /// Open and initialise a camera.
    ///
    /// If either step fails the camera is closed again before the error is
    /// returned.
    pub fn open(&self, selector: impl Into<CameraSelector>) -> Result<Camera> {
        let selector = selector.into();
        let index = self.find(&selector)?;
        let info = self.sdk.camera_property(index)?;
        let id = info.camera_id;
        debug!("Opening camera {} ({}) with id {}", selector, info.name, id);

        let opened = self
            .sdk
            .open_camera(id)
            .and_then(|_| self.sdk.init_camera(id));
        if let Err(e) = opened {
            error!("Could not open camera {}: {}", selector, e);
            if let Err(close_err) = self.sdk.close_camera(id) {
                debug!("Close after failed open also failed: {}", close_err);
            }
            return Err(e);
        }

        info!("Opened camera {} ({})", info.name, id);
        Ok(Camera::new(Arc::clone(&self.sdk), info))
    }
}
