use crate::config::CameraConfig;
use std::path::PathBuf;

/// One configured camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDescriptor {
    /// Short label, unique within the registry; used in filenames and logs
    pub name: String,

    /// Host or IP address the capture URL is built from
    pub address: String,

    /// Directory this camera's frames are written to
    pub directory: PathBuf,
}

/// Ordered camera roster, immutable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct CameraRegistry {
    cameras: Vec<CameraDescriptor>,
}

impl CameraRegistry {
    /// Build the registry from configuration, preserving declaration order.
    pub fn from_config(cameras: &[CameraConfig]) -> Self {
        Self {
            cameras: cameras
                .iter()
                .map(|camera| CameraDescriptor {
                    name: camera.name.clone(),
                    address: camera.address.clone(),
                    directory: PathBuf::from(&camera.directory),
                })
                .collect(),
        }
    }

    /// Iterate cameras in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CameraDescriptor> {
        self.cameras.iter()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
