use thiserror::Error;

#[derive(Error, Debug)]
pub enum LapsecamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Failed to create capture directory {path}: {source}")]
    DirectoryCreation {
        path: String,
        source: std::io::Error,
    },

    #[error("Fetch failed for camera {camera}: {reason}")]
    Fetch { camera: String, reason: String },

    #[error("Write failed for camera {camera}: {reason}")]
    Write { camera: String, reason: String },

    #[error("System error: {message}")]
    System { message: String },
}

impl LapsecamError {
    pub fn fetch(camera: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            camera: camera.into(),
            reason: reason.into(),
        }
    }

    pub fn write(camera: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Write {
            camera: camera.into(),
            reason: reason.into(),
        }
    }

    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LapsecamError>;
