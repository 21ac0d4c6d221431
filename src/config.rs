use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LapsecamConfig {
    /// Camera roster, captured in declaration order
    #[serde(default = "default_camera_roster", rename = "camera")]
    pub cameras: Vec<CameraConfig>,

    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Short label used in filenames and log lines
    pub name: String,

    /// Host or IP address the capture URL is built from
    pub address: String,

    /// Directory this camera's frames are stored in
    pub directory: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaptureConfig {
    /// Seconds to sleep between capture passes
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: f64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl LapsecamConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("lapsecam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("capture.interval_seconds", default_interval_seconds())?
            .set_default("capture.timeout_seconds", default_timeout_seconds() as i64)?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with LAPSECAM_ prefix
            .add_source(Environment::with_prefix("LAPSECAM").separator("_"))
            .build()?;

        let config: LapsecamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cameras.is_empty() {
            return Err(ConfigError::Message(
                "At least one camera must be configured".to_string(),
            ));
        }

        for camera in &self.cameras {
            if camera.name.trim().is_empty() {
                return Err(ConfigError::Message(
                    "Camera name must not be empty".to_string(),
                ));
            }

            // Names flow into filenames
            if camera.name.contains(['/', '\\']) || camera.name.contains(char::is_whitespace) {
                return Err(ConfigError::Message(format!(
                    "Camera name '{}' must not contain path separators or whitespace",
                    camera.name
                )));
            }

            if camera.address.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "Camera '{}' address must not be empty",
                    camera.name
                )));
            }

            if camera.directory.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "Camera '{}' directory must not be empty",
                    camera.name
                )));
            }
        }

        if self.capture.interval_seconds <= 0.0 {
            return Err(ConfigError::Message(
                "Capture interval_seconds must be greater than 0".to_string(),
            ));
        }

        if self.capture.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Capture timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for LapsecamConfig {
    fn default() -> Self {
        Self {
            cameras: default_camera_roster(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// Default value functions
fn default_camera_roster() -> Vec<CameraConfig> {
    vec![
        CameraConfig {
            name: "LEFT".to_string(),
            address: "192.168.0.184".to_string(),
            directory: "img/left".to_string(),
        },
        CameraConfig {
            name: "RIGHT".to_string(),
            address: "192.168.0.184".to_string(),
            directory: "img/right".to_string(),
        },
    ]
}

fn default_interval_seconds() -> f64 {
    1.0
}

fn default_timeout_seconds() -> u64 {
    10
}
