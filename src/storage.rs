use crate::error::{LapsecamError, Result};
use crate::registry::CameraRegistry;
use tokio::fs;
use tracing::{debug, info};

/// Create every camera's destination directory before the loop starts.
///
/// Idempotent: directories that already exist are left untouched. A creation
/// failure is fatal, the capture loop must not start with missing storage.
pub async fn ensure_directories(registry: &CameraRegistry) -> Result<()> {
    for camera in registry.iter() {
        if camera.directory.exists() {
            debug!(
                "Capture directory already present: {}",
                camera.directory.display()
            );
            continue;
        }

        fs::create_dir_all(&camera.directory).await.map_err(|e| {
            LapsecamError::DirectoryCreation {
                path: camera.directory.display().to_string(),
                source: e,
            }
        })?;
        info!("Created capture directory: {}", camera.directory.display());
    }

    Ok(())
}
