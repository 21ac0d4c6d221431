use crate::error::{LapsecamError, Result};
use crate::registry::CameraDescriptor;
use chrono::{DateTime, Local};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Timestamp fragment used in frame filenames, second resolution.
///
/// The format contains no path separators or whitespace and sorts
/// lexically with real time within the same day and month.
pub fn filename_timestamp(time: &DateTime<Local>) -> String {
    time.format("%b%d_%Hh%Mm%Ss").to_string()
}

/// Filename for a frame captured from `camera` at `time`.
pub fn frame_filename(camera: &CameraDescriptor, time: &DateTime<Local>) -> String {
    format!("{}_{}.jpg", camera.name, filename_timestamp(time))
}

/// Persist one frame under the camera's directory.
///
/// The file is created exclusively and written through a scoped handle that
/// closes on every exit path. A same-second collision with an existing file
/// surfaces as a write failure, never a silent overwrite.
pub async fn write_frame(
    camera: &CameraDescriptor,
    data: &[u8],
    time: &DateTime<Local>,
) -> Result<String> {
    let filename = frame_filename(camera, time);
    let path = camera.directory.join(&filename);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| LapsecamError::write(&camera.name, format!("{}: {}", path.display(), e)))?;

    file.write_all(data)
        .await
        .map_err(|e| LapsecamError::write(&camera.name, format!("{}: {}", path.display(), e)))?;
    file.flush()
        .await
        .map_err(|e| LapsecamError::write(&camera.name, format!("{}: {}", path.display(), e)))?;

    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn camera(directory: PathBuf) -> CameraDescriptor {
        CameraDescriptor {
            name: "LEFT".to_string(),
            address: "192.168.0.184".to_string(),
            directory,
        }
    }

    fn instant(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 8, 7, hour, minute, second)
            .unwrap()
    }

    #[test]
    fn timestamp_is_filename_safe() {
        let timestamp = filename_timestamp(&instant(14, 23, 5));

        assert_eq!(timestamp, "Aug07_14h23m05s");
        assert!(!timestamp.contains('/'));
        assert!(!timestamp.contains('\\'));
        assert!(!timestamp.contains(char::is_whitespace));
    }

    #[test]
    fn timestamps_sort_with_time_within_a_day() {
        let earlier = filename_timestamp(&instant(9, 59, 59));
        let later = filename_timestamp(&instant(10, 0, 0));

        assert!(earlier < later);
    }

    #[tokio::test]
    async fn writes_full_payload_to_expected_path() {
        let dir = tempfile::tempdir().unwrap();
        let camera = camera(dir.path().to_path_buf());
        let payload = vec![0xFFu8; 2048];

        let filename = write_frame(&camera, &payload, &instant(14, 23, 5))
            .await
            .unwrap();

        assert_eq!(filename, "LEFT_Aug07_14h23m05s.jpg");
        let written = std::fs::read(dir.path().join(&filename)).unwrap();
        assert_eq!(written.len(), payload.len());
        assert_eq!(written, payload);
    }

    #[tokio::test]
    async fn distinct_instants_produce_distinct_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let camera = camera(dir.path().to_path_buf());

        let first = write_frame(&camera, b"a", &instant(14, 23, 5)).await.unwrap();
        let second = write_frame(&camera, b"b", &instant(14, 23, 6)).await.unwrap();

        assert_ne!(first, second);
        assert!(dir.path().join(&first).exists());
        assert!(dir.path().join(&second).exists());
    }

    #[tokio::test]
    async fn same_instant_collision_is_a_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let camera = camera(dir.path().to_path_buf());
        let time = instant(14, 23, 5);

        write_frame(&camera, b"first", &time).await.unwrap();
        let err = write_frame(&camera, b"second", &time).await.unwrap_err();

        assert!(matches!(err, LapsecamError::Write { .. }));
        // The original content is untouched
        let written = std::fs::read(dir.path().join(frame_filename(&camera, &time))).unwrap();
        assert_eq!(written, b"first");
    }

    #[tokio::test]
    async fn missing_directory_is_a_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let camera = camera(dir.path().join("missing"));

        let err = write_frame(&camera, b"data", &instant(14, 23, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, LapsecamError::Write { .. }));
    }
}
