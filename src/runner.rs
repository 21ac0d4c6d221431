use crate::config::CaptureConfig;
use crate::fetcher::FrameSource;
use crate::registry::CameraRegistry;
use crate::writer;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Capture loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Counters accumulated across capture passes. Observational only, the
/// counters never influence control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub passes: u64,
    pub frames_saved: u64,
    pub bytes_written: u64,
    pub fetch_failures: u64,
    pub write_failures: u64,
}

/// Drives fetch-then-write passes over the camera registry until cancelled.
///
/// Cameras are visited strictly in registry order and passes never overlap:
/// the sleep interval is measured from the end of the previous pass. A
/// failing camera is logged and skipped; nothing short of cancellation
/// stops the loop.
pub struct CaptureRunner {
    registry: CameraRegistry,
    source: Arc<dyn FrameSource>,
    interval: Duration,
    cancellation_token: CancellationToken,
    state: LoopState,
    stats: CaptureStats,
}

impl CaptureRunner {
    pub fn new(
        registry: CameraRegistry,
        source: Arc<dyn FrameSource>,
        config: &CaptureConfig,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            registry,
            source,
            interval: Duration::from_secs_f64(config.interval_seconds),
            cancellation_token,
            state: LoopState::Running,
            stats: CaptureStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// Run capture passes until the cancellation token fires, then report
    /// the final counters.
    pub async fn run(&mut self) {
        info!("Capture loop is running");

        while !self.cancellation_token.is_cancelled() {
            self.run_pass().await;

            tokio::select! {
                _ = self.cancellation_token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.state = LoopState::Stopped;
        info!(
            "Capture loop stopped after {} passes: {} frames saved ({} bytes), {} fetch failures, {} write failures",
            self.stats.passes,
            self.stats.frames_saved,
            self.stats.bytes_written,
            self.stats.fetch_failures,
            self.stats.write_failures,
        );
    }

    /// One pass over the registry in declaration order, logging the outcome
    /// for every camera.
    pub async fn run_pass(&mut self) {
        for camera in self.registry.iter() {
            match self.source.fetch(camera).await {
                Ok(frame) => {
                    let now = Local::now();
                    match writer::write_frame(camera, &frame.data, &now).await {
                        Ok(filename) => {
                            self.stats.frames_saved += 1;
                            self.stats.bytes_written += frame.data.len() as u64;
                            info!("Saved: {} ({} bytes)", filename, frame.data.len());
                        }
                        Err(e) => {
                            self.stats.write_failures += 1;
                            warn!("{}", e);
                        }
                    }
                }
                Err(e) => {
                    self.stats.fetch_failures += 1;
                    warn!("{}", e);
                }
            }
        }

        self.stats.passes += 1;
    }
}
