//! Adventurer plate capture: read, capture on the render thread, save, cache.
//! 冒险者铭牌捕获。

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use ps_core::capture::{CaptureError, TextureLease};
use ps_core::ports::{
    ClockPort, GpuDevicePort, JobCatalogPort, PersistError, PlateReadError, PlateSourcePort,
    PortraitCompositorPort, PortraitStorePort,
};
use ps_core::CapturedPortrait;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::PlateCacheService;
use crate::usecases::capture::RenderThreadBridge;
use crate::usecases::datetime_from_ms;

#[derive(Debug, Error)]
pub enum PlateCaptureError {
    #[error("a plate capture is already in progress")]
    AlreadyInProgress,

    #[error("shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Source(#[from] PlateReadError),

    #[error("capture failed: {0}")]
    Capture(CaptureError),

    #[error("save failed: {0}")]
    Save(PersistError),

    #[error("plate capture cancelled")]
    Cancelled,
}

impl From<CaptureError> for PlateCaptureError {
    fn from(err: CaptureError) -> Self {
        if err.is_cancelled() {
            PlateCaptureError::Cancelled
        } else {
            PlateCaptureError::Capture(err)
        }
    }
}

impl From<PersistError> for PlateCaptureError {
    fn from(err: PersistError) -> Self {
        if err.is_cancelled() {
            PlateCaptureError::Cancelled
        } else {
            PlateCaptureError::Save(err)
        }
    }
}

/// What the UI shows next to the capture button.
#[derive(Debug, Clone, Default)]
pub struct PlateCaptureStatus {
    pub is_capturing: bool,
    pub last_captured: Option<Arc<CapturedPortrait>>,
    pub last_error: Option<String>,
}

/// `<player name>_<yyyyMMddHHmmss>.png` with characters that are not valid
/// in file names replaced by `_`.
pub fn plate_file_name(player_name: &str, now_ms: i64) -> String {
    let safe: String = player_name
        .trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stamp = datetime_from_ms(now_ms).format("%Y%m%d%H%M%S");
    format!("{safe}_{stamp}.png")
}

/// Captures the open adventurer plate into the plate cache.
///
/// Only one capture runs at a time. The plate texture is retained for the
/// whole round trip through the render thread.
pub struct CaptureAdventurerPlateUseCase {
    plate_source: Arc<dyn PlateSourcePort>,
    device: Arc<dyn GpuDevicePort>,
    bridge: Arc<RenderThreadBridge>,
    compositor: Arc<dyn PortraitCompositorPort>,
    store: Arc<dyn PortraitStorePort>,
    plates: Arc<PlateCacheService>,
    jobs: Arc<dyn JobCatalogPort>,
    clock: Arc<dyn ClockPort>,
    plate_dir: PathBuf,
    gate: Semaphore,
    status: Mutex<PlateCaptureStatus>,
    shutdown: CancellationToken,
}

impl CaptureAdventurerPlateUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        plate_source: Arc<dyn PlateSourcePort>,
        device: Arc<dyn GpuDevicePort>,
        bridge: Arc<RenderThreadBridge>,
        compositor: Arc<dyn PortraitCompositorPort>,
        store: Arc<dyn PortraitStorePort>,
        plates: Arc<PlateCacheService>,
        jobs: Arc<dyn JobCatalogPort>,
        clock: Arc<dyn ClockPort>,
        plate_dir: PathBuf,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            plate_source,
            device,
            bridge,
            compositor,
            store,
            plates,
            jobs,
            clock,
            plate_dir,
            gate: Semaphore::new(1),
            status: Mutex::new(PlateCaptureStatus::default()),
            shutdown,
        }
    }

    pub fn status(&self) -> PlateCaptureStatus {
        self.status.lock().clone()
    }

    pub async fn execute(&self) -> Result<Arc<CapturedPortrait>, PlateCaptureError> {
        if self.shutdown.is_cancelled() {
            return Err(PlateCaptureError::ShuttingDown);
        }
        let _permit = self
            .gate
            .try_acquire()
            .map_err(|_| PlateCaptureError::AlreadyInProgress)?;
        self.status.lock().is_capturing = true;

        let span = info_span!("usecase.capture_adventurer_plate.execute");
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(PlateCaptureError::Cancelled),
            result = self.capture().instrument(span) => result,
        };

        let mut status = self.status.lock();
        status.is_capturing = false;
        match &result {
            Ok(portrait) => {
                status.last_captured = Some(portrait.clone());
                status.last_error = None;
            }
            Err(PlateCaptureError::Cancelled) => {
                debug!("Plate capture cancelled");
            }
            Err(err) => {
                warn!(error = %err, "Plate capture failed");
                status.last_error = Some(err.to_string());
            }
        }
        result
    }

    async fn capture(&self) -> Result<Arc<CapturedPortrait>, PlateCaptureError> {
        let snapshot = self.plate_source.read_plate().await?;
        match self.plate_source.local_player_name() {
            Some(local) if local != snapshot.player_name => warn!(
                player = %snapshot.player_name,
                "Plate belongs to another player, preset may not apply to your character"
            ),
            _ => {}
        }

        let lease = TextureLease::retain(self.device.clone(), snapshot.texture);
        let image = self.bridge.request_capture(lease).await?;
        let image = self.compositor.composite(
            image,
            snapshot.data.banner_frame,
            snapshot.data.banner_decoration,
        );

        let now_ms = self.clock.now_ms();
        let path = self
            .plate_dir
            .join(plate_file_name(&snapshot.player_name, now_ms));
        let portrait = CapturedPortrait::new(
            snapshot.data,
            self.jobs.abbreviation_or_unknown(snapshot.data.class_job_id),
            datetime_from_ms(now_ms),
        )
        .with_player_name(snapshot.player_name.clone())
        .with_source_texture(snapshot.texture)
        .with_image_path(&path);

        self.store.save(image, path.clone()).await?;
        self.plates.add(portrait.clone()).await;

        info!(
            player = %snapshot.player_name,
            path = %path.display(),
            "Captured adventurer plate"
        );
        Ok(Arc::new(portrait))
    }
}
