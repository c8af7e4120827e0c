//! Wiring of the use cases over one set of [`AppDeps`].

use std::sync::Arc;

use ps_core::PortraitConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::deps::AppDeps;
use crate::usecases::{
    CaptureAdventurerPlateUseCase, DutySlotCacheService, GeneratePresetString,
    PlateCacheService, RenderThreadBridge,
};
use crate::StoragePaths;

/// Every use case of the pipeline, sharing one shutdown token.
///
/// The host drives it from three threads: `duty_slots().tick()` on the
/// framework thread, `bridge().service_pending()` on the render thread and
/// `duty_slots().process_pending()` on the UI thread.
pub struct PortraitApp {
    config: PortraitConfig,
    paths: StoragePaths,
    duty_slots: DutySlotCacheService,
    bridge: Arc<RenderThreadBridge>,
    plates: Arc<PlateCacheService>,
    plate_capture: Arc<CaptureAdventurerPlateUseCase>,
    presets: GeneratePresetString,
    shutdown: CancellationToken,
}

impl PortraitApp {
    pub fn new(
        deps: AppDeps,
        config: PortraitConfig,
        paths: StoragePaths,
        shutdown: CancellationToken,
    ) -> Self {
        let duty_slots = DutySlotCacheService::new(
            deps.slot_source.clone(),
            deps.job_catalog.clone(),
            deps.frame_capture.clone(),
            deps.compositor.clone(),
            deps.store.clone(),
            deps.clock.clone(),
            config.duty.clone(),
            paths.duty_cache_dir.clone(),
        );
        let bridge = Arc::new(RenderThreadBridge::new(
            deps.frame_capture.clone(),
            deps.clock.clone(),
            config.capture.settle_delay_ms,
            shutdown.clone(),
        ));
        let plates = Arc::new(PlateCacheService::new(
            deps.plate_repository.clone(),
            deps.store.clone(),
            config.storage.plate_cache_capacity,
        ));
        let plate_capture = Arc::new(CaptureAdventurerPlateUseCase::new(
            deps.plate_source.clone(),
            deps.gpu_device.clone(),
            bridge.clone(),
            deps.compositor.clone(),
            deps.store.clone(),
            plates.clone(),
            deps.job_catalog.clone(),
            deps.clock.clone(),
            paths.plate_dir.clone(),
            shutdown.clone(),
        ));
        let presets = GeneratePresetString::new(deps.plate_source);

        Self {
            config,
            paths,
            duty_slots,
            bridge,
            plates,
            plate_capture,
            presets,
            shutdown,
        }
    }

    pub fn config(&self) -> &PortraitConfig {
        &self.config
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn duty_slots(&self) -> &DutySlotCacheService {
        &self.duty_slots
    }

    pub fn bridge(&self) -> &RenderThreadBridge {
        &self.bridge
    }

    pub fn plates(&self) -> &PlateCacheService {
        &self.plates
    }

    pub fn plate_capture(&self) -> Arc<CaptureAdventurerPlateUseCase> {
        self.plate_capture.clone()
    }

    pub fn presets(&self) -> &GeneratePresetString {
        &self.presets
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancels all in-progress work and completes any pending capture with a
    /// cancellation. Idempotent.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutting down portrait pipeline");
        }
        self.shutdown.cancel();
        self.bridge.shutdown();
    }
}
