//! Builds [`AppDeps`] from the host's ports and the infra adapters.

use std::sync::Arc;

use ps_app::{AppDeps, StoragePaths};
use ps_core::ports::ClockPort;
use ps_core::PortraitConfig;
use ps_infra::{
    AsyncImagePersister, CachingJobCatalog, FrameCapture, JsonPlateCacheRepository,
    OverlayCompositor, SystemClock,
};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::host::HostServices;

pub fn wire_dependencies(
    host: HostServices,
    config: &PortraitConfig,
    paths: &StoragePaths,
    runtime: Handle,
    shutdown: CancellationToken,
) -> AppDeps {
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

    let frame_capture = Arc::new(FrameCapture::new(
        host.gpu_device.clone(),
        clock.clone(),
        config.capture.device_cooldown_ms,
        shutdown.clone(),
    ));
    let store = Arc::new(AsyncImagePersister::new(
        runtime,
        config.storage.max_concurrent_saves,
        config.storage.max_pending_saves,
        shutdown,
    ));

    AppDeps {
        slot_source: host.slot_source,
        plate_source: host.plate_source,
        job_catalog: Arc::new(CachingJobCatalog::new(host.job_sheet)),
        gpu_device: host.gpu_device,
        frame_capture,
        compositor: Arc::new(OverlayCompositor::new(host.overlay_icons)),
        store,
        plate_repository: Arc::new(JsonPlateCacheRepository::new(
            paths.plate_index_path.clone(),
        )),
        clock,
    }
}
