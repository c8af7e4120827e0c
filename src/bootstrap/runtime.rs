//! # Plugin runtime / 插件运行时
//!
//! Owns the worker runtime and the wired [`PortraitApp`], and exposes the
//! hooks the host calls from its own threads.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ps_app::usecases::PlateCaptureError;
use ps_app::{PortraitApp, StoragePaths};
use ps_core::{CachedEntry, CapturedPortrait, PortraitConfig, SlotRecord};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::load_config_or_default;
use super::paths::resolve_config_dir;
use super::startup::prepare_storage;
use super::tracing::init_tracing_subscriber;
use super::wiring::wire_dependencies;
use crate::host::HostServices;

const WORKER_THREADS: usize = 2;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// The running plugin.
///
/// Hook methods never block: file saves, index writes and plate captures run
/// on the worker runtime.
pub struct PortraitRuntime {
    app: Arc<PortraitApp>,
    runtime: Option<Runtime>,
}

impl PortraitRuntime {
    /// Full plugin start: resolves the config directory, installs logging,
    /// loads `config.toml` and prepares storage.
    pub fn start(config_dir: Option<PathBuf>, host: HostServices) -> anyhow::Result<Self> {
        let config_dir = resolve_config_dir(config_dir)?;
        let paths = StoragePaths::from_config_dir(&config_dir);

        if let Err(err) = init_tracing_subscriber(&paths.logs_dir) {
            eprintln!("Failed to initialize tracing: {err}");
        }

        let config = load_config_or_default(&paths.config_path)?;
        Self::start_with(config, paths, host)
    }

    /// Starts with an explicit configuration and without touching the global
    /// subscriber.
    pub fn start_with(
        config: PortraitConfig,
        paths: StoragePaths,
        host: HostServices,
    ) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("portrait-worker")
            .enable_all()
            .build()
            .context("Failed to build worker runtime")?;

        let shutdown = CancellationToken::new();
        let deps = wire_dependencies(
            host,
            &config,
            &paths,
            runtime.handle().clone(),
            shutdown.clone(),
        );
        let app = Arc::new(PortraitApp::new(deps, config, paths, shutdown));

        runtime.block_on(prepare_storage(&app));
        info!(config_dir = %app.paths().config_dir.display(), "Portrait pipeline started");

        Ok(Self {
            app,
            runtime: Some(runtime),
        })
    }

    pub fn app(&self) -> &Arc<PortraitApp> {
        &self.app
    }

    /// Framework-thread hook: observe the party slots.
    pub fn on_framework_update(&self) {
        self.app.duty_slots().tick();
    }

    /// Render-thread hook: service a settled capture request.
    pub fn on_render(&self) -> bool {
        self.app.bridge().service_pending()
    }

    /// UI-thread hook: run queued portrait fetches.
    pub fn on_draw(&self) -> usize {
        self.app.duty_slots().process_pending()
    }

    /// Whether the host should draw a capture button on the open plate.
    pub fn show_plate_capture_button(&self) -> bool {
        self.app.config().ui.show_capture_button_on_plate
    }

    pub fn duty_slots(&self) -> Vec<Option<SlotRecord>> {
        self.app.duty_slots().snapshot()
    }

    pub fn cached_plates(&self) -> Vec<CachedEntry> {
        self.app.plates().entries()
    }

    pub fn preset_string(&self, portrait: &CapturedPortrait) -> String {
        self.app.presets().execute(portrait)
    }

    /// Starts capturing the open adventurer plate on the worker runtime.
    pub fn request_plate_capture(
        &self,
    ) -> Option<JoinHandle<Result<Arc<CapturedPortrait>, PlateCaptureError>>> {
        let usecase = self.app.plate_capture();
        let handle = self.handle()?;
        Some(handle.spawn(async move { usecase.execute().await }))
    }

    pub fn clear_duty_cache(&self) {
        self.app.duty_slots().clear();
    }

    pub fn clear_plate_cache(&self) -> Option<JoinHandle<()>> {
        let app = self.app.clone();
        let handle = self.handle()?;
        Some(handle.spawn(async move { app.plates().clear().await }))
    }

    /// Cancels in-flight work and stops the worker runtime. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        self.app.shutdown();
        runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
        info!("Portrait pipeline stopped");
    }

    fn handle(&self) -> Option<Handle> {
        match &self.runtime {
            Some(runtime) => Some(runtime.handle().clone()),
            None => {
                warn!("Worker runtime already stopped");
                None
            }
        }
    }
}

impl Drop for PortraitRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
