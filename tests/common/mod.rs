#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use portrait_stealer_lib::HostServices;
use ps_app::StoragePaths;
use ps_core::capture::{PixelFormat, TextureDesc, TextureHandle};
use ps_core::ports::{
    JobCatalogPort, OverlayIconPort, OverlayKind, PlateReadError, PlateSnapshot,
    PlateSourcePort, SlotReadError, SlotSourcePort,
};
use ps_core::portrait::{PortraitData, PortraitPose};
use ps_core::slot::SlotObservation;
use ps_core::{ClassJobId, PortraitConfig, PortraitImage, SlotIndex, SLOT_COUNT};
use ps_infra::capture::testing::SoftwareGpuDevice;

pub struct PartyList {
    pub available: AtomicBool,
    pub slots: Mutex<Vec<SlotObservation>>,
    pub textures: Mutex<Vec<Option<TextureHandle>>>,
}

impl PartyList {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            slots: Mutex::new(vec![SlotObservation::empty(); SLOT_COUNT]),
            textures: Mutex::new(vec![None; SLOT_COUNT]),
        }
    }

    pub fn seat(&self, slot: usize, object_id: u32, job: u8, name: &str, texture: TextureHandle) {
        self.slots.lock().unwrap()[slot] = SlotObservation::new(object_id, job, name);
        self.textures.lock().unwrap()[slot] = Some(texture);
    }
}

impl SlotSourcePort for PartyList {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn read_slot(&self, slot: SlotIndex) -> Result<SlotObservation, SlotReadError> {
        Ok(self.slots.lock().unwrap()[slot.get()].clone())
    }

    fn export_portrait(&self, slot: SlotIndex) -> Result<PortraitData, SlotReadError> {
        let job = self.slots.lock().unwrap()[slot.get()].class_job_id;
        Ok(portrait_data(job))
    }

    fn portrait_texture(&self, slot: SlotIndex) -> Option<TextureHandle> {
        self.textures.lock().unwrap()[slot.get()]
    }
}

pub struct OpenPlate {
    pub snapshot: Mutex<Option<PlateSnapshot>>,
}

#[async_trait]
impl PlateSourcePort for OpenPlate {
    async fn read_plate(&self) -> Result<PlateSnapshot, PlateReadError> {
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or(PlateReadError::NotOpen)
    }

    fn local_player_name(&self) -> Option<String> {
        Some("Tataru Taru".to_string())
    }
}

pub struct JobSheet;

impl JobCatalogPort for JobSheet {
    fn abbreviation(&self, job: ClassJobId) -> anyhow::Result<Option<String>> {
        Ok(match job.get() {
            19 => Some("PLD".into()),
            24 => Some("WHM".into()),
            _ => None,
        })
    }
}

pub struct NoIcons;

impl OverlayIconPort for NoIcons {
    fn load_overlay(&self, _kind: OverlayKind, _id: u16) -> anyhow::Result<Option<PortraitImage>> {
        Ok(None)
    }
}

pub fn portrait_data(job: u8) -> PortraitData {
    PortraitData {
        pose: PortraitPose {
            camera_zoom: 55,
            image_rotation: -3,
            ..PortraitPose::default()
        },
        banner_frame: 11,
        banner_decoration: 12,
        class_job_id: ClassJobId::new(job),
    }
}

pub fn bgra_texture(device: &SoftwareGpuDevice, width: u32, height: u32) -> TextureHandle {
    let pixels = [10u8, 20, 30, 255].repeat((width * height) as usize);
    device.add_texture(
        TextureDesc {
            width,
            height,
            format: PixelFormat::Bgra8Unorm,
            sample_count: 1,
        },
        pixels,
    )
}

pub struct Host {
    pub party: Arc<PartyList>,
    pub plate: Arc<OpenPlate>,
    pub device: Arc<SoftwareGpuDevice>,
}

impl Host {
    pub fn new() -> Self {
        Self {
            party: Arc::new(PartyList::new()),
            plate: Arc::new(OpenPlate {
                snapshot: Mutex::new(None),
            }),
            device: Arc::new(SoftwareGpuDevice::new()),
        }
    }

    pub fn services(&self) -> HostServices {
        HostServices {
            slot_source: self.party.clone(),
            plate_source: self.plate.clone(),
            gpu_device: self.device.clone(),
            job_sheet: Arc::new(JobSheet),
            overlay_icons: Arc::new(NoIcons),
        }
    }
}

/// Config with no waiting, so tests run against the real clock.
pub fn fast_config() -> PortraitConfig {
    let mut config = PortraitConfig::default();
    config.capture.settle_delay_ms = 0;
    config.duty.fetch_delay_ms = 0;
    config
}

pub fn paths(dir: &Path) -> StoragePaths {
    StoragePaths::from_config_dir(dir)
}

pub fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(5));
    }
}
