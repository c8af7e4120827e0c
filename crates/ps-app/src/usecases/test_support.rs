//! Hand-written fakes shared by the use case tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use ps_core::capture::TextureHandle;
use ps_core::ports::{
    ClockPort, JobCatalogPort, PersistError, PortraitCompositorPort, PortraitStorePort,
    SlotReadError, SlotSourcePort,
};
use ps_core::portrait::{PortraitData, PortraitPose};
use ps_core::slot::SlotObservation;
use ps_core::{ClassJobId, PortraitImage, SlotIndex, SLOT_COUNT};

pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self(AtomicI64::new(now_ms))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> PortraitImage {
    PortraitImage::new(width, height, rgba.repeat((width * height) as usize)).unwrap()
}

pub fn portrait_data(class_job_id: u8) -> PortraitData {
    PortraitData {
        pose: PortraitPose {
            camera_zoom: 40,
            banner_timeline: 12,
            ..PortraitPose::default()
        },
        banner_frame: 3,
        banner_decoration: 7,
        class_job_id: ClassJobId::new(class_job_id),
    }
}

pub struct FixedJobs;

impl JobCatalogPort for FixedJobs {
    fn abbreviation(&self, job: ClassJobId) -> anyhow::Result<Option<String>> {
        Ok(match job.get() {
            19 => Some("PLD".into()),
            24 => Some("WHM".into()),
            33 => Some("AST".into()),
            _ => None,
        })
    }
}

/// Leaves the portrait untouched.
pub struct PassThroughCompositor;

impl PortraitCompositorPort for PassThroughCompositor {
    fn composite(&self, base: PortraitImage, _frame: u16, _decoration: u16) -> PortraitImage {
        base
    }
}

/// Party list whose slots are set directly by the test.
pub struct FakeSlotSource {
    available: AtomicBool,
    slots: Mutex<Vec<SlotObservation>>,
    faulted: Mutex<HashSet<usize>>,
    export_failures: Mutex<HashSet<usize>>,
    textures: Mutex<HashMap<usize, TextureHandle>>,
}

impl FakeSlotSource {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            slots: Mutex::new(vec![SlotObservation::empty(); SLOT_COUNT]),
            faulted: Mutex::new(HashSet::new()),
            export_failures: Mutex::new(HashSet::new()),
            textures: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_slot(&self, slot: usize, object_id: u32, class_job_id: u8, name: &str) {
        self.slots.lock()[slot] = SlotObservation::new(object_id, class_job_id, name);
    }

    pub fn empty_slot(&self, slot: usize) {
        self.slots.lock()[slot] = SlotObservation::empty();
    }

    pub fn fault_slot(&self, slot: usize) {
        self.faulted.lock().insert(slot);
    }

    pub fn fail_export(&self, slot: usize) {
        self.export_failures.lock().insert(slot);
    }

    pub fn set_texture(&self, slot: usize, texture: TextureHandle) {
        self.textures.lock().insert(slot, texture);
    }
}

impl SlotSourcePort for FakeSlotSource {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn read_slot(&self, slot: SlotIndex) -> Result<SlotObservation, SlotReadError> {
        if self.faulted.lock().contains(&slot.get()) {
            return Err(SlotReadError::AccessFault(format!("slot {slot}")));
        }
        Ok(self.slots.lock()[slot.get()].clone())
    }

    fn export_portrait(&self, slot: SlotIndex) -> Result<PortraitData, SlotReadError> {
        if self.export_failures.lock().contains(&slot.get()) {
            return Err(SlotReadError::Invalid("export returned nothing".into()));
        }
        let job = self.slots.lock()[slot.get()].class_job_id;
        Ok(portrait_data(job))
    }

    fn portrait_texture(&self, slot: SlotIndex) -> Option<TextureHandle> {
        self.textures.lock().get(&slot.get()).copied()
    }
}

/// Store that records calls instead of touching the disk.
#[derive(Default)]
pub struct RecordingStore {
    pub saved: Mutex<Vec<PathBuf>>,
    pub detached: Mutex<Vec<PathBuf>>,
    pub removed: Mutex<Vec<PathBuf>>,
    fail_saves: AtomicBool,
}

impl RecordingStore {
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PortraitStorePort for RecordingStore {
    async fn save(&self, _image: PortraitImage, path: PathBuf) -> Result<(), PersistError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistError::Encode("disk full".into()));
        }
        self.saved.lock().push(path);
        Ok(())
    }

    fn save_detached(&self, _image: PortraitImage, path: PathBuf) {
        self.detached.lock().push(path);
    }

    fn remove(&self, path: &Path) {
        self.removed.lock().push(path.to_path_buf());
    }
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
