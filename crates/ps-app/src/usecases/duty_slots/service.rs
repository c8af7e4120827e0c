//! Party slot portrait cache.
//! 队伍槽位肖像缓存。

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use ps_core::capture::CaptureError;
use ps_core::config::DutyConfig;
use ps_core::ports::{
    ClockPort, FrameCapturePort, JobCatalogPort, PortraitCompositorPort, PortraitStorePort,
    SlotSourcePort,
};
use ps_core::slot::SlotChange;
use ps_core::{
    CapturedPortrait, FetchScheduler, ObjectId, PortraitImage, SlotIdentity, SlotIndex,
    SlotRecord, SlotTable,
};
use tracing::{debug, info, warn};

use crate::usecases::datetime_from_ms;

/// .NET tick count of the Unix epoch; cache files keep the tick-stamped names
/// older releases wrote.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;
const TICKS_PER_MS: i64 = 10_000;

/// `<object id>_<utc ticks>.png`
pub fn duty_portrait_file_name(object_id: ObjectId, now_ms: i64) -> String {
    let ticks = now_ms
        .saturating_mul(TICKS_PER_MS)
        .saturating_add(UNIX_EPOCH_TICKS);
    format!("{object_id}_{ticks}.png")
}

struct FetchedPortrait {
    portrait: Arc<CapturedPortrait>,
    image: PortraitImage,
    path: PathBuf,
}

/// Keeps one record per party slot and fetches each new occupant's portrait
/// once it has been stable for the fetch delay.
///
/// `tick` runs on the framework thread, `process_pending` on the UI thread;
/// both take the slot table lock before the fetch queue lock.
///
/// 记录每个队伍槽位的状态；占位稳定超过延迟后抓取一次肖像。
pub struct DutySlotCacheService {
    slots: RwLock<SlotTable>,
    queue: Mutex<FetchScheduler>,
    source: Arc<dyn SlotSourcePort>,
    jobs: Arc<dyn JobCatalogPort>,
    capture: Arc<dyn FrameCapturePort>,
    compositor: Arc<dyn PortraitCompositorPort>,
    store: Arc<dyn PortraitStorePort>,
    clock: Arc<dyn ClockPort>,
    config: DutyConfig,
    cache_dir: PathBuf,
}

impl DutySlotCacheService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn SlotSourcePort>,
        jobs: Arc<dyn JobCatalogPort>,
        capture: Arc<dyn FrameCapturePort>,
        compositor: Arc<dyn PortraitCompositorPort>,
        store: Arc<dyn PortraitStorePort>,
        clock: Arc<dyn ClockPort>,
        config: DutyConfig,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            slots: RwLock::new(SlotTable::new()),
            queue: Mutex::new(FetchScheduler::new(config.fetch_queue_capacity)),
            source,
            jobs,
            capture,
            compositor,
            store,
            clock,
            config,
            cache_dir,
        }
    }

    /// Observes every slot once and advances its record.
    ///
    /// Does nothing while the party list is unavailable. Files owned by
    /// replaced or cleared records are deleted before the table is unlocked.
    pub fn tick(&self) {
        if !self.source.is_available() {
            return;
        }
        let now_ms = self.clock.now_ms();

        let mut slots = self.slots.write();
        let mut queue = self.queue.lock();
        for slot in SlotIndex::all() {
            let change = match self.source.read_slot(slot) {
                Ok(observation) => slots.observe(
                    slot,
                    &observation,
                    |job| self.jobs.abbreviation_or_unknown(job),
                    now_ms,
                    self.config.fetch_delay_ms,
                    &mut queue,
                ),
                Err(err) => {
                    let change = slots.clear_slot(slot);
                    if change != SlotChange::Unchanged {
                        warn!(slot = %slot, error = %err, "Slot read failed, dropping record");
                    }
                    change
                }
            };

            if let Some(path) = change.discarded_file() {
                self.store.remove(path);
            }
            match change {
                SlotChange::Unchanged => {}
                SlotChange::Created { .. } => {
                    if let Some(record) = slots.get(slot) {
                        debug!(
                            slot = %slot,
                            identity = %record.identity(),
                            job = record.job_abbreviation(),
                            "Slot occupant changed"
                        );
                    }
                }
                SlotChange::Cleared { .. } => debug!(slot = %slot, "Slot emptied"),
                SlotChange::Queued => debug!(slot = %slot, "Slot queued for portrait fetch"),
                SlotChange::QueueFull => {
                    debug!(slot = %slot, "Fetch queue full, retrying next tick")
                }
            }
        }
    }

    /// Runs up to `fetches_per_tick` queued fetches. Returns how many ran.
    ///
    /// While the party list is unavailable the queue is emptied instead;
    /// the drained records stay queued until their slot changes.
    pub fn process_pending(&self) -> usize {
        if !self.source.is_available() {
            let dropped = self.queue.lock().drain();
            if dropped > 0 {
                debug!(dropped, "Party list unavailable, discarded pending fetches");
            }
            return 0;
        }

        let mut processed = 0;
        while processed < self.config.fetches_per_tick {
            let Some(slot) = self.queue.lock().pop() else {
                break;
            };
            self.fetch_slot(slot);
            processed += 1;
        }
        processed
    }

    /// Copy of every slot's record.
    pub fn snapshot(&self) -> Vec<Option<SlotRecord>> {
        self.slots.read().snapshot()
    }

    /// Drops every record, deletes their files and empties the fetch queue.
    pub fn clear(&self) {
        let mut slots = self.slots.write();
        let files = slots.clear_all();
        for path in &files {
            self.store.remove(path);
        }
        let dropped = self.queue.lock().drain();
        info!(
            files = files.len(),
            dropped_fetches = dropped,
            "Cleared duty portrait cache"
        );
    }

    fn fetch_slot(&self, slot: SlotIndex) {
        let observed = match self.source.read_slot(slot) {
            Ok(observation) => observation.identity(),
            Err(err) => {
                debug!(slot = %slot, error = %err, "Slot read failed before fetch");
                return;
            }
        };
        let Some(identity) = observed else {
            debug!(slot = %slot, "Slot emptied before fetch");
            return;
        };

        let display_name = {
            let slots = self.slots.read();
            match slots.get(slot) {
                Some(record) if record.identity() == identity => record.display_name().to_string(),
                _ => {
                    debug!(slot = %slot, identity = %identity, "Slot changed before fetch");
                    return;
                }
            }
        };

        let fetched = self.fetch_portrait(slot, identity, display_name);
        let committed = self
            .slots
            .write()
            .commit_if_current(slot, identity, |record| match &fetched {
                Some(f) => record.succeeded(f.portrait.clone(), f.path.clone()),
                None => record.failed(),
            });
        if !committed {
            debug!(slot = %slot, identity = %identity, "Slot changed during fetch, result discarded");
            return;
        }

        if let Some(f) = fetched {
            self.store.save_detached(f.image, f.path);
        }
    }

    fn fetch_portrait(
        &self,
        slot: SlotIndex,
        identity: SlotIdentity,
        display_name: String,
    ) -> Option<FetchedPortrait> {
        let data = match self.source.export_portrait(slot) {
            Ok(data) => data,
            Err(err) => {
                warn!(slot = %slot, identity = %identity, error = %err, "Portrait export failed");
                return None;
            }
        };

        let captured = self
            .source
            .portrait_texture(slot)
            .ok_or(CaptureError::TextureUnavailable)
            .and_then(|texture| self.capture.capture(texture));
        let image = match captured {
            Ok(image) => {
                self.compositor
                    .composite(image, data.banner_frame, data.banner_decoration)
            }
            Err(err) => {
                debug!(slot = %slot, identity = %identity, error = %err, "Portrait capture failed");
                return None;
            }
        };

        let now_ms = self.clock.now_ms();
        let path = self
            .cache_dir
            .join(duty_portrait_file_name(identity.object_id, now_ms));
        let portrait = CapturedPortrait::new(
            data,
            self.jobs.abbreviation_or_unknown(data.class_job_id),
            datetime_from_ms(now_ms),
        )
        .with_player_name(display_name)
        .with_image_path(&path);

        Some(FetchedPortrait {
            portrait: Arc::new(portrait),
            image,
            path,
        })
    }
}
