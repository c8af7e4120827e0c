use std::path::PathBuf;

use super::{FetchScheduler, SlotObservation, SlotRecord};
use crate::ids::{ClassJobId, SlotIdentity, SlotIndex, SLOT_COUNT};

/// Name shown for a character whose name could not be read.
pub const UNKNOWN_NAME: &str = "???";

/// What a single observation did to a slot.
///
/// Any `discarded_file` belongs to a record that no longer exists; the caller
/// must delete it before releasing its write access to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotChange {
    Unchanged,
    Created { discarded_file: Option<PathBuf> },
    Cleared { discarded_file: Option<PathBuf> },
    Queued,
    /// The record is due but the fetch queue was full; retried next tick.
    QueueFull,
}

impl SlotChange {
    pub fn discarded_file(&self) -> Option<&PathBuf> {
        match self {
            SlotChange::Created { discarded_file } | SlotChange::Cleared { discarded_file } => {
                discarded_file.as_ref()
            }
            _ => None,
        }
    }
}

/// The fixed-size table of slot records and its state machine.
///
/// 固定大小的槽位表及其状态机。所有修改都在调用方的写锁内完成。
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: [Option<SlotRecord>; SLOT_COUNT],
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&SlotRecord> {
        self.slots[slot.get()].as_ref()
    }

    pub fn identity(&self, slot: SlotIndex) -> Option<SlotIdentity> {
        self.get(slot).map(SlotRecord::identity)
    }

    pub fn snapshot(&self) -> Vec<Option<SlotRecord>> {
        self.slots.to_vec()
    }

    pub fn populated(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Applies one tick's observation of `slot`.
    pub fn observe(
        &mut self,
        slot: SlotIndex,
        observation: &SlotObservation,
        job_abbreviation: impl FnOnce(ClassJobId) -> String,
        now_ms: i64,
        fetch_delay_ms: i64,
        scheduler: &mut FetchScheduler,
    ) -> SlotChange {
        let entry = &mut self.slots[slot.get()];

        let Some(identity) = observation.identity() else {
            return match entry.take() {
                Some(old) => SlotChange::Cleared {
                    discarded_file: old.image_path().map(|p| p.to_path_buf()),
                },
                None => SlotChange::Unchanged,
            };
        };

        let replace = match entry.as_ref() {
            Some(existing) => existing.identity() != identity,
            None => true,
        };
        if replace {
            let discarded_file = entry
                .as_ref()
                .and_then(|old| old.image_path().map(|p| p.to_path_buf()));
            let name = if observation.display_name.is_empty() {
                UNKNOWN_NAME.to_string()
            } else {
                observation.display_name.clone()
            };
            *entry = Some(SlotRecord::new(
                identity,
                name,
                job_abbreviation(identity.class_job_id),
                now_ms,
            ));
            return SlotChange::Created { discarded_file };
        }

        let Some(record) = entry.as_mut() else {
            return SlotChange::Unchanged;
        };
        if !record.is_due(now_ms, fetch_delay_ms) {
            return SlotChange::Unchanged;
        }
        if !scheduler.try_enqueue(slot) {
            return SlotChange::QueueFull;
        }
        *record = record.queued();
        SlotChange::Queued
    }

    /// Removes the record in `slot`, returning its temp file if it had one.
    pub fn clear_slot(&mut self, slot: SlotIndex) -> SlotChange {
        match self.slots[slot.get()].take() {
            Some(old) => SlotChange::Cleared {
                discarded_file: old.image_path().map(|p| p.to_path_buf()),
            },
            None => SlotChange::Unchanged,
        }
    }

    /// Removes every record, returning the temp files they owned.
    pub fn clear_all(&mut self) -> Vec<PathBuf> {
        self.slots
            .iter_mut()
            .filter_map(Option::take)
            .filter_map(|old| old.image_path().map(|p| p.to_path_buf()))
            .collect()
    }

    /// Replaces the record in `slot` with `update(record)` only if the record
    /// still belongs to `expected`. Returns whether the update was applied.
    pub fn commit_if_current(
        &mut self,
        slot: SlotIndex,
        expected: SlotIdentity,
        update: impl FnOnce(&SlotRecord) -> SlotRecord,
    ) -> bool {
        match self.slots[slot.get()].as_mut() {
            Some(record) if record.identity() == expected => {
                *record = update(record);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portrait::{CapturedPortrait, PortraitData, PortraitPose};
    use crate::slot::FetchState;
    use chrono::Utc;
    use std::sync::Arc;

    const DELAY: i64 = 750;

    fn slot(i: usize) -> SlotIndex {
        SlotIndex::new(i).unwrap()
    }

    fn seen(object_id: u32, job: u8) -> SlotObservation {
        SlotObservation::new(object_id, job, "Y'shtola")
    }

    fn abbr(job: ClassJobId) -> String {
        format!("J{job}")
    }

    fn portrait() -> Arc<CapturedPortrait> {
        let data = PortraitData {
            pose: PortraitPose::default(),
            banner_frame: 1,
            banner_decoration: 2,
            class_job_id: ClassJobId::new(19),
        };
        Arc::new(CapturedPortrait::new(data, "PLD", Utc::now()))
    }

    #[test]
    fn test_new_identity_creates_waiting_record() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);

        let change = table.observe(slot(3), &seen(500, 19), abbr, 0, DELAY, &mut queue);

        assert_eq!(change, SlotChange::Created { discarded_file: None });
        let record = table.get(slot(3)).unwrap();
        assert_eq!(record.state(), &FetchState::WaitingDelay);
        assert_eq!(record.job_abbreviation(), "J19");
        assert_eq!(record.display_name(), "Y'shtola");
    }

    #[test]
    fn test_due_record_is_queued_once() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        table.observe(slot(3), &seen(500, 19), abbr, 0, DELAY, &mut queue);

        assert_eq!(
            table.observe(slot(3), &seen(500, 19), abbr, 700, DELAY, &mut queue),
            SlotChange::Unchanged
        );
        assert_eq!(
            table.observe(slot(3), &seen(500, 19), abbr, 800, DELAY, &mut queue),
            SlotChange::Queued
        );
        assert_eq!(
            table.observe(slot(3), &seen(500, 19), abbr, 900, DELAY, &mut queue),
            SlotChange::Unchanged
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(table.get(slot(3)).unwrap().state(), &FetchState::Queued);
    }

    #[test]
    fn test_full_queue_leaves_record_waiting() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(0);
        table.observe(slot(0), &seen(500, 19), abbr, 0, DELAY, &mut queue);

        let change = table.observe(slot(0), &seen(500, 19), abbr, 1_000, DELAY, &mut queue);

        assert_eq!(change, SlotChange::QueueFull);
        assert_eq!(table.get(slot(0)).unwrap().state(), &FetchState::WaitingDelay);
    }

    #[test]
    fn test_identity_change_discards_previous_file() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        let first = SlotIdentity::from_raw(500, 19).unwrap();
        table.observe(slot(3), &seen(500, 19), abbr, 0, DELAY, &mut queue);
        table.commit_if_current(slot(3), first, |r| {
            r.succeeded(portrait(), PathBuf::from("/cache/500_1.png"))
        });

        let change = table.observe(slot(3), &seen(501, 24), abbr, 900, DELAY, &mut queue);

        assert_eq!(
            change,
            SlotChange::Created {
                discarded_file: Some(PathBuf::from("/cache/500_1.png"))
            }
        );
        let record = table.get(slot(3)).unwrap();
        assert_eq!(record.identity(), SlotIdentity::from_raw(501, 24).unwrap());
        assert_eq!(record.state(), &FetchState::WaitingDelay);
    }

    #[test]
    fn test_absent_identity_clears_slot() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        table.observe(slot(1), &seen(500, 19), abbr, 0, DELAY, &mut queue);

        let change = table.observe(slot(1), &seen(0xE000_0000, 19), abbr, 10, DELAY, &mut queue);

        assert_eq!(change, SlotChange::Cleared { discarded_file: None });
        assert!(table.get(slot(1)).is_none());
    }

    #[test]
    fn test_emptied_slot_discards_saved_file() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        let identity = SlotIdentity::from_raw(500, 19).unwrap();
        table.observe(slot(4), &seen(500, 19), abbr, 0, DELAY, &mut queue);
        table.commit_if_current(slot(4), identity, |r| {
            r.succeeded(portrait(), PathBuf::from("/cache/500_1.png"))
        });

        let change = table.observe(slot(4), &seen(0, 0), abbr, 10, DELAY, &mut queue);

        assert_eq!(
            change,
            SlotChange::Cleared {
                discarded_file: Some(PathBuf::from("/cache/500_1.png"))
            }
        );
        assert!(table.get(slot(4)).is_none());
    }

    #[test]
    fn test_clear_slot_discards_saved_file() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        let identity = SlotIdentity::from_raw(500, 19).unwrap();
        table.observe(slot(5), &seen(500, 19), abbr, 0, DELAY, &mut queue);
        table.commit_if_current(slot(5), identity, |r| {
            r.succeeded(portrait(), PathBuf::from("/cache/500_2.png"))
        });

        assert_eq!(
            table.clear_slot(slot(5)),
            SlotChange::Cleared {
                discarded_file: Some(PathBuf::from("/cache/500_2.png"))
            }
        );
        assert_eq!(table.clear_slot(slot(5)), SlotChange::Unchanged);
    }

    #[test]
    fn test_empty_name_falls_back() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        let observation = SlotObservation::new(500, 19, "");
        table.observe(slot(0), &observation, abbr, 0, DELAY, &mut queue);
        assert_eq!(table.get(slot(0)).unwrap().display_name(), UNKNOWN_NAME);
    }

    #[test]
    fn test_commit_rejected_after_identity_change() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        let stale = SlotIdentity::from_raw(500, 19).unwrap();
        table.observe(slot(2), &seen(500, 19), abbr, 0, DELAY, &mut queue);
        table.observe(slot(2), &seen(777, 19), abbr, 5, DELAY, &mut queue);

        let applied = table.commit_if_current(slot(2), stale, SlotRecord::failed);

        assert!(!applied);
        assert_eq!(table.get(slot(2)).unwrap().state(), &FetchState::WaitingDelay);
    }

    #[test]
    fn test_clear_all_returns_owned_files() {
        let mut table = SlotTable::new();
        let mut queue = FetchScheduler::new(16);
        let identity = SlotIdentity::from_raw(500, 19).unwrap();
        table.observe(slot(0), &seen(500, 19), abbr, 0, DELAY, &mut queue);
        table.observe(slot(1), &seen(600, 19), abbr, 0, DELAY, &mut queue);
        table.commit_if_current(slot(0), identity, |r| {
            r.succeeded(portrait(), PathBuf::from("/cache/500.png"))
        });

        let files = table.clear_all();

        assert_eq!(files, vec![PathBuf::from("/cache/500.png")]);
        assert_eq!(table.populated(), 0);
    }
}
