//! Party slot records, their fetch state machine and the fetch queue.

mod record;
mod scheduler;
mod table;

pub use record::{FetchState, SlotRecord};
pub use scheduler::FetchScheduler;
pub use table::{SlotChange, SlotTable, UNKNOWN_NAME};

use crate::ids::SlotIdentity;

/// Raw per-tick reading of a slot as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotObservation {
    pub object_id: u32,
    pub class_job_id: u8,
    pub display_name: String,
}

impl SlotObservation {
    pub fn new(object_id: u32, class_job_id: u8, display_name: impl Into<String>) -> Self {
        Self {
            object_id,
            class_job_id,
            display_name: display_name.into(),
        }
    }

    /// An observation of an empty slot.
    pub fn empty() -> Self {
        Self::new(0, 0, String::new())
    }

    pub fn identity(&self) -> Option<SlotIdentity> {
        SlotIdentity::from_raw(self.object_id, self.class_job_id)
    }
}
