use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ids::SlotIdentity;
use crate::portrait::CapturedPortrait;

/// Progress of the full metadata fetch for one slot record.
///
/// `WaitingDelay -> Queued -> Succeeded | Failed`. Both terminal states stay
/// until the slot's identity changes; there is no automatic retry.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    /// Record was just (re)created; waiting for the fetch delay to elapse.
    WaitingDelay,
    /// Enqueued for a full fetch, or being fetched.
    Queued,
    Succeeded {
        portrait: Arc<CapturedPortrait>,
        image_path: PathBuf,
    },
    Failed,
}

/// Cached state of one party slot.
///
/// Records are immutable values: every transition returns a new record that
/// replaces the old one under the slot table's write lock.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRecord {
    identity: SlotIdentity,
    display_name: String,
    job_abbreviation: String,
    created_at_ms: i64,
    last_basic_update_at_ms: i64,
    needs_full_fetch: bool,
    state: FetchState,
}

impl SlotRecord {
    pub fn new(
        identity: SlotIdentity,
        display_name: impl Into<String>,
        job_abbreviation: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            identity,
            display_name: display_name.into(),
            job_abbreviation: job_abbreviation.into(),
            created_at_ms: now_ms,
            last_basic_update_at_ms: now_ms,
            needs_full_fetch: true,
            state: FetchState::WaitingDelay,
        }
    }

    pub fn identity(&self) -> SlotIdentity {
        self.identity
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn job_abbreviation(&self) -> &str {
        &self.job_abbreviation
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    pub fn last_basic_update_at_ms(&self) -> i64 {
        self.last_basic_update_at_ms
    }

    pub fn needs_full_fetch(&self) -> bool {
        self.needs_full_fetch
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// True once the record has waited strictly longer than `fetch_delay_ms`
    /// without a fetch being scheduled.
    pub fn is_due(&self, now_ms: i64, fetch_delay_ms: i64) -> bool {
        self.needs_full_fetch
            && self.state == FetchState::WaitingDelay
            && now_ms - self.last_basic_update_at_ms > fetch_delay_ms
    }

    pub fn queued(&self) -> Self {
        Self {
            needs_full_fetch: false,
            state: FetchState::Queued,
            ..self.clone()
        }
    }

    pub fn succeeded(&self, portrait: Arc<CapturedPortrait>, image_path: PathBuf) -> Self {
        Self {
            needs_full_fetch: false,
            state: FetchState::Succeeded {
                portrait,
                image_path,
            },
            ..self.clone()
        }
    }

    pub fn failed(&self) -> Self {
        Self {
            needs_full_fetch: false,
            state: FetchState::Failed,
            ..self.clone()
        }
    }

    /// Temp image file owned by this record, if any.
    pub fn image_path(&self) -> Option<&Path> {
        match &self.state {
            FetchState::Succeeded { image_path, .. } => Some(image_path),
            _ => None,
        }
    }

    pub fn portrait(&self) -> Option<&Arc<CapturedPortrait>> {
        match &self.state {
            FetchState::Succeeded { portrait, .. } => Some(portrait),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SlotIdentity {
        SlotIdentity::from_raw(500, 19).unwrap()
    }

    #[test]
    fn test_new_record_waits_for_delay() {
        let record = SlotRecord::new(identity(), "Thancred", "GNB", 1_000);
        assert_eq!(record.state(), &FetchState::WaitingDelay);
        assert!(record.needs_full_fetch());
        assert!(!record.is_due(1_750, 750));
        assert!(record.is_due(1_751, 750));
    }

    #[test]
    fn test_queued_is_no_longer_due() {
        let record = SlotRecord::new(identity(), "Thancred", "GNB", 0).queued();
        assert_eq!(record.state(), &FetchState::Queued);
        assert!(!record.is_due(10_000, 750));
    }

    #[test]
    fn test_failed_keeps_identity_and_has_no_file() {
        let record = SlotRecord::new(identity(), "Thancred", "GNB", 0)
            .queued()
            .failed();
        assert_eq!(record.identity(), identity());
        assert_eq!(record.state(), &FetchState::Failed);
        assert!(record.image_path().is_none());
        assert!(record.portrait().is_none());
    }
}
