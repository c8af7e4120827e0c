//! Slot and character identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Number of party slots tracked by the duty slot cache.
pub const SLOT_COUNT: usize = 8;

/// Index of a party slot, always in `0..SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// Returns `None` when `index` is outside `0..SLOT_COUNT`.
    pub fn new(index: usize) -> Option<Self> {
        (index < SLOT_COUNT).then_some(Self(index))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// All slot indices in ascending order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT).map(SlotIndex)
    }
}

impl Display for SlotIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game object id of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Sentinel the host writes into a slot that has no character.
    pub const UNSET: ObjectId = ObjectId(0xE000_0000);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0 && self != Self::UNSET
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class/job category of a character. `0` means "no job".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassJobId(u8);

impl ClassJobId {
    pub fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Display for ClassJobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the character occupying a slot.
///
/// Two identities are equal only if both the object id and the class/job id
/// match, so a job change is treated like a different character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotIdentity {
    pub object_id: ObjectId,
    pub class_job_id: ClassJobId,
}

impl SlotIdentity {
    /// Builds an identity from raw slot values, or `None` when the slot is empty.
    ///
    /// A slot is empty when the object id is `0` or [`ObjectId::UNSET`], or
    /// when the class/job id is `0`.
    pub fn from_raw(object_id: u32, class_job_id: u8) -> Option<Self> {
        let object_id = ObjectId::new(object_id);
        let class_job_id = ClassJobId::new(class_job_id);
        (object_id.is_valid() && class_job_id.is_valid()).then_some(Self {
            object_id,
            class_job_id,
        })
    }
}

impl Display for SlotIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.object_id, self.class_job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index_bounds() {
        assert!(SlotIndex::new(0).is_some());
        assert!(SlotIndex::new(SLOT_COUNT - 1).is_some());
        assert!(SlotIndex::new(SLOT_COUNT).is_none());
        assert_eq!(SlotIndex::all().count(), SLOT_COUNT);
    }

    #[test]
    fn test_identity_absent_for_sentinels() {
        assert!(SlotIdentity::from_raw(0, 19).is_none());
        assert!(SlotIdentity::from_raw(0xE000_0000, 19).is_none());
        assert!(SlotIdentity::from_raw(500, 0).is_none());
        assert!(SlotIdentity::from_raw(500, 19).is_some());
    }

    #[test]
    fn test_identity_equality_requires_both_parts() {
        let a = SlotIdentity::from_raw(500, 19);
        let b = SlotIdentity::from_raw(500, 24);
        let c = SlotIdentity::from_raw(500, 19);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
