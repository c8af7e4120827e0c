use thiserror::Error;

use crate::capture::TextureHandle;
use crate::ids::SlotIndex;
use crate::portrait::PortraitData;
use crate::slot::SlotObservation;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SlotReadError {
    /// Reading the host's memory faulted; the data it pointed at is gone.
    #[error("access fault reading slot: {0}")]
    AccessFault(String),

    #[error("slot data source unavailable")]
    Unavailable,

    #[error("invalid slot data: {0}")]
    Invalid(String),
}

/// The host's party-slot data source.
///
/// All methods are called on the host's framework or UI thread.
///
/// # Implementation Notes / 实现说明
///
/// - Every foreign memory read must be guarded and reported as
///   [`SlotReadError::AccessFault`] instead of crashing the host.
/// - `portrait_texture` returns the texture the slot's portrait is currently
///   shown in; the handle is only valid on the render thread.
pub trait SlotSourcePort: Send + Sync {
    /// Whether the party list UI backing the slots currently exists.
    fn is_available(&self) -> bool;

    fn read_slot(&self, slot: SlotIndex) -> Result<SlotObservation, SlotReadError>;

    /// Full portrait export for the character in `slot`.
    fn export_portrait(&self, slot: SlotIndex) -> Result<PortraitData, SlotReadError>;

    fn portrait_texture(&self, slot: SlotIndex) -> Option<TextureHandle>;
}
