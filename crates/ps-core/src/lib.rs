//! # ps-core
//!
//! Core domain models and ports for the portrait capture-and-cache pipeline.
//!
//! This crate contains pure domain logic without any infrastructure dependencies:
//! slot identity and fetch state, the capture value objects, the bounded plate
//! cache list, the preset string codec and the port traits implemented by
//! `ps-infra` and by the host.

pub mod capture;
pub mod config;
pub mod ids;
pub mod plate;
pub mod portrait;
pub mod ports;
pub mod preset;
pub mod slot;

pub use capture::{CaptureError, PixelFormat, TextureDesc, TextureHandle, TextureLease};
pub use config::PortraitConfig;
pub use ids::{ClassJobId, ObjectId, SlotIdentity, SlotIndex, SLOT_COUNT};
pub use plate::{CachedEntry, PlateCache};
pub use portrait::{CapturedPortrait, PortraitImage, PortraitPose};
pub use slot::{FetchScheduler, FetchState, SlotRecord, SlotTable};
