//! Port traits implemented by `ps-infra` adapters and by the host.
//!
//! Host-facing ports (`SlotSourcePort`, `PlateSourcePort`, `GpuDevicePort`,
//! `JobCatalogPort`, `OverlayIconPort`) hide every foreign memory read and
//! native device call behind a typed boundary.

pub mod capture;
pub mod clock;
pub mod gpu;
pub mod job_catalog;
pub mod plate_source;
pub mod slot_source;
pub mod storage;

pub use capture::{FrameCapturePort, OverlayIconPort, OverlayKind, PortraitCompositorPort};
pub use clock::ClockPort;
pub use gpu::{GpuDevicePort, MappedRegion, StagingSurface};
pub use job_catalog::{JobCatalogPort, UNKNOWN_JOB};
pub use plate_source::{PlateReadError, PlateSnapshot, PlateSourcePort};
pub use slot_source::{SlotReadError, SlotSourcePort};
pub use storage::{PersistError, PlateCacheRepositoryPort, PortraitStorePort};
