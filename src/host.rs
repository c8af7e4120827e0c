use std::sync::Arc;

use ps_core::ports::{
    GpuDevicePort, JobCatalogPort, OverlayIconPort, PlateSourcePort, SlotSourcePort,
};

/// Ports implemented by the game host.
///
/// Every foreign memory read and native graphics call lives behind one of
/// these; the plugin never touches host memory directly.
pub struct HostServices {
    pub slot_source: Arc<dyn SlotSourcePort>,
    pub plate_source: Arc<dyn PlateSourcePort>,
    pub gpu_device: Arc<dyn GpuDevicePort>,
    /// Raw job sheet lookup; wrapped in a memoizing catalog at startup.
    pub job_sheet: Arc<dyn JobCatalogPort>,
    pub overlay_icons: Arc<dyn OverlayIconPort>,
}
