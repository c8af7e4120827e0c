//! # Application Dependencies / 应用依赖
//!
//! Dependency grouping for [`crate::PortraitApp`] construction.
//! 此模块定义 PortraitApp 构造的依赖分组。
//!
//! **Note / 注意**: This is NOT a Builder pattern.
//! **这不是 Builder 模式。**
//! - No build steps / 无构建步骤
//! - No default values / 无默认值
//! - Just parameter grouping / 仅用于参数打包

use std::sync::Arc;

use ps_core::ports::*;

/// Application dependency grouping (non-Builder, just parameter grouping)
/// 应用依赖分组（非 Builder，仅参数打包）
///
/// All dependencies are required - no defaults, no optional fields.
/// 所有依赖都是必需的 - 无默认值，无可选字段。
pub struct AppDeps {
    // Host data sources / 宿主数据源
    pub slot_source: Arc<dyn SlotSourcePort>,
    pub plate_source: Arc<dyn PlateSourcePort>,
    pub job_catalog: Arc<dyn JobCatalogPort>,

    // Capture dependencies / 捕获依赖
    pub gpu_device: Arc<dyn GpuDevicePort>,
    pub frame_capture: Arc<dyn FrameCapturePort>,
    pub compositor: Arc<dyn PortraitCompositorPort>,

    // Storage dependencies / 存储依赖
    pub store: Arc<dyn PortraitStorePort>,
    pub plate_repository: Arc<dyn PlateCacheRepositoryPort>,

    // System dependencies / 系统依赖
    pub clock: Arc<dyn ClockPort>,
}
