//! Portrait Stealer Application Orchestration Layer
//!
//! Use cases over the `ps-core` ports: the party slot cache, the render-thread
//! capture bridge, adventurer plate capture and preset export.

pub mod app;
pub mod app_paths;
pub mod deps;
pub mod usecases;

pub use app::PortraitApp;
pub use app_paths::StoragePaths;
pub use deps::AppDeps;
