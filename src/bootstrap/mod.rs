pub mod config;
pub mod paths;
pub mod runtime;
pub mod startup;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use paths::resolve_config_dir;
pub use runtime::PortraitRuntime;
pub use startup::prepare_storage;
