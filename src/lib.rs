//! Portrait Stealer plugin entry points.
//!
//! The host implements the ports in [`host::HostServices`] and drives a
//! [`bootstrap::PortraitRuntime`] from its framework, render and UI threads.

pub mod bootstrap;
pub mod host;

pub use bootstrap::PortraitRuntime;
pub use host::HostServices;
