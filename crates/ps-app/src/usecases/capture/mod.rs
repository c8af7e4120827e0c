mod render_bridge;

pub use render_bridge::{CaptureTicket, RenderThreadBridge};
