mod service;

pub use service::{duty_portrait_file_name, DutySlotCacheService};
