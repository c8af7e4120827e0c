pub mod capture;
pub mod duty_slots;
pub mod plate;
pub mod preset;

pub use capture::{CaptureTicket, RenderThreadBridge};
pub use duty_slots::DutySlotCacheService;
pub use plate::{CaptureAdventurerPlateUseCase, PlateCacheService, PlateCaptureError};
pub use preset::GeneratePresetString;

use chrono::{DateTime, TimeZone, Utc};

/// Wall-clock time for a clock reading, falling back to now for readings
/// outside chrono's range.
pub(crate) fn datetime_from_ms(now_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(now_ms)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
pub(crate) mod test_support;
