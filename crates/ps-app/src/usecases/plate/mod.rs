mod cache_service;
mod capture_plate;

pub use cache_service::PlateCacheService;
pub use capture_plate::{
    plate_file_name, CaptureAdventurerPlateUseCase, PlateCaptureError, PlateCaptureStatus,
};
