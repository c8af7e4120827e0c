use async_trait::async_trait;
use thiserror::Error;

use crate::capture::TextureHandle;
use crate::portrait::PortraitData;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlateReadError {
    #[error("adventurer plate is not open")]
    NotOpen,

    #[error("adventurer plate portrait texture is not loaded")]
    TextureMissing,

    #[error("access fault reading adventurer plate: {0}")]
    AccessFault(String),
}

/// Everything read from an open adventurer plate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateSnapshot {
    pub data: PortraitData,
    pub player_name: String,
    pub texture: TextureHandle,
}

/// The host's adventurer plate window.
///
/// `read_plate` is async because implementations marshal the read onto the
/// host's framework thread.
#[async_trait]
pub trait PlateSourcePort: Send + Sync {
    async fn read_plate(&self) -> Result<PlateSnapshot, PlateReadError>;

    fn local_player_name(&self) -> Option<String>;
}
