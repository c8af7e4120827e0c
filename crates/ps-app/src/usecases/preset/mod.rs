use std::sync::Arc;

use ps_core::ports::PlateSourcePort;
use ps_core::preset::encode_preset;
use ps_core::CapturedPortrait;
use tracing::debug;

/// Use case for exporting a captured portrait as a preset string
/// 将捕获的肖像导出为预设字符串的用例
pub struct GeneratePresetString {
    plate_source: Arc<dyn PlateSourcePort>,
}

impl GeneratePresetString {
    pub fn new(plate_source: Arc<dyn PlateSourcePort>) -> Self {
        Self { plate_source }
    }

    /// Encodes the pose, frame and decoration of `portrait`.
    ///
    /// Presets of another player's portrait still encode, but poses tied to
    /// gear or emotes the local character lacks will not apply in game.
    pub fn execute(&self, portrait: &CapturedPortrait) -> String {
        if let (Some(owner), Some(local)) =
            (portrait.player_name(), self.plate_source.local_player_name())
        {
            if owner != local {
                debug!(owner, "Generating preset from another player's portrait");
            }
        }
        encode_preset(portrait)
    }
}
