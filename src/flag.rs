use serde::{Serialize, Serializer};
use std::path::Path;

/// Filename token identifying the audio-sensor family.
const AUDIO_MARKER: &str = "raven";

/// Sensor family of a record, serialized as its bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Alpr,
    Audio,
}

impl Flag {
    pub const fn bits(self) -> u32 {
        match self {
            Flag::Alpr => 1 << 13,
            Flag::Audio => 1 << 9,
        }
    }

    /// Resolve the flag for a tabular source from its file name.
    pub fn from_filename(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());

        if name.to_lowercase().contains(AUDIO_MARKER) {
            Flag::Audio
        } else {
            Flag::Alpr
        }
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}
