//! Built-in programs (presets)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MultiChordError;
use crate::params::{OFFSET_DEFAULT, ParameterStore, PitchClass, Slot, VELOCITY_DEFAULT};

/// A named configuration of every offset and velocity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Preset {
    /// Root only
    #[default]
    Default,
    /// Root, major third, fifth
    MajorTriad,
    /// Root, minor third, fifth
    MinorTriad,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::Default, Self::MajorTriad, Self::MinorTriad];

    /// Host program number
    pub fn index(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::MajorTriad => 1,
            Self::MinorTriad => 2,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Program name shown by hosts
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::MajorTriad => "Major triad",
            Self::MinorTriad => "Minor triad",
        }
    }

    /// Accepts the display name, the variant name or the program number,
    /// ignoring case, spaces and underscores.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "0" | "default" => Some(Self::Default),
            "1" | "majortriad" | "major" => Some(Self::MajorTriad),
            "2" | "minortriad" | "minor" => Some(Self::MinorTriad),
            _ => None,
        }
    }

    /// Semitones for slots 1 and 2, `None` for a root-only program
    fn triad(self) -> Option<(f32, f32)> {
        match self {
            Self::Default => None,
            Self::MajorTriad => Some((4.0, 7.0)),
            Self::MinorTriad => Some((3.0, 7.0)),
        }
    }

    /// Overwrite the whole store with this program.
    ///
    /// Every pitch class is reset first, then slots 1 and 2 receive the
    /// triad intervals. Stores with fewer voices simply skip missing slots.
    pub fn apply(self, store: &ParameterStore) {
        let layout = store.layout();
        for pitch_class in PitchClass::all() {
            for slot in layout.slots() {
                store.set_offset(pitch_class, slot, OFFSET_DEFAULT);
                store.set_velocity_scale(pitch_class, slot, VELOCITY_DEFAULT);
            }
            if let Some((third, fifth)) = self.triad() {
                store.set_offset(pitch_class, Slot::new(1), third);
                store.set_offset(pitch_class, Slot::new(2), fifth);
            }
        }
        debug!(program = self.name(), voices = layout.voices(), "Program loaded");
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = MultiChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| MultiChordError::UnknownProgram(s.to_string()))
    }
}
