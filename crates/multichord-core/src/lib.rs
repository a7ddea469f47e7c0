//! multichord-core: per-pitch-class chord expansion for MIDI streams

pub mod error;
pub mod expander;
pub mod midi;
pub mod param_info;
pub mod params;
pub mod plugin;
pub mod program;
pub mod state;

pub use error::{MultiChordError, Result};
pub use expander::{ChordExpander, EventBuffer, EventSink};
pub use midi::MidiEvent;
pub use param_info::{ParamDescriptor, ParamHints, ValueLabel};
pub use params::{DEFAULT_VOICES, ParamKind, ParamLayout, ParameterStore, PitchClass, Slot};
pub use plugin::{MultiChord, PluginInfo};
pub use program::Preset;
pub use state::ParameterSnapshot;
