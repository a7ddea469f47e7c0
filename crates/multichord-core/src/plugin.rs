//! Plugin instance: the parameter, program and event surfaces a host sees

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::Result;
use crate::expander::{ChordExpander, EventSink};
use crate::midi::MidiEvent;
use crate::param_info::ParamDescriptor;
use crate::params::{DEFAULT_VOICES, ParameterStore};
use crate::program::Preset;
use crate::state::ParameterSnapshot;

/// Static plugin description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub maker: &'static str,
    pub home_page: &'static str,
    pub license: &'static str,
    /// (major, minor, patch)
    pub version: (u8, u8, u8),
    pub unique_id: i64,
}

const fn unique_id() -> i64 {
    let vendor =
        ((b'r' as i64) << 24) | ((b'i' as i64) << 16) | ((b'b' as i64) << 8) | (b'a' as i64);
    (vendor << 32) | ((b'n' as i64) << 24) | 1
}

pub const INFO: PluginInfo = PluginInfo {
    label: "MultiChord",
    description: "Plays a different chord for each note of the octave",
    maker: "riban",
    home_page: "https://github.com/riban-bw/lv2",
    license: "ISC",
    version: (1, 0, 0),
    unique_id: unique_id(),
};

/// One plugin instance.
///
/// Control-side methods (`set_parameter`, `load_program`, ...) and [`MultiChord::run`]
/// all take `&self` and may be called from different threads at once.
#[derive(Debug)]
pub struct MultiChord {
    store: Arc<ParameterStore>,
    expander: ChordExpander,
    program: AtomicU32,
}

impl MultiChord {
    pub fn new(voices: usize) -> Self {
        let store = Arc::new(ParameterStore::new(voices));
        Self {
            expander: ChordExpander::new(store.clone()),
            store,
            program: AtomicU32::new(Preset::Default.index()),
        }
    }

    pub fn info(&self) -> &'static PluginInfo {
        &INFO
    }

    pub fn voices(&self) -> usize {
        self.store.voices()
    }

    /// Shared handle for a control thread
    pub fn store(&self) -> Arc<ParameterStore> {
        self.store.clone()
    }

    // Parameters

    pub fn parameter_count(&self) -> usize {
        self.store.len()
    }

    pub fn parameter_descriptor(&self, index: u32) -> Option<ParamDescriptor> {
        ParamDescriptor::for_index(&self.store.layout(), index)
    }

    pub fn parameter(&self, index: u32) -> f32 {
        self.store.get(index)
    }

    pub fn set_parameter(&self, index: u32, value: f32) {
        self.store.set(index, value);
    }

    // Programs

    pub fn program_count(&self) -> usize {
        Preset::ALL.len()
    }

    pub fn program_name(&self, index: u32) -> Option<&'static str> {
        Preset::from_index(index).map(Preset::name)
    }

    /// Last program loaded (parameters may have been edited since)
    pub fn current_program(&self) -> Preset {
        Preset::from_index(self.program.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Load a program by host number; unknown numbers are ignored
    pub fn load_program(&self, index: u32) {
        if let Some(preset) = Preset::from_index(index) {
            self.load_preset(preset);
        }
    }

    pub fn load_preset(&self, preset: Preset) {
        preset.apply(&self.store);
        self.program.store(preset.index(), Ordering::Relaxed);
    }

    // State

    pub fn save_state(&self) -> ParameterSnapshot {
        ParameterSnapshot::capture(&self.store)
    }

    pub fn restore_state(&self, snapshot: &ParameterSnapshot) -> Result<()> {
        snapshot.restore(&self.store)
    }

    // Processing

    /// Upper bound on output events for an input block of `events` events
    pub fn max_output_len(&self, events: usize) -> usize {
        events * self.expander.max_outputs_per_event()
    }

    /// Process one block of events. Safe to call from the audio thread.
    pub fn run<S: EventSink + ?Sized>(&self, events: &[MidiEvent], out: &mut S) -> usize {
        self.expander.process(events, out)
    }
}

impl Default for MultiChord {
    fn default() -> Self {
        Self::new(DEFAULT_VOICES)
    }
}
