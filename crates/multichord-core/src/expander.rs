//! Chord expander: one incoming note becomes up to `voices` outgoing notes
//!
//! Runs on the processing thread. Nothing here allocates, locks or logs; the
//! caller provides the output sink.

use std::sync::Arc;

use crate::midi::MidiEvent;
use crate::params::{ParameterStore, PitchClass, Slot};

/// Destination for expanded events
pub trait EventSink {
    fn push(&mut self, event: MidiEvent);
}

impl EventSink for Vec<MidiEvent> {
    fn push(&mut self, event: MidiEvent) {
        Vec::push(self, event);
    }
}

/// Fixed-capacity output buffer for the processing thread.
///
/// Capacity is reserved up front; pushes beyond it are dropped and counted
/// instead of growing the allocation.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    events: Vec<MidiEvent>,
    limit: usize,
    dropped: usize,
}

impl EventBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { events: Vec::with_capacity(capacity), limit: capacity, dropped: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events that did not fit since the last [`EventBuffer::clear`]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn as_slice(&self) -> &[MidiEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }
}

impl EventSink for EventBuffer {
    fn push(&mut self, event: MidiEvent) {
        if self.events.len() < self.limit {
            self.events.push(event);
        } else {
            self.dropped += 1;
        }
    }
}

/// Reads offsets and velocity scales from a shared store and writes chords
#[derive(Debug, Clone)]
pub struct ChordExpander {
    store: Arc<ParameterStore>,
}

impl ChordExpander {
    pub fn new(store: Arc<ParameterStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    /// Most events a single input can produce
    pub fn max_outputs_per_event(&self) -> usize {
        self.store.voices()
    }

    /// Expand one event into `out`, returning how many events were written.
    ///
    /// Non-note events (and short messages) are forwarded unchanged. For a
    /// note, each slot is emitted in ascending order unless:
    /// - it is not the root and its offset equals the root slot's offset
    /// - the transposed note leaves 0..=127
    /// - the scaled velocity rounds below 1
    pub fn expand<S: EventSink + ?Sized>(&self, event: &MidiEvent, out: &mut S) -> usize {
        if !event.is_note() {
            out.push(*event);
            return 1;
        }

        let root = event.note();
        let pitch_class = PitchClass::from_note(root);
        let base_velocity = f32::from(event.velocity());
        let root_offset = self.store.offset(pitch_class, Slot::ROOT) as i32;

        let mut written = 0;
        for slot in self.store.layout().slots() {
            let offset = self.store.offset(pitch_class, slot) as i32;
            if !slot.is_root() && offset == root_offset {
                continue;
            }

            // offsets are not clamped by the store, so the sum can overflow
            let Some(note) = i32::from(root).checked_add(offset) else {
                continue;
            };
            if !(0..=127).contains(&note) {
                continue;
            }

            let scale = self.store.velocity_scale(pitch_class, slot);
            let velocity = (scale * base_velocity).round_ties_even();
            // NaN fails this comparison too
            if !(velocity >= 1.0) {
                continue;
            }
            let velocity = velocity.min(127.0) as u8;

            out.push(event.with_note(note as u8, velocity));
            written += 1;
        }
        written
    }

    /// Expand a whole block, preserving event order
    pub fn process<S: EventSink + ?Sized>(&self, events: &[MidiEvent], out: &mut S) -> usize {
        events.iter().map(|event| self.expand(event, out)).sum()
    }
}
