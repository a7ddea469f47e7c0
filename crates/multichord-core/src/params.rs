//! Parameter store: per-(pitch class, slot) offsets and velocity scales
//!
//! Every parameter has a stable host index. The table is split in two halves
//! of `12 * voices` entries each:
//!
//! ```text
//! [0, 12N)    offset          index = pitch_class * N + slot
//! [12N, 24N)  velocity scale  index = 12N + pitch_class * N + slot
//! ```
//!
//! [`ParamLayout`] owns that arithmetic; nothing else should compute indices.
//! Values live in relaxed atomics so the control thread can write while the
//! processing thread reads without locking. A reader may observe a mix of old
//! and new values across parameters during a preset load; that is accepted.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Maximum chord voices per pitch class unless configured otherwise
pub const DEFAULT_VOICES: usize = 4;

pub const OFFSET_MIN: f32 = -12.0;
pub const OFFSET_MAX: f32 = 12.0;
pub const OFFSET_DEFAULT: f32 = 0.0;

pub const VELOCITY_MIN: f32 = 0.5;
pub const VELOCITY_MAX: f32 = 2.0;
pub const VELOCITY_DEFAULT: f32 = 1.0;

/// Which half of the parameter table an index lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    /// Semitone offset of a chord voice
    Offset,
    /// Multiplier applied to the incoming velocity
    Velocity,
}

impl ParamKind {
    pub fn default_value(self) -> f32 {
        match self {
            Self::Offset => OFFSET_DEFAULT,
            Self::Velocity => VELOCITY_DEFAULT,
        }
    }

    pub fn range(self) -> (f32, f32) {
        match self {
            Self::Offset => (OFFSET_MIN, OFFSET_MAX),
            Self::Velocity => (VELOCITY_MIN, VELOCITY_MAX),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Offset => "Offset",
            Self::Velocity => "Velocity",
        }
    }

    fn half(self) -> usize {
        match self {
            Self::Offset => 0,
            Self::Velocity => 1,
        }
    }
}

/// A note's identity within the octave (0 = C ... 11 = B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const COUNT: usize = 12;

    const NAMES: [&'static str; 12] =
        ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

    pub fn new(value: u8) -> Option<Self> {
        (usize::from(value) < Self::COUNT).then_some(Self(value))
    }

    pub fn from_note(note: u8) -> Self {
        Self(note % 12)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Pitch class reached by moving `semitones` up (or down) from this one
    pub fn transposed(self, semitones: i32) -> Self {
        Self((i32::from(self.0) + semitones).rem_euclid(12) as u8)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }
}

/// One potential chord voice attached to a pitch class. Slot 0 is the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(usize);

impl Slot {
    pub const ROOT: Slot = Slot(0);

    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_root(self) -> bool {
        self.0 == 0
    }
}

/// Bijection between `(kind, pitch class, slot)` and host parameter indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    voices: usize,
}

impl ParamLayout {
    pub fn new(voices: usize) -> Self {
        Self { voices: voices.max(1) }
    }

    pub fn voices(&self) -> usize {
        self.voices
    }

    /// Parameters per kind
    pub fn half_len(&self) -> usize {
        PitchClass::COUNT * self.voices
    }

    /// Total parameter count (`24 * voices`)
    pub fn param_count(&self) -> usize {
        2 * self.half_len()
    }

    pub fn slots(self) -> impl Iterator<Item = Slot> {
        (0..self.voices).map(Slot)
    }

    /// Host index of a parameter, `None` if the slot does not exist
    pub fn index(&self, kind: ParamKind, pitch_class: PitchClass, slot: Slot) -> Option<u32> {
        if slot.0 >= self.voices {
            return None;
        }
        let idx = kind.half() * self.half_len() + pitch_class.index() * self.voices + slot.0;
        u32::try_from(idx).ok()
    }

    /// Inverse of [`ParamLayout::index`]
    pub fn decode(&self, index: u32) -> Option<(ParamKind, PitchClass, Slot)> {
        let index = index as usize;
        if index >= self.param_count() {
            return None;
        }
        let kind = if index < self.half_len() { ParamKind::Offset } else { ParamKind::Velocity };
        let within = index % self.half_len();
        let pitch_class = PitchClass((within / self.voices) as u8);
        Some((kind, pitch_class, Slot(within % self.voices)))
    }
}

impl Default for ParamLayout {
    fn default() -> Self {
        Self::new(DEFAULT_VOICES)
    }
}

/// Lock-free table of every offset and velocity-scale parameter.
///
/// The store does not clamp values; consumers interpret them.
#[derive(Debug)]
pub struct ParameterStore {
    layout: ParamLayout,
    values: Box<[AtomicU32]>,
}

impl ParameterStore {
    pub fn new(voices: usize) -> Self {
        let layout = ParamLayout::new(voices);
        let values = (0..layout.param_count() as u32)
            .map(|i| {
                let kind = layout.decode(i).map_or(ParamKind::Offset, |(k, _, _)| k);
                AtomicU32::new(kind.default_value().to_bits())
            })
            .collect();
        Self { layout, values }
    }

    pub fn layout(&self) -> ParamLayout {
        self.layout
    }

    pub fn voices(&self) -> usize {
        self.layout.voices()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw read by host index. Unknown indices read as 0.0.
    pub fn get(&self, index: u32) -> f32 {
        self.values
            .get(index as usize)
            .map_or(0.0, |v| f32::from_bits(v.load(Ordering::Relaxed)))
    }

    /// Raw write by host index. Unknown indices are ignored.
    pub fn set(&self, index: u32, value: f32) {
        if let Some(v) = self.values.get(index as usize) {
            v.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn value(&self, kind: ParamKind, pitch_class: PitchClass, slot: Slot) -> f32 {
        self.layout
            .index(kind, pitch_class, slot)
            .map_or(0.0, |i| self.get(i))
    }

    pub fn set_value(&self, kind: ParamKind, pitch_class: PitchClass, slot: Slot, value: f32) {
        if let Some(i) = self.layout.index(kind, pitch_class, slot) {
            self.set(i, value);
        }
    }

    pub fn offset(&self, pitch_class: PitchClass, slot: Slot) -> f32 {
        self.value(ParamKind::Offset, pitch_class, slot)
    }

    pub fn set_offset(&self, pitch_class: PitchClass, slot: Slot, semitones: f32) {
        self.set_value(ParamKind::Offset, pitch_class, slot, semitones);
    }

    pub fn velocity_scale(&self, pitch_class: PitchClass, slot: Slot) -> f32 {
        self.value(ParamKind::Velocity, pitch_class, slot)
    }

    pub fn set_velocity_scale(&self, pitch_class: PitchClass, slot: Slot, scale: f32) {
        self.set_value(ParamKind::Velocity, pitch_class, slot, scale);
    }

    /// Restore every parameter to its default
    pub fn reset(&self) {
        for pitch_class in PitchClass::all() {
            for slot in self.layout.slots() {
                self.set_offset(pitch_class, slot, OFFSET_DEFAULT);
                self.set_velocity_scale(pitch_class, slot, VELOCITY_DEFAULT);
            }
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(DEFAULT_VOICES)
    }
}
