//! Raw MIDI channel-voice events

use serde::{Deserialize, Serialize};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;

/// A MIDI message positioned inside a processing block.
///
/// Messages are kept as raw bytes so anything the expander does not
/// understand can be forwarded untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiEvent {
    /// Offset in samples from the start of the block
    pub sample_offset: u32,
    /// Number of meaningful bytes in `data`
    pub size: u8,
    pub data: [u8; 4],
}

impl MidiEvent {
    /// Build an event from up to four raw bytes; extra bytes are ignored.
    pub fn from_bytes(sample_offset: u32, bytes: &[u8]) -> Self {
        let size = bytes.len().min(4);
        let mut data = [0; 4];
        data[..size].copy_from_slice(&bytes[..size]);
        Self { sample_offset, size: size as u8, data }
    }

    pub fn note_on(sample_offset: u32, channel: u8, note: u8, velocity: u8) -> Self {
        let status = NOTE_ON | (channel & 0x0F);
        Self::from_bytes(sample_offset, &[status, note & 0x7F, velocity & 0x7F])
    }

    pub fn note_off(sample_offset: u32, channel: u8, note: u8, velocity: u8) -> Self {
        let status = NOTE_OFF | (channel & 0x0F);
        Self::from_bytes(sample_offset, &[status, note & 0x7F, velocity & 0x7F])
    }

    pub fn control_change(sample_offset: u32, channel: u8, controller: u8, value: u8) -> Self {
        let status = CONTROL_CHANGE | (channel & 0x0F);
        Self::from_bytes(sample_offset, &[status, controller & 0x7F, value & 0x7F])
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data[..usize::from(self.size).min(4)]
    }

    pub fn status(&self) -> u8 {
        self.data[0]
    }

    pub fn channel(&self) -> u8 {
        self.data[0] & 0x0F
    }

    /// Note-on or note-off with a complete three-byte payload.
    /// Masking with 0xE0 matches both 0x8n and 0x9n.
    pub fn is_note(&self) -> bool {
        self.size > 2 && (self.data[0] & 0xE0) == NOTE_OFF
    }

    pub fn is_note_on(&self) -> bool {
        self.size > 2 && (self.data[0] & 0xF0) == NOTE_ON
    }

    pub fn note(&self) -> u8 {
        self.data[1]
    }

    pub fn velocity(&self) -> u8 {
        self.data[2]
    }

    /// Same message and position with note number and velocity replaced
    pub fn with_note(&self, note: u8, velocity: u8) -> Self {
        let mut event = *self;
        event.data[1] = note;
        event.data[2] = velocity;
        event
    }
}
