//! Serializable copy of every parameter, for host save/restore

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MultiChordError, Result};
use crate::params::{ParamKind, ParameterStore, PitchClass};

/// Parameter values grouped by kind, each in host index order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub voices: usize,
    pub offsets: Vec<f32>,
    pub velocity_scales: Vec<f32>,
}

impl ParameterSnapshot {
    pub fn capture(store: &ParameterStore) -> Self {
        let layout = store.layout();
        let collect = |kind: ParamKind| {
            PitchClass::all()
                .flat_map(|pc| layout.slots().map(move |slot| (pc, slot)))
                .map(|(pc, slot)| store.value(kind, pc, slot))
                .collect::<Vec<_>>()
        };
        Self {
            voices: store.voices(),
            offsets: collect(ParamKind::Offset),
            velocity_scales: collect(ParamKind::Velocity),
        }
    }

    /// Write every value back. Nothing is written if the shape does not match.
    pub fn restore(&self, store: &ParameterStore) -> Result<()> {
        let layout = store.layout();
        if self.voices != layout.voices() {
            return Err(MultiChordError::VoiceMismatch {
                expected: layout.voices(),
                found: self.voices,
            });
        }
        for (kind, values) in [("offset", &self.offsets), ("velocity", &self.velocity_scales)] {
            if values.len() != layout.half_len() {
                return Err(MultiChordError::ParameterCount {
                    kind,
                    expected: layout.half_len(),
                    found: values.len(),
                });
            }
        }

        let half = layout.half_len() as u32;
        for (i, value) in self.offsets.iter().enumerate() {
            store.set(i as u32, *value);
        }
        for (i, value) in self.velocity_scales.iter().enumerate() {
            store.set(half + i as u32, *value);
        }
        info!(voices = self.voices, "Parameter state restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Slot;
    use crate::program::Preset;

    #[test]
    fn test_capture_follows_index_order() {
        let store = ParameterStore::default();
        Preset::MinorTriad.apply(&store);
        store.set_velocity_scale(PitchClass::new(2).unwrap(), Slot::new(3), 1.5);

        let snapshot = ParameterSnapshot::capture(&store);
        assert_eq!(snapshot.offsets.len(), 48);
        assert_eq!(&snapshot.offsets[..4], &[0.0, 3.0, 7.0, 0.0]);
        assert_eq!(snapshot.velocity_scales[2 * 4 + 3], 1.5);
    }

    #[test]
    fn test_restore_into_fresh_store() {
        let source = ParameterStore::default();
        Preset::MajorTriad.apply(&source);
        source.set_offset(PitchClass::new(11).unwrap(), Slot::new(3), -12.0);
        let json = serde_json::to_string(&ParameterSnapshot::capture(&source)).unwrap();

        let target = ParameterStore::default();
        let snapshot: ParameterSnapshot = serde_json::from_str(&json).unwrap();
        snapshot.restore(&target).unwrap();
        for i in 0..source.len() as u32 {
            assert_eq!(target.get(i), source.get(i));
        }
    }

    #[test]
    fn test_restore_rejects_other_shapes() {
        let store = ParameterStore::default();
        let snapshot = ParameterSnapshot::capture(&ParameterStore::new(3));
        assert_eq!(
            snapshot.restore(&store),
            Err(MultiChordError::VoiceMismatch { expected: 4, found: 3 })
        );

        let mut short = ParameterSnapshot::capture(&store);
        short.velocity_scales.pop();
        store.set(0, 5.0);
        assert_eq!(
            short.restore(&store),
            Err(MultiChordError::ParameterCount { kind: "velocity", expected: 48, found: 47 })
        );
        assert_eq!(store.get(0), 5.0);
    }
}
