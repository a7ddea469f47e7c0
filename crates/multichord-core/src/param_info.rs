//! Host-facing parameter descriptions

use serde::{Deserialize, Serialize};

use crate::params::{ParamKind, ParamLayout, PitchClass, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParamHints {
    pub automatable: bool,
    pub integer: bool,
}

/// A named point on an enumerated parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLabel {
    pub value: f32,
    pub label: String,
}

/// Everything a host needs to present one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub index: u32,
    pub kind: ParamKind,
    pub pitch_class: PitchClass,
    pub slot: Slot,
    pub name: String,
    pub symbol: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub hints: ParamHints,
    /// Offsets only: one label per semitone, restricted to these values
    pub value_labels: Vec<ValueLabel>,
}

impl ParamDescriptor {
    /// `None` for indices outside the layout
    pub fn for_index(layout: &ParamLayout, index: u32) -> Option<Self> {
        let (kind, pitch_class, slot) = layout.decode(index)?;
        let name = format!("{} {}{}", kind.label(), pitch_class.name(), slot.index() + 1);
        let symbol = symbol_for(&name);
        let (min, max) = kind.range();
        let (hints, value_labels) = match kind {
            ParamKind::Offset => (
                ParamHints { automatable: true, integer: true },
                offset_labels(pitch_class),
            ),
            ParamKind::Velocity => (ParamHints { automatable: true, integer: false }, Vec::new()),
        };

        Some(Self {
            index,
            kind,
            pitch_class,
            slot,
            name,
            symbol,
            min,
            max,
            default: kind.default_value(),
            hints,
            value_labels,
        })
    }

    pub fn all(layout: &ParamLayout) -> Vec<Self> {
        (0..layout.param_count() as u32)
            .filter_map(|index| Self::for_index(layout, index))
            .collect()
    }

    /// Clamp (and for offsets, round) a value into this parameter's domain
    pub fn constrain(&self, value: f32) -> f32 {
        let value = if self.hints.integer { value.round() } else { value };
        value.clamp(self.min, self.max)
    }
}

/// Lowercase, spaces to `_`, `#` to `s`
fn symbol_for(name: &str) -> String {
    name.replace('#', "s").replace(' ', "_").to_lowercase()
}

/// Labels for -12..=+12 naming the pitch class each offset lands on
fn offset_labels(root: PitchClass) -> Vec<ValueLabel> {
    (-12..=12)
        .map(|semitones: i32| {
            let sign = match semitones.signum() {
                -1 => "-",
                1 => "+",
                _ => "",
            };
            ValueLabel {
                value: semitones as f32,
                label: format!("{sign}{}", root.transposed(semitones).name()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_names_and_symbols() {
        let layout = ParamLayout::default();
        let first = ParamDescriptor::for_index(&layout, 0).unwrap();
        assert_eq!(first.name, "Offset C1");
        assert_eq!(first.symbol, "offset_c1");

        let c_sharp_2 = ParamDescriptor::for_index(&layout, 5).unwrap();
        assert_eq!(c_sharp_2.name, "Offset C#2");
        assert_eq!(c_sharp_2.symbol, "offset_cs2");

        let last = ParamDescriptor::for_index(&layout, 95).unwrap();
        assert_eq!(last.name, "Velocity B4");
        assert_eq!(last.symbol, "velocity_b4");
        assert!(ParamDescriptor::for_index(&layout, 96).is_none());
    }

    #[test]
    fn test_symbols_are_unique() {
        let all = ParamDescriptor::all(&ParamLayout::default());
        assert_eq!(all.len(), 96);
        let symbols: HashSet<_> = all.iter().map(|d| d.symbol.as_str()).collect();
        assert_eq!(symbols.len(), 96);
    }

    #[test]
    fn test_domains_and_hints() {
        let layout = ParamLayout::default();
        let offset = ParamDescriptor::for_index(&layout, 10).unwrap();
        assert_eq!((offset.min, offset.max, offset.default), (-12.0, 12.0, 0.0));
        assert!(offset.hints.integer && offset.hints.automatable);

        let velocity = ParamDescriptor::for_index(&layout, 58).unwrap();
        assert_eq!((velocity.min, velocity.max, velocity.default), (0.5, 2.0, 1.0));
        assert!(!velocity.hints.integer);
        assert!(velocity.value_labels.is_empty());
    }

    #[test]
    fn test_offset_labels_name_target_note() {
        let layout = ParamLayout::default();
        // index 4 = C#, slot 0
        let labels = ParamDescriptor::for_index(&layout, 4).unwrap().value_labels;
        assert_eq!(labels.len(), 25);
        assert_eq!(labels[0].label, "-C#");
        assert_eq!(labels[11].label, "-C");
        assert_eq!(labels[13].label, "+D");
        assert_eq!(labels[12].label, "C#");
        assert_eq!(labels[16].value, 4.0);
        assert_eq!(labels[16].label, "+F");
        assert_eq!(labels[24].label, "+C#");
    }

    #[test]
    fn test_constrain() {
        let layout = ParamLayout::default();
        let offset = ParamDescriptor::for_index(&layout, 1).unwrap();
        assert_eq!(offset.constrain(3.6), 4.0);
        assert_eq!(offset.constrain(-40.0), -12.0);
        let velocity = ParamDescriptor::for_index(&layout, 49).unwrap();
        assert_eq!(velocity.constrain(0.1), 0.5);
        assert_eq!(velocity.constrain(1.25), 1.25);
    }
}
