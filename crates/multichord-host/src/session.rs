//! Session files: the MIDI input and automation for one offline render

use std::path::Path;

use anyhow::Context;
use multichord_core::{MidiEvent, Preset};
use serde::{Deserialize, Serialize};

/// A MIDI message at an absolute sample time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub time: u64,
    pub data: Vec<u8>,
}

impl TimedEvent {
    pub fn from_midi(block_start: u64, event: &MidiEvent) -> Self {
        Self {
            time: block_start + u64::from(event.sample_offset),
            data: event.bytes().to_vec(),
        }
    }
}

/// A control-thread change, applied before the first block starting at or after `at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Automation {
    Parameter { at: u64, index: u32, value: f32 },
    Program { at: u64, program: String },
}

impl Automation {
    pub fn at(&self) -> u64 {
        match self {
            Self::Parameter { at, .. } | Self::Program { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Program loaded before the first block
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub automation: Vec<Automation>,
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

impl Session {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading session {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing session {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut session: Session = serde_json::from_str(text)?;
        session.validate()?;
        session.events.sort_by_key(|e| e.time);
        session.automation.sort_by_key(Automation::at);
        Ok(session)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.program {
            name.parse::<Preset>()?;
        }
        for change in &self.automation {
            if let Automation::Program { program, .. } = change {
                program.parse::<Preset>()?;
            }
        }
        Ok(())
    }
}
