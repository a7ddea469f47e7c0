//! Offline block renderer
//!
//! The calling thread plays the host's control side: it applies automation
//! and slices the session into blocks. A dedicated processing thread plays
//! the audio callback: it runs the plugin on each block into a buffer that
//! was allocated on the control side and hands it straight back.

use std::sync::Arc;
use std::thread;

use anyhow::{Context, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded};
use multichord_core::{EventBuffer, MidiEvent, MultiChord, Preset};
use tracing::{debug, info, warn};

use crate::session::{Automation, Session, TimedEvent};

/// Work handed to the processing thread
struct Block {
    start: u64,
    events: Vec<MidiEvent>,
    output: EventBuffer,
}

/// Result of rendering a whole session
#[derive(Debug, Default)]
pub struct Render {
    pub events: Vec<TimedEvent>,
    pub blocks: usize,
    /// Events lost to full output buffers
    pub dropped: usize,
}

pub struct Engine {
    plugin: Arc<MultiChord>,
    block_size: u32,
}

impl Engine {
    pub fn new(plugin: Arc<MultiChord>, block_size: u32) -> Self {
        Self { plugin, block_size: block_size.max(1) }
    }

    pub fn plugin(&self) -> &Arc<MultiChord> {
        &self.plugin
    }

    pub fn render(&self, session: &Session) -> anyhow::Result<Render> {
        if let Some(name) = &session.program {
            self.plugin.load_preset(name.parse()?);
        }

        let (work_tx, work_rx) = bounded::<Block>(1);
        let (done_tx, done_rx) = bounded::<Block>(1);
        let plugin = self.plugin.clone();
        let worker = thread::Builder::new()
            .name("multichord-process".into())
            .spawn(move || Self::process_loop(plugin, work_rx, done_tx))
            .context("spawning processing thread")?;

        let result = self.drive(session, &work_tx, &done_rx);
        drop(work_tx);
        worker.join().map_err(|_| anyhow!("processing thread panicked"))?;
        result
    }

    fn drive(
        &self,
        session: &Session,
        work_tx: &Sender<Block>,
        done_rx: &Receiver<Block>,
    ) -> anyhow::Result<Render> {
        let block_size = u64::from(self.block_size);
        let mut render = Render::default();
        let mut events = session.events.iter().peekable();
        let mut changes = session.automation.iter().peekable();
        let mut start = 0u64;

        loop {
            // a change never reaches back into a block that began before it
            while let Some(change) = changes.next_if(|c| c.at() <= start) {
                self.apply(change);
            }

            let mut block_events = Vec::new();
            while let Some(event) = events.next_if(|e| e.time.saturating_sub(start) < block_size) {
                let offset = event.time.saturating_sub(start) as u32;
                block_events.push(MidiEvent::from_bytes(offset, &event.data));
            }

            if !block_events.is_empty() {
                let capacity = self.plugin.max_output_len(block_events.len());
                let output = EventBuffer::with_capacity(capacity);
                work_tx
                    .send(Block { start, events: block_events, output })
                    .context("processing thread stopped")?;
                let done = done_rx.recv().context("processing thread stopped")?;

                let dropped = done.output.dropped();
                if dropped > 0 {
                    warn!(block_start = done.start, dropped, "Output buffer overflow");
                }
                render.dropped += dropped;
                let block_start = done.start;
                render.events.extend(
                    done.output.as_slice().iter().map(|e| TimedEvent::from_midi(block_start, e)),
                );
            }
            render.blocks += 1;

            // jump straight to the next block with something in it
            let next_event = events.peek().map(|e| e.time - e.time % block_size);
            let next_change = changes
                .peek()
                .and_then(|c| c.at().div_ceil(block_size).checked_mul(block_size));
            match next_event.into_iter().chain(next_change).min() {
                Some(next) => start = next,
                None => break,
            }
        }

        info!(blocks = render.blocks, events = render.events.len(), "Render finished");
        Ok(render)
    }

    fn apply(&self, change: &Automation) {
        match change {
            Automation::Parameter { at, index, value } => {
                debug!(at, index, value, "Parameter change");
                self.plugin.set_parameter(*index, *value);
            }
            Automation::Program { at, program } => match program.parse::<Preset>() {
                Ok(preset) => {
                    debug!(at, program = preset.name(), "Program change");
                    self.plugin.load_preset(preset);
                }
                Err(e) => warn!(at, error = %e, "Skipping program change"),
            },
        }
    }

    /// Stand-in for the host audio callback: no allocation, no blocking send
    fn process_loop(plugin: Arc<MultiChord>, rx: Receiver<Block>, tx: Sender<Block>) {
        while let Ok(mut block) = rx.recv() {
            block.output.clear();
            plugin.run(&block.events, &mut block.output);
            if tx.try_send(block).is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(json: &str, block_size: u32) -> Render {
        let engine = Engine::new(Arc::new(MultiChord::default()), block_size);
        engine.render(&Session::parse(json).unwrap()).unwrap()
    }

    fn times_and_notes(render: &Render) -> Vec<(u64, u8)> {
        render.events.iter().map(|e| (e.time, e.data[1])).collect()
    }

    #[test]
    fn test_major_triad_across_blocks() {
        let render = render(
            r#"{
                "program": "Major triad",
                "events": [
                    { "time": 10, "data": [144, 60, 100] },
                    { "time": 70, "data": [176, 1, 64] },
                    { "time": 130, "data": [128, 60, 64] }
                ]
            }"#,
            64,
        );
        assert_eq!(
            times_and_notes(&render),
            vec![(10, 60), (10, 64), (10, 67), (70, 1), (130, 60), (130, 64), (130, 67)]
        );
        assert_eq!(render.blocks, 3);
        assert_eq!(render.dropped, 0);
    }

    #[test]
    fn test_automation_applies_from_its_block() {
        let render = render(
            r#"{
                "program": "Default",
                "automation": [
                    { "at": 40, "index": 1, "value": 12.0 },
                    { "at": 200, "program": "Minor triad" }
                ],
                "events": [
                    { "time": 0, "data": [144, 48, 90] },
                    { "time": 100, "data": [144, 48, 90] },
                    { "time": 260, "data": [144, 48, 90] }
                ]
            }"#,
            50,
        );
        // automation lands on the first block boundary at or after `at`:
        // the change at 40 takes effect from the block at 50, so the note at
        // 0 is still a single note and the note at 100 gets the octave
        assert_eq!(
            times_and_notes(&render),
            vec![(0, 48), (100, 48), (100, 60), (260, 48), (260, 51), (260, 55)]
        );
        // blocks at 0, 50, 100, 200 and 250; 150 has nothing to do
        assert_eq!(render.blocks, 5);
    }

    #[test]
    fn test_change_on_block_boundary_applies_to_that_block() {
        let render = render(
            r#"{
                "automation": [{ "at": 64, "program": "Major triad" }],
                "events": [
                    { "time": 63, "data": [144, 60, 100] },
                    { "time": 64, "data": [144, 60, 100] }
                ]
            }"#,
            64,
        );
        assert_eq!(times_and_notes(&render), vec![(63, 60), (64, 60), (64, 64), (64, 67)]);
    }

    #[test]
    fn test_empty_session_renders_one_silent_block() {
        let render = render("{}", 128);
        assert!(render.events.is_empty());
        assert_eq!(render.blocks, 1);
    }

    #[test]
    fn test_far_future_event_skips_empty_blocks() {
        let render = render(
            r#"{
                "events": [
                    { "time": 0, "data": [144, 60, 100] },
                    { "time": 1000000000000, "data": [128, 60, 64] }
                ]
            }"#,
            256,
        );
        assert_eq!(times_and_notes(&render), vec![(0, 60), (1_000_000_000_000, 60)]);
        assert_eq!(render.blocks, 2);
    }

    #[test]
    fn test_event_at_end_of_time() {
        let render = render(
            r#"{
                "automation": [{ "at": 18446744073709551615, "program": "Minor triad" }],
                "events": [{ "time": 18446744073709551615, "data": [144, 60, 100] }]
            }"#,
            256,
        );
        // the change's block boundary lies past u64::MAX, so it never applies
        assert_eq!(times_and_notes(&render), vec![(u64::MAX, 60)]);
        assert_eq!(render.blocks, 2);
    }
}
