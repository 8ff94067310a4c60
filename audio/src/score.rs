//! Timestamped record of playback commands.
//!
//! [`ScoreSink`] stamps every command with the tokio clock, so a run on a
//! paused runtime produces a deterministic score. A [`Score`] can be saved
//! as JSON lines and rendered offline by [`Renderer`](crate::Renderer).

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::envelope::Adsr;
use crate::error::AudioError;
use crate::mix::MixParams;
use crate::sink::AudioSink;

/// A single playback command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Configure { envelope: Adsr, mix: MixParams },
    /// `offset` in seconds.
    Bind { source: String, offset: f64 },
    KeyOn,
    KeyOff,
}

/// A command stamped with its time in seconds since the sink was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub at: f64,
    pub voice: usize,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// One triggered fragment reconstructed from a score.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub voice: usize,
    pub source: String,
    /// Seconds into the source.
    pub offset: f64,
    pub on: Option<f64>,
    pub off: Option<f64>,
    /// Time the voice was rebound to another fragment.
    pub cut: Option<f64>,
}

impl Note {
    /// Time the note falls silent: at the end of its release or when its
    /// voice is stolen, whichever comes first. `None` while neither has
    /// happened.
    pub fn end(&self, release: Duration) -> Option<f64> {
        let released = self.off.map(|off| off + release.as_secs_f64());
        match (released, self.cut) {
            (Some(r), Some(c)) => Some(r.min(c)),
            (r, c) => r.or(c),
        }
    }
}

/// Ordered list of playback commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    events: Vec<ScoreEvent>,
}

impl Score {
    pub fn new(events: Vec<ScoreEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[ScoreEvent] {
        &self.events
    }

    /// Envelope and mix of every configured voice.
    pub fn setups(&self) -> HashMap<usize, (Adsr, MixParams)> {
        self.events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Configure { envelope, mix } => Some((e.voice, (*envelope, *mix))),
                _ => None,
            })
            .collect()
    }

    /// Reconstructs notes in trigger order. Rebinding a voice cuts the
    /// note it was playing.
    pub fn notes(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = Vec::new();
        let mut open: HashMap<usize, usize> = HashMap::new();

        for e in &self.events {
            match &e.kind {
                EventKind::Bind { source, offset } => {
                    if let Some(prev) = open.insert(e.voice, notes.len()) {
                        notes[prev].cut.get_or_insert(e.at);
                    }
                    notes.push(Note {
                        voice: e.voice,
                        source: source.clone(),
                        offset: *offset,
                        on: None,
                        off: None,
                        cut: None,
                    });
                }
                EventKind::KeyOn => {
                    if let Some(&i) = open.get(&e.voice) {
                        notes[i].on.get_or_insert(e.at);
                    }
                }
                EventKind::KeyOff => {
                    if let Some(&i) = open.get(&e.voice) {
                        notes[i].off.get_or_insert(e.at);
                    }
                }
                EventKind::Configure { .. } => {}
            }
        }

        notes
    }

    /// Writes one JSON object per line.
    pub fn write_jsonl<W: Write>(&self, mut w: W) -> Result<(), AudioError> {
        for e in &self.events {
            serde_json::to_writer(&mut w, e)?;
            w.write_all(b"\n")?;
        }
        w.flush()?;
        Ok(())
    }

    /// Reads a score written by [`Score::write_jsonl`]. Blank lines are skipped.
    pub fn read_jsonl<R: BufRead>(r: R) -> Result<Self, AudioError> {
        let mut events = Vec::new();
        for line in r.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(Self { events })
    }
}

/// Sink that records every command against the tokio clock.
pub struct ScoreSink {
    origin: Instant,
    events: Mutex<Vec<ScoreEvent>>,
}

impl ScoreSink {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn score(&self) -> Score {
        Score::new(self.events.lock().clone())
    }

    fn record(&self, voice: usize, kind: EventKind) {
        let at = self.origin.elapsed().as_secs_f64();
        self.events.lock().push(ScoreEvent { at, voice, kind });
    }
}

impl Default for ScoreSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for ScoreSink {
    fn configure(&self, voice: usize, envelope: &Adsr, mix: &MixParams) {
        self.record(
            voice,
            EventKind::Configure {
                envelope: *envelope,
                mix: *mix,
            },
        );
    }

    fn bind(&self, voice: usize, source: &str, offset: Duration) {
        self.record(
            voice,
            EventKind::Bind {
                source: source.to_string(),
                offset: offset.as_secs_f64(),
            },
        );
    }

    fn key_on(&self, voice: usize) {
        self.record(voice, EventKind::KeyOn);
    }

    fn key_off(&self, voice: usize) {
        self.record(voice, EventKind::KeyOff);
    }
}
