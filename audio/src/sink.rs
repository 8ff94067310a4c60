//! Playback command interface.
//!
//! A sink owns the actual audio graph (sample buffers, envelopes, panning,
//! effects, output device). The voice pool only issues commands; a sink
//! never reports errors back and must tolerate offsets past the end of a
//! source.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::envelope::Adsr;
use crate::mix::MixParams;

/// Receives playback commands for numbered voices.
pub trait AudioSink: Send + Sync {
    /// Sets up a voice's envelope and static mix. Called once per voice
    /// when the pool is built.
    fn configure(&self, voice: usize, envelope: &Adsr, mix: &MixParams);

    /// Points a voice at `source`, positioned `offset` into it. Any sound
    /// still playing on the voice is cut.
    fn bind(&self, voice: usize, source: &str, offset: Duration);

    /// Opens the voice's envelope.
    fn key_on(&self, voice: usize);

    /// Starts the voice's release phase.
    fn key_off(&self, voice: usize);
}

/// Sink that only logs commands.
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn configure(&self, voice: usize, envelope: &Adsr, mix: &MixParams) {
        info!(voice, ?envelope, pan = mix.pan, send = mix.send, "voice configured");
    }

    fn bind(&self, voice: usize, source: &str, offset: Duration) {
        debug!(voice, source, offset = offset.as_secs_f64(), "bind");
    }

    fn key_on(&self, voice: usize) {
        debug!(voice, "key on");
    }

    fn key_off(&self, voice: usize) {
        debug!(voice, "key off");
    }
}

/// Forwards every command to each wrapped sink, in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AudioSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl AudioSink for FanoutSink {
    fn configure(&self, voice: usize, envelope: &Adsr, mix: &MixParams) {
        for s in &self.sinks {
            s.configure(voice, envelope, mix);
        }
    }

    fn bind(&self, voice: usize, source: &str, offset: Duration) {
        for s in &self.sinks {
            s.bind(voice, source, offset);
        }
    }

    fn key_on(&self, voice: usize) {
        for s in &self.sinks {
            s.key_on(voice);
        }
    }

    fn key_off(&self, voice: usize) {
        for s in &self.sinks {
            s.key_off(voice);
        }
    }
}
