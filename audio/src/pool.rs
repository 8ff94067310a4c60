//! Fixed pool of playback voices.
//!
//! Voices are handed out strictly round-robin. The pool does not look at
//! whether the next voice is still sounding: when more triggers are in
//! flight than there are voices, the oldest one is reassigned (voice
//! stealing) and its sound is cut without a release phase.
//!
//! Each trigger spawns a tokio task that holds the voice for `hold`,
//! keying off `release` before the end. Waits are deadlines on the tokio
//! clock, so on a paused runtime the whole schedule is virtual time.
//!
//! Sink commands for a voice are issued while the pool state is locked, so
//! on a multi-thread runtime a stale task can never key off a voice that
//! has already been rebound.

use std::sync::Arc;
use std::time::Duration;

use mosaic_model::{AudioWindow, FileTable};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::envelope::Adsr;
use crate::error::AudioError;
use crate::mix::MixParams;
use crate::sink::AudioSink;

/// Outcome of one playback task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    pub voice: usize,
    /// Per-voice trigger counter; identifies this use of the voice.
    pub generation: u64,
    /// The voice was reassigned before this playback finished.
    pub stolen: bool,
}

/// Handle to an in-flight playback.
pub type PlaybackTask = JoinHandle<Playback>;

struct Slot {
    generation: u64,
    busy: bool,
}

struct PoolState {
    slots: Vec<Slot>,
    cursor: usize,
}

struct PoolInner {
    state: Mutex<PoolState>,
    envelope: Adsr,
    hold: Duration,
    sink: Arc<dyn AudioSink>,
}

/// Round-robin voice allocator. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct VoicePool {
    inner: Arc<PoolInner>,
}

impl VoicePool {
    /// Builds one voice per entry of `mixes` and configures each on the sink.
    ///
    /// `hold` is the total time a trigger occupies its voice, release
    /// included.
    pub fn new(
        mixes: Vec<MixParams>,
        envelope: Adsr,
        hold: Duration,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self, AudioError> {
        if mixes.is_empty() {
            return Err(AudioError::EmptyPool);
        }

        for (voice, mix) in mixes.iter().enumerate() {
            sink.configure(voice, &envelope, mix);
        }
        let slots = mixes
            .iter()
            .map(|_| Slot {
                generation: 0,
                busy: false,
            })
            .collect();

        Ok(Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState { slots, cursor: 0 }),
                envelope,
                hold,
                sink,
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the voice the next trigger will use.
    pub fn cursor(&self) -> usize {
        self.inner.state.lock().cursor
    }

    pub fn envelope(&self) -> &Adsr {
        &self.inner.envelope
    }

    pub fn hold(&self) -> Duration {
        self.inner.hold
    }

    /// Number of voices between trigger and end of release.
    pub fn active(&self) -> usize {
        self.inner.state.lock().slots.iter().filter(|s| s.busy).count()
    }

    /// Plays a library window on the next voice.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self, window: &AudioWindow, files: &FileTable) -> Result<PlaybackTask, AudioError> {
        let index = window.source_file_index();
        let source = files.get(index).ok_or(AudioError::UnknownSource {
            index,
            files: files.len(),
        })?;
        // Out of range offsets saturate; the sink treats them as past the end.
        let offset =
            Duration::try_from_secs_f64(window.start_time().max(0.0)).unwrap_or(Duration::MAX);
        Ok(self.trigger_source(source, offset))
    }

    /// Plays `source` from `offset` on the next voice.
    ///
    /// The voice is bound and keyed on before this returns; the returned
    /// task covers the hold and release phases.
    pub fn trigger_source(&self, source: &str, offset: Duration) -> PlaybackTask {
        let (voice, generation, start) = {
            let mut state = self.inner.state.lock();
            let start = Instant::now();
            let voice = state.cursor;
            state.cursor = (voice + 1) % state.slots.len();

            let slot = &mut state.slots[voice];
            if slot.busy {
                debug!(voice, "stealing voice");
            }
            slot.generation += 1;
            slot.busy = true;
            let generation = slot.generation;

            self.inner.sink.bind(voice, source, offset);
            self.inner.sink.key_on(voice);
            (voice, generation, start)
        };

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let release = inner.envelope.release.min(inner.hold);
            sleep_until(start + (inner.hold - release)).await;
            {
                let state = inner.state.lock();
                if state.slots[voice].generation != generation {
                    return Playback {
                        voice,
                        generation,
                        stolen: true,
                    };
                }
                inner.sink.key_off(voice);
            }

            sleep_until(start + inner.hold).await;
            let mut state = inner.state.lock();
            let slot = &mut state.slots[voice];
            let stolen = slot.generation != generation;
            if !stolen {
                slot.busy = false;
            }
            Playback {
                voice,
                generation,
                stolen,
            }
        })
    }
}
