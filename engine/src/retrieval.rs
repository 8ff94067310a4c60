//! The decision loop: aggregate frames, search, trigger, repeat.
//!
//! The loop keeps its own deadline, advanced by one hop per consumed frame
//! and by the pacing delay between triggers of one cycle. Every wait is a
//! `sleep_until` on that deadline, so lateness in one cycle never
//! accumulates into the next.

use std::sync::Arc;

use mosaic_audio::{AudioSink, MixParams, Playback, PlaybackTask, VoicePool};
use mosaic_model::ModelStore;
use mosaic_vecstore::{MemoryIndex, VecIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::aggregator::FeatureAggregator;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::selector::Selector;
use crate::source::FrameSource;

/// Counters reported when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Completed decision cycles.
    pub cycles: u64,
    /// Voice triggers issued.
    pub triggers: u64,
    /// Playbacks cut short by voice stealing.
    pub stolen: u64,
}

impl LoopStats {
    fn record(&mut self, playback: Playback) {
        if playback.stolen {
            self.stolen += 1;
        }
    }
}

pub struct RetrievalLoop<I: VecIndex = MemoryIndex> {
    store: Arc<ModelStore>,
    index: I,
    pool: VoicePool,
    config: EngineConfig,
    selector: Selector,
}

impl RetrievalLoop<MemoryIndex> {
    /// Trains an exact index over `store`, allocates the voice pool on
    /// `sink` and returns a loop ready to run.
    ///
    /// Voice pans are drawn once from `[-pan_spread, pan_spread]`.
    pub fn build(
        store: ModelStore,
        config: EngineConfig,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self, EngineError> {
        config.validate(store.num_points())?;

        let ids: Vec<usize> = store.windows().iter().map(|w| w.uid()).collect();
        let rows: Vec<&[f32]> = store.matrix().rows().collect();
        let mut index = MemoryIndex::new(config.metric);
        index.train(&ids, &rows)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        // pans are clamped to [-1, 1] anyway
        let spread = config.pan_spread.min(1.0);
        let mixes = (0..config.voices)
            .map(|_| MixParams::new(rng.gen_range(-spread..=spread), config.send))
            .collect();
        let pool = VoicePool::new(mixes, config.adsr(), config.hold(), sink)?;

        Self::new(store, index, pool, config)
    }
}

impl<I: VecIndex> RetrievalLoop<I> {
    /// Assembles a loop from a trained index and an allocated pool.
    ///
    /// The index must cover exactly the store's windows.
    pub fn new(
        store: impl Into<Arc<ModelStore>>,
        index: I,
        pool: VoicePool,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let store = store.into();
        config.validate(store.num_points())?;
        if index.len() != store.num_points() || index.dim() != store.num_coeffs() {
            return Err(EngineError::InvalidConfig(format!(
                "index holds {} points of dim {}, model has {} of dim {}",
                index.len(),
                index.dim(),
                store.num_points(),
                store.num_coeffs()
            )));
        }

        let selector = Selector::new(config.selection, config.seed);
        Ok(Self {
            store,
            index,
            pool,
            config,
            selector,
        })
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs until `source` is exhausted, then waits for every playback to
    /// finish.
    ///
    /// A source whose dimensionality differs from the model fails before
    /// anything is searched or played. A trailing partial window is
    /// discarded.
    pub async fn run<S>(&mut self, source: &mut S) -> Result<LoopStats, EngineError>
    where
        S: FrameSource + ?Sized,
    {
        let dims = source.dims();
        if dims != self.store.num_coeffs() {
            return Err(EngineError::DimensionMismatch {
                model: self.store.num_coeffs(),
                analyzer: dims,
            });
        }

        let hop = self.config.hop();
        let spacing = self.config.trigger_spacing();
        let mut aggregator = FeatureAggregator::new(self.config.num_frames, dims);
        let mut stats = LoopStats::default();
        let mut tasks: Vec<PlaybackTask> = Vec::new();
        let mut clock = Instant::now();

        info!(
            points = self.store.num_points(),
            dims,
            voices = self.pool.len(),
            k = self.config.k,
            "retrieval loop started"
        );

        'cycles: loop {
            while !aggregator.is_full() {
                let Some(frame) = source.next_frame().await else {
                    break 'cycles;
                };
                aggregator.push_frame(&frame)?;
                clock += hop;
                sleep_until(clock).await;
            }

            let query = aggregator.mean()?;
            let matches = self.index.search(&query, self.config.k)?;
            stats.cycles += 1;
            debug!(
                cycle = stats.cycles,
                nearest = matches.first().map(|m| m.id),
                distance = matches.first().map(|m| m.distance),
                "window matched"
            );

            for nth in 0..self.config.triggers_per_cycle {
                if nth > 0 {
                    clock += spacing;
                    sleep_until(clock).await;
                }
                let Some(id) = self.selector.pick(&matches, nth) else {
                    break;
                };
                let window = self.store.window(id).ok_or(EngineError::UnknownWindow(id))?;
                tasks.push(self.pool.trigger(window, self.store.files())?);
                stats.triggers += 1;
            }

            let (done, pending): (Vec<_>, Vec<_>) =
                tasks.drain(..).partition(|t| t.is_finished());
            tasks = pending;
            for task in done {
                stats.record(task.await?);
            }
        }

        if !aggregator.is_empty() {
            debug!(frames = aggregator.len(), "discarding partial window");
        }
        for task in tasks {
            stats.record(task.await?);
        }

        info!(
            cycles = stats.cycles,
            triggers = stats.triggers,
            stolen = stats.stolen,
            "retrieval loop finished"
        );
        Ok(stats)
    }
}
