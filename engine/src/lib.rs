//! Real-time matching and playback loop for concatenative synthesis.
//!
//! Each decision cycle pulls `num_frames` analysis frames from a
//! [`FrameSource`], averages them with a [`FeatureAggregator`], looks up the
//! `k` nearest library windows and triggers one or more of them on the
//! voice pool. All waiting happens on the tokio clock: a paused runtime
//! renders a finite input in virtual time, a normal runtime follows a live
//! input on the wall clock.
//!
//! # Example
//!
//! ```rust,no_run
//! use mosaic_audio::ScoreSink;
//! use mosaic_engine::{EngineConfig, RetrievalLoop, VecSource};
//! use mosaic_model::ModelStore;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ModelStore::load("model.txt")?;
//! let dims = store.num_coeffs();
//! let sink = Arc::new(ScoreSink::new());
//! let mut engine = RetrievalLoop::build(store, EngineConfig::default(), sink.clone())?;
//!
//! let mut source = VecSource::new(dims, vec![vec![0.0; dims]; 64]);
//! let stats = engine.run(&mut source).await?;
//! println!("{} cycles, {} triggers", stats.cycles, stats.triggers);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod retrieval;
pub mod selector;
pub mod source;

pub use aggregator::FeatureAggregator;
pub use config::{EngineConfig, EnvelopeConfig};
pub use error::EngineError;
pub use retrieval::{LoopStats, RetrievalLoop};
pub use selector::{Selection, Selector};
pub use source::{ChannelSource, FrameSource, VecSource};
