//! Polyphonic playback for concatenative synthesis.
//!
//! - [`VoicePool`]: fixed ring of voices, round-robin allocation with voice
//!   stealing, enveloped playback tasks on the tokio clock
//! - [`Adsr`] and [`MixParams`]: per-voice envelope shape and static mix
//! - [`AudioSink`]: the playback command interface ([`LogSink`],
//!   [`ScoreSink`], [`FanoutSink`])
//! - [`Renderer`]: offline rendering of a recorded [`Score`]
//!
//! # Example
//!
//! ```rust,no_run
//! use mosaic_audio::{Adsr, MixParams, ScoreSink, VoicePool};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo(store: mosaic_model::ModelStore) {
//! let sink = Arc::new(ScoreSink::new());
//! let envelope = Adsr::new(
//!     Duration::from_millis(50),
//!     Duration::from_millis(25),
//!     1.0,
//!     Duration::from_millis(50),
//! );
//! let pool = VoicePool::new(
//!     vec![MixParams::default(); 4],
//!     envelope,
//!     Duration::from_millis(200),
//!     sink.clone(),
//! )
//! .unwrap();
//!
//! let task = pool.trigger(&store.windows()[0], store.files()).unwrap();
//! let playback = task.await.unwrap();
//! assert!(!playback.stolen);
//! # }
//! ```

pub mod envelope;
pub mod error;
pub mod mix;
pub mod pool;
pub mod render;
pub mod score;
pub mod sink;

pub use envelope::Adsr;
pub use error::AudioError;
pub use mix::MixParams;
pub use pool::{Playback, PlaybackTask, VoicePool};
pub use render::Renderer;
pub use score::{EventKind, Note, Score, ScoreEvent, ScoreSink};
pub use sink::{AudioSink, FanoutSink, LogSink};
