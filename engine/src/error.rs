use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine: model has {model} coefficients but the analyzer produces {analyzer}")]
    DimensionMismatch { model: usize, analyzer: usize },

    #[error("engine: invalid config: {0}")]
    InvalidConfig(String),

    #[error("engine: config file: {0}")]
    ConfigFile(String),

    #[error("engine: frame has {got} values, want {want}")]
    FrameLength { got: usize, want: usize },

    #[error("engine: decision window has {got} of {want} frames")]
    IncompleteWindow { got: usize, want: usize },

    #[error("engine: decision window already holds {0} frames")]
    WindowFull(usize),

    #[error("engine: search returned unknown window {0}")]
    UnknownWindow(usize),

    #[error(transparent)]
    Model(#[from] mosaic_model::ModelError),

    #[error(transparent)]
    Index(#[from] mosaic_vecstore::VecError),

    #[error(transparent)]
    Audio(#[from] mosaic_audio::AudioError),

    #[error("engine: playback task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
