use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("audio: voice pool must have at least one voice")]
    EmptyPool,

    #[error("audio: source file index {index} out of range ({files} files)")]
    UnknownSource { index: usize, files: usize },

    #[error("audio: wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio: resample error: {0}")]
    Resample(String),

    #[error("audio: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio: serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}
