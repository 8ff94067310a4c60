use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model: empty or malformed model ({points} rows, {coeffs} coefficients)")]
    EmptyOrMalformedModel { points: usize, coeffs: isize },

    #[error("model: line {line}: malformed number {token:?}")]
    MalformedNumber { line: usize, token: String },

    #[error("model: line {line}: got {got} coefficients, want {want}")]
    RowLength { line: usize, got: usize, want: usize },
}
