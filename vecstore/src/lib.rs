pub mod cosine;
pub mod error;
pub mod euclidean;
pub mod memory;
pub mod vecstore;

pub use cosine::cosine_distance;
pub use error::VecError;
pub use euclidean::euclidean_distance;
pub use memory::{MemoryIndex, Metric};
pub use vecstore::{Match, VecIndex};
