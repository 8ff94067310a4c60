//! Feature library model for concatenative synthesis.
//!
//! A model file lists one library window per line:
//!
//! ```text
//! <source-file> <start-seconds> <coeff-1> ... <coeff-n>
//! ```
//!
//! [`ModelStore`] parses such a file into [`AudioWindow`]s, a dense
//! [`FeatureMatrix`] and the deduplicated list of source file names
//! ([`FileTable`]).
//!
//! # Example
//!
//! ```rust
//! use mosaic_model::ModelStore;
//! use std::io::Cursor;
//!
//! let text = "a.wav 0.0 1 2\nb.wav 0.5 3 4\n";
//! let store = ModelStore::from_reader(Cursor::new(text)).unwrap();
//! assert_eq!(store.num_points(), 2);
//! assert_eq!(store.num_coeffs(), 2);
//! assert_eq!(store.file_name(&store.windows()[1]), Some("b.wav"));
//! ```

pub mod error;
pub mod file_table;
pub mod matrix;
pub mod store;
pub mod window;

pub use error::ModelError;
pub use file_table::FileTable;
pub use matrix::FeatureMatrix;
pub use store::ModelStore;
pub use window::AudioWindow;
