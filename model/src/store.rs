//! Two-pass parser for the headerless model file format.
//!
//! The format declares neither row count nor dimensionality, so the first
//! pass counts non-empty lines and takes the coefficient count from the last
//! one; the second pass rewinds and fills pre-sized storage.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, info};

use crate::error::ModelError;
use crate::file_table::FileTable;
use crate::matrix::FeatureMatrix;
use crate::window::AudioWindow;

/// Leading fields before the coefficients: file name and start time.
const LEADING_FIELDS: usize = 2;

/// Parsed feature library. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStore {
    windows: Vec<AudioWindow>,
    matrix: FeatureMatrix,
    files: FileTable,
}

impl ModelStore {
    /// Loads a model file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let store = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            points = store.num_points(),
            coeffs = store.num_coeffs(),
            files = store.files.len(),
            "model loaded"
        );
        Ok(store)
    }

    /// Parses a model from any seekable reader.
    ///
    /// Loading either fully succeeds or returns an error; no partially
    /// populated store is ever returned.
    pub fn from_reader<R: BufRead + Seek>(mut reader: R) -> Result<Self, ModelError> {
        let (num_points, num_coeffs) = scan(&mut reader)?;
        debug!(num_points, num_coeffs, "model scan complete");

        reader.seek(SeekFrom::Start(0))?;

        let mut windows = Vec::with_capacity(num_points);
        let mut matrix = FeatureMatrix::zeros(num_points, num_coeffs);
        let mut files = FileTable::new();

        let mut line = String::new();
        let mut line_no = 0;
        while windows.len() < num_points {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_no += 1;

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() != num_coeffs + LEADING_FIELDS {
                return Err(ModelError::RowLength {
                    line: line_no,
                    got: tokens.len().saturating_sub(LEADING_FIELDS),
                    want: num_coeffs,
                });
            }

            let uid = windows.len();
            let file_index = files.insert(tokens[0]);
            let start_time: f64 = parse_number(tokens[1], line_no)?;

            let row = matrix.row_mut(uid);
            for (slot, token) in row.iter_mut().zip(&tokens[LEADING_FIELDS..]) {
                *slot = parse_number(token, line_no)?;
            }

            windows.push(AudioWindow::new(uid, file_index, start_time));
        }

        if windows.len() != num_points {
            // The reader changed between passes.
            return Err(ModelError::EmptyOrMalformedModel {
                points: windows.len(),
                coeffs: num_coeffs as isize,
            });
        }

        Ok(Self {
            windows,
            matrix,
            files,
        })
    }

    pub fn num_points(&self) -> usize {
        self.windows.len()
    }

    pub fn num_coeffs(&self) -> usize {
        self.matrix.num_cols()
    }

    /// All windows, indexed by uid.
    pub fn windows(&self) -> &[AudioWindow] {
        &self.windows
    }

    pub fn window(&self, uid: usize) -> Option<&AudioWindow> {
        self.windows.get(uid)
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// Feature row of window `uid`.
    pub fn features(&self, uid: usize) -> Option<&[f32]> {
        self.matrix.row(uid)
    }

    pub fn files(&self) -> &FileTable {
        &self.files
    }

    /// Resolves a window's source file name.
    pub fn file_name(&self, window: &AudioWindow) -> Option<&str> {
        self.files.get(window.source_file_index())
    }
}

/// First pass: counts non-empty lines and infers the coefficient count
/// from the last of them.
fn scan<R: BufRead>(reader: &mut R) -> Result<(usize, usize), ModelError> {
    let mut points = 0;
    let mut last_tokens = 0;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let tokens = line.split_whitespace().count();
        if tokens == 0 {
            continue;
        }
        points += 1;
        last_tokens = tokens;
    }

    let coeffs = last_tokens as isize - LEADING_FIELDS as isize;
    if points == 0 || coeffs <= 0 {
        return Err(ModelError::EmptyOrMalformedModel { points, coeffs });
    }
    Ok((points, coeffs as usize))
}

fn parse_number<T: std::str::FromStr>(token: &str, line: usize) -> Result<T, ModelError> {
    token.parse().map_err(|_| ModelError::MalformedNumber {
        line,
        token: token.to_string(),
    })
}
