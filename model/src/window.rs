/// One addressable fragment of library audio.
///
/// `uid` equals the window's row in the [`FeatureMatrix`](crate::FeatureMatrix)
/// and doubles as its identifier in the neighbour index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioWindow {
    uid: usize,
    source_file_index: usize,
    start_time: f64,
}

impl AudioWindow {
    pub(crate) fn new(uid: usize, source_file_index: usize, start_time: f64) -> Self {
        Self {
            uid,
            source_file_index,
            start_time,
        }
    }

    pub fn uid(&self) -> usize {
        self.uid
    }

    /// Index into the model's [`FileTable`](crate::FileTable).
    pub fn source_file_index(&self) -> usize {
        self.source_file_index
    }

    /// Offset into the source file, in seconds.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }
}
