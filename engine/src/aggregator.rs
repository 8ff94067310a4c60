use crate::error::EngineError;

/// Averages a fixed number of analysis frames into one query vector.
///
/// Sums per coefficient, then divides by `num_frames`. NaN and infinities
/// propagate.
#[derive(Debug, Clone)]
pub struct FeatureAggregator {
    num_frames: usize,
    sum: Vec<f64>,
    count: usize,
}

impl FeatureAggregator {
    pub fn new(num_frames: usize, dims: usize) -> Self {
        Self {
            num_frames,
            sum: vec![0.0; dims],
            count: 0,
        }
    }

    pub fn dims(&self) -> usize {
        self.sum.len()
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Frames pushed into the current window.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.num_frames
    }

    pub fn push_frame(&mut self, frame: &[f32]) -> Result<(), EngineError> {
        if frame.len() != self.sum.len() {
            return Err(EngineError::FrameLength {
                got: frame.len(),
                want: self.sum.len(),
            });
        }
        if self.is_full() {
            return Err(EngineError::WindowFull(self.num_frames));
        }
        for (acc, &v) in self.sum.iter_mut().zip(frame) {
            *acc += v as f64;
        }
        self.count += 1;
        Ok(())
    }

    /// Returns the coefficient-wise mean of the window and starts a new one.
    pub fn mean(&mut self) -> Result<Vec<f32>, EngineError> {
        if !self.is_full() {
            return Err(EngineError::IncompleteWindow {
                got: self.count,
                want: self.num_frames,
            });
        }
        let n = self.num_frames as f64;
        let mean = self.sum.iter().map(|&s| (s / n) as f32).collect();
        self.reset();
        Ok(mean)
    }

    /// Drops any partially collected window.
    pub fn reset(&mut self) {
        self.sum.iter_mut().for_each(|s| *s = 0.0);
        self.count = 0;
    }
}
