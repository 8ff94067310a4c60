use std::f32::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

/// Static per-voice mixing parameters, assigned once when the pool is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixParams {
    /// Stereo position in `[-1, 1]`, -1 is hard left.
    pub pan: f32,
    /// Effect send level in `[0, 1]`.
    pub send: f32,
}

impl MixParams {
    pub fn new(pan: f32, send: f32) -> Self {
        Self {
            pan: pan.clamp(-1.0, 1.0),
            send: send.clamp(0.0, 1.0),
        }
    }

    /// Equal-power (left, right) gains for this pan position.
    pub fn channel_gains(&self) -> (f32, f32) {
        let angle = (self.pan + 1.0) * FRAC_PI_4;
        (angle.cos(), angle.sin())
    }
}

impl Default for MixParams {
    fn default() -> Self {
        Self { pan: 0.0, send: 0.0 }
    }
}
