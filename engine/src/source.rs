//! Analysis frame producers.
//!
//! The engine does not analyse audio itself: frames come from whatever
//! feature extractor feeds it, one vector per hop.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Supplies one feature frame per analysis hop.
#[async_trait]
pub trait FrameSource: Send {
    /// Dimensionality of every frame this source yields.
    fn dims(&self) -> usize;

    /// Next frame, or `None` once the input is exhausted.
    async fn next_frame(&mut self) -> Option<Vec<f32>>;
}

/// Replays a fixed list of frames.
#[derive(Debug, Clone)]
pub struct VecSource {
    dims: usize,
    frames: VecDeque<Vec<f32>>,
}

impl VecSource {
    pub fn new(dims: usize, frames: Vec<Vec<f32>>) -> Self {
        Self {
            dims,
            frames: frames.into(),
        }
    }

    /// Frames not yet consumed.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl FrameSource for VecSource {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn next_frame(&mut self) -> Option<Vec<f32>> {
        self.frames.pop_front()
    }
}

/// Frames pushed from another task; ends when every sender is dropped.
#[derive(Debug)]
pub struct ChannelSource {
    dims: usize,
    rx: mpsc::Receiver<Vec<f32>>,
}

impl ChannelSource {
    pub fn channel(dims: usize, capacity: usize) -> (mpsc::Sender<Vec<f32>>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { dims, rx })
    }
}

#[async_trait]
impl FrameSource for ChannelSource {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn next_frame(&mut self) -> Option<Vec<f32>> {
        self.rx.recv().await
    }
}
