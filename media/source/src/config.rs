/*!
    Source configuration types.
*/

use std::time::Duration;

use media_types::{Error, Result};

/// Samples buffered per stream ahead of the consumer.
pub const DEFAULT_QUEUE_DEPTH: usize = 2;

/**
    Configuration for a [`MediaSource`](crate::MediaSource).
*/
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Capacity of each stream's sample queue.
    pub queue_depth: usize,
    /// Amount of audio per audio sample, for containers that store
    /// audio as a continuous byte stream.
    pub audio_chunk_duration: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            audio_chunk_duration: Duration::from_millis(100),
        }
    }
}

impl SourceConfig {
    /**
        Set the per-stream queue depth.
    */
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth;
        self
    }

    /**
        Set the duration of each audio sample.
    */
    pub fn with_audio_chunk_duration(mut self, duration: Duration) -> Self {
        self.audio_chunk_duration = duration;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.queue_depth == 0 {
            return Err(Error::invalid_config("queue depth must be at least 1"));
        }
        if self.audio_chunk_duration.is_zero() {
            return Err(Error::invalid_config("audio chunk duration must be non-zero"));
        }
        Ok(())
    }
}
