use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Which of the input's streams to carry into the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSelection {
    #[default]
    All,
    VideoOnly,
    AudioOnly,
}

/// Settings for a remux run, loadable from a JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Samples the source buffers per stream.
    pub queue_depth: usize,
    /// Samples the sink buffers per stream.
    pub sink_queue_capacity: usize,
    /// Length of each audio sample read from the input.
    pub audio_chunk_ms: u64,
    /// Position in the input to start from. The output starts at zero.
    pub start_ms: u64,
    /// Volume factor for PCM audio.
    pub gain: f32,
    pub streams: StreamSelection,
    pub write_index: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_depth: media_source::DEFAULT_QUEUE_DEPTH,
            sink_queue_capacity: media_sink::DEFAULT_QUEUE_CAPACITY,
            audio_chunk_ms: 100,
            start_ms: 0,
            gain: 1.0,
            streams: StreamSelection::All,
            write_index: true,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_depth == 0 || self.sink_queue_capacity == 0 {
            bail!("queue sizes must be at least 1");
        }
        if self.audio_chunk_ms == 0 {
            bail!("audio chunk length must be at least 1 ms");
        }
        if !self.gain.is_finite() || self.gain < 0.0 {
            bail!("gain must be a non-negative number, got {}", self.gain);
        }
        Ok(())
    }
}
