/*!
    Sink configuration types.
*/

use media_types::{Error, Result};

/// Samples a sink buffers per stream before refusing more.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;

/**
    Container format for output.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContainerFormat {
    /// AVI with an `idx1` index.
    #[default]
    Avi,
}

impl ContainerFormat {
    /**
        Get the typical file extension for this container.
    */
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Avi => "avi",
        }
    }
}

/**
    Configuration for a media sink.
*/
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Container format to use.
    pub format: ContainerFormat,
    /// Capacity of each stream's pending sample queue.
    pub queue_capacity: usize,
    /// Write an index so players can seek in the output.
    pub write_index: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::new(ContainerFormat::default())
    }
}

impl SinkConfig {
    /**
        Create a new sink configuration.
    */
    pub fn new(format: ContainerFormat) -> Self {
        Self {
            format,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            write_index: true,
        }
    }

    /**
        Create configuration for AVI output.
    */
    pub fn avi() -> Self {
        Self::new(ContainerFormat::Avi)
    }

    /**
        Set the per-stream queue capacity.
    */
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /**
        Enable or disable the container index.
    */
    pub fn with_index(mut self, enabled: bool) -> Self {
        self.write_index = enabled;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(Error::invalid_config("sink queue capacity must be at least 1"));
        }
        Ok(())
    }
}
