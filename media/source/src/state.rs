use std::fmt;

/**
    Lifecycle of a media source.

    `Uninitialized -> Opening -> Stopped`, then any of `Stopped`, `Started`
    and `Paused` according to the commands issued. `Shutdown` is final.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceState {
    Uninitialized,
    Opening,
    Stopped,
    Started,
    Paused,
    Shutdown,
}

impl SourceState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Opening => "opening",
            Self::Stopped => "stopped",
            Self::Started => "started",
            Self::Paused => "paused",
            Self::Shutdown => "shut down",
        }
    }

    /**
        True once the header has been parsed and until shutdown.
    */
    pub fn is_open(self) -> bool {
        matches!(self, Self::Stopped | Self::Started | Self::Paused)
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/**
    Lifecycle of one stream of a source.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamState {
    Stopped,
    Started,
    Paused,
    Shutdown,
}

impl StreamState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Started => "started",
            Self::Paused => "paused",
            Self::Shutdown => "shut down",
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
