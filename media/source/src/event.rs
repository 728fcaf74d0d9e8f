/*!
    Events published by sources and their streams.
*/

use media_types::{MediaTime, Sample, StreamId};

/**
    Source-level events, in the order the command processor produced them.
*/
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// The header was parsed and the presentation descriptor is available.
    Opened,
    /// A stream was activated for the first time.
    NewStream(StreamId),
    /// An already active stream stays active across a restart.
    UpdatedStream(StreamId),
    /// Playback started, at `position` if one was given.
    Started { position: Option<MediaTime> },
    /// Playback restarted at a new position while running or paused.
    Seeked { position: MediaTime },
    Paused,
    Stopped,
    /// Every active stream has reached its end.
    EndOfPresentation,
    /// A command was rejected or failed.
    CommandFailed {
        operation: &'static str,
        message: String,
    },
    /// Reading from the container failed.
    Error { message: String },
}

/**
    Events published on a single stream.
*/
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Started { position: Option<MediaTime> },
    Seeked { position: MediaTime },
    Paused,
    Stopped,
    /// A sample answering one call to
    /// [`SourceStream::request_sample`](crate::SourceStream::request_sample).
    Sample(Sample),
    /// No more samples will be delivered until the next seek or restart.
    EndOfStream,
}
