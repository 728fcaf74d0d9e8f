/*!
    Timestamped media samples.
*/

use bytes::Bytes;

use crate::{MediaTime, StreamId};

/**
    One timestamped unit of media data belonging to a stream.

    The payload is reference counted, so cloning a sample to hand it
    to several consumers does not copy the data.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub stream_id: StreamId,
    pub data: Bytes,
    pub time: MediaTime,
    pub duration: Option<MediaTime>,
    pub is_keyframe: bool,
}

impl Sample {
    /**
        Create a keyframe sample with no duration.
    */
    pub fn new(stream_id: StreamId, data: impl Into<Bytes>, time: MediaTime) -> Self {
        Self {
            stream_id,
            data: data.into(),
            time,
            duration: None,
            is_keyframe: true,
        }
    }

    pub fn with_duration(mut self, duration: MediaTime) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_keyframe(mut self, is_keyframe: bool) -> Self {
        self.is_keyframe = is_keyframe;
        self
    }

    /**
        Time at which this sample stops playing, if the duration is known.
    */
    pub fn end_time(&self) -> Option<MediaTime> {
        self.duration.map(|d| self.time.saturating_add(d))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
