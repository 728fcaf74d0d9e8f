/*!
    Stream and presentation descriptors.
*/

use std::fmt;

use serde::Serialize;

use crate::{MediaTime, MediaType, StreamType};

/**
    Identifier of an elementary stream within one presentation.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StreamId(pub u32);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/**
    One entry in a presentation's stream catalog.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    pub id: StreamId,
    pub media_type: MediaType,
    pub selected: bool,
}

impl StreamDescriptor {
    /**
        Create a descriptor that is selected by default.
    */
    pub fn new(id: StreamId, media_type: MediaType) -> Self {
        Self {
            id,
            media_type,
            selected: true,
        }
    }

    pub fn stream_type(&self) -> StreamType {
        self.media_type.stream_type()
    }
}

/**
    Catalog of a media item's streams and its total duration.

    Consumers get a copy from the source, toggle selection on it, and
    hand it back when starting playback.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PresentationDescriptor {
    pub streams: Vec<StreamDescriptor>,
    pub duration: MediaTime,
}

impl PresentationDescriptor {
    pub fn new(streams: Vec<StreamDescriptor>, duration: MediaTime) -> Self {
        Self { streams, duration }
    }

    pub fn stream(&self, id: StreamId) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.id == id)
    }

    /**
        Mark a stream as selected. Returns false if the id is unknown.
    */
    pub fn select(&mut self, id: StreamId) -> bool {
        self.set_selected(id, true)
    }

    /**
        Mark a stream as not selected. Returns false if the id is unknown.
    */
    pub fn deselect(&mut self, id: StreamId) -> bool {
        self.set_selected(id, false)
    }

    pub fn is_selected(&self, id: StreamId) -> bool {
        self.stream(id).is_some_and(|s| s.selected)
    }

    pub fn selected(&self) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams.iter().filter(|s| s.selected)
    }

    /**
        First stream of the given type, selected or not.
    */
    pub fn first_of(&self, stream_type: StreamType) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.stream_type() == stream_type)
    }

    fn set_selected(&mut self, id: StreamId, selected: bool) -> bool {
        match self.streams.iter_mut().find(|s| s.id == id) {
            Some(s) => {
                s.selected = selected;
                true
            }
            None => false,
        }
    }
}
