/*!
    Per-stream state inside a sink.
*/

use media_types::{BoundedQueue, MediaTime, MediaType, Result, Sample, StreamId};

/**
    One input stream of a [`MediaSink`](crate::MediaSink): samples waiting
    to be written and whether the stream has ended.
*/
pub struct StreamSink {
    id: StreamId,
    media_type: MediaType,
    /// Stream index assigned by the writer.
    pub(crate) output_index: u32,
    pub(crate) queue: BoundedQueue<Sample>,
    pub(crate) ended: bool,
    pub(crate) written: u64,
}

impl StreamSink {
    pub fn new(id: StreamId, media_type: MediaType, capacity: usize) -> Result<Self> {
        Ok(Self {
            id,
            media_type,
            output_index: 0,
            queue: BoundedQueue::new(capacity)?,
            ended: false,
            written: 0,
        })
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /**
        Timestamp of the next sample to be written, if one is queued.
    */
    pub fn peek_time(&self) -> Option<MediaTime> {
        self.queue.front().map(|s| s.time)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /**
        True once the stream's end has been signalled. Queued samples may
        still be waiting.
    */
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_drained(&self) -> bool {
        self.ended && self.queue.is_empty()
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub(crate) fn push(&mut self, sample: Sample) -> std::result::Result<(), Sample> {
        self.queue.push(sample)
    }

    pub(crate) fn end(&mut self) {
        self.ended = true;
    }
}
