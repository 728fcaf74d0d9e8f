/*!
    Per-stream sample queues and request dispatch.
*/

use std::sync::Arc;

use media_types::{
    BoundedQueue, Error, MediaTime, MediaType, Result, Sample, StreamDescriptor, StreamId,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::command::Command;
use crate::event::StreamEvent;
use crate::state::StreamState;

/**
    How a stream is being (re)started.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StartKind {
    /// From stopped, or joining a run in progress; the stream starts over.
    Fresh,
    /// To a new position; buffered samples are stale.
    Seek,
    /// From paused or started, keeping the buffered samples.
    Resume,
}

struct StreamInner {
    state: StreamState,
    active: bool,
    queue: BoundedQueue<Sample>,
    /// Requests not yet answered with a sample.
    requests: usize,
    end_of_stream: bool,
    end_reported: bool,
    /// Run the stream was last started in, echoed back with end of stream.
    epoch: u64,
    /// Dropped at shutdown so waiting consumers see the stream close.
    events: Option<mpsc::UnboundedSender<StreamEvent>>,
}

impl StreamInner {
    fn emit(&self, event: StreamEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

struct StreamShared {
    descriptor: StreamDescriptor,
    inner: Mutex<StreamInner>,
    events_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<StreamEvent>>,
    commands: mpsc::UnboundedSender<Command>,
}

/**
    One elementary stream of a [`MediaSource`](crate::MediaSource).

    Consumers pull samples by calling [`SourceStream::request_sample`] once
    per sample they want and reading the answers from
    [`SourceStream::next_event`]. The source keeps a small queue of samples
    ahead of the requests and refills it as it drains.

    Handles are cheap to clone and all refer to the same stream.
*/
#[derive(Clone)]
pub struct SourceStream {
    shared: Arc<StreamShared>,
}

impl SourceStream {
    pub(crate) fn new(
        descriptor: StreamDescriptor,
        queue_depth: usize,
        commands: mpsc::UnboundedSender<Command>,
    ) -> Result<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            shared: Arc::new(StreamShared {
                descriptor,
                inner: Mutex::new(StreamInner {
                    state: StreamState::Stopped,
                    active: false,
                    queue: BoundedQueue::new(queue_depth)?,
                    requests: 0,
                    end_of_stream: false,
                    end_reported: false,
                    epoch: 0,
                    events: Some(events_tx),
                }),
                events_rx: tokio::sync::Mutex::new(events_rx),
                commands,
            }),
        })
    }

    pub fn id(&self) -> StreamId {
        self.shared.descriptor.id
    }

    pub fn media_type(&self) -> &MediaType {
        &self.shared.descriptor.media_type
    }

    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.shared.descriptor
    }

    pub fn state(&self) -> StreamState {
        self.shared.inner.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.shared.inner.lock().active
    }

    /**
        True once the last sample has been read from the container.
    */
    pub fn is_end_of_stream(&self) -> bool {
        self.shared.inner.lock().end_of_stream
    }

    /**
        Number of samples buffered ahead of requests.
    */
    pub fn queued(&self) -> usize {
        self.shared.inner.lock().queue.len()
    }

    /**
        True while the stream is active, not at its end and has room
        for another sample.
    */
    pub fn needs_data(&self) -> bool {
        let inner = self.shared.inner.lock();
        inner.active && !inner.end_of_stream && inner.queue.has_room()
    }

    /**
        Ask for one sample. The answer arrives as [`StreamEvent::Sample`],
        or [`StreamEvent::EndOfStream`] if the stream ends first.

        Requests made while paused are answered after playback resumes.
    */
    pub fn request_sample(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            StreamState::Shutdown => return Err(Error::Shutdown),
            StreamState::Stopped => {
                return Err(Error::WrongState {
                    state: StreamState::Stopped.name(),
                });
            }
            StreamState::Started | StreamState::Paused => {}
        }
        if !inner.active {
            return Err(Error::WrongState { state: "inactive" });
        }
        if inner.end_of_stream && inner.queue.is_empty() {
            return Err(Error::EndOfStream);
        }
        inner.requests += 1;
        self.dispatch(&mut inner);
        Ok(())
    }

    /**
        Wait for the next event on this stream.
        Returns `None` once the source has shut down and every event
        has been taken.
    */
    pub async fn next_event(&self) -> Option<StreamEvent> {
        self.shared.events_rx.lock().await.recv().await
    }

    /**
        Take the next event if one is already waiting.
    */
    pub fn try_next_event(&self) -> Option<StreamEvent> {
        self.shared.events_rx.try_lock().ok()?.try_recv().ok()
    }

    pub(crate) fn activate(&self, active: bool) {
        let mut inner = self.shared.inner.lock();
        if inner.active && !active {
            inner.queue.clear();
            inner.requests = 0;
            inner.state = StreamState::Stopped;
        }
        inner.active = active;
    }

    pub(crate) fn start(&self, kind: StartKind, position: Option<MediaTime>, epoch: u64) {
        let mut inner = self.shared.inner.lock();
        if kind != StartKind::Resume {
            inner.queue.clear();
            inner.end_of_stream = false;
            inner.end_reported = false;
            inner.epoch = epoch;
        }
        inner.state = StreamState::Started;
        let event = match (kind, position) {
            (StartKind::Seek, Some(position)) => StreamEvent::Seeked { position },
            _ => StreamEvent::Started { position },
        };
        inner.emit(event);
        self.dispatch(&mut inner);
    }

    pub(crate) fn pause(&self) {
        let mut inner = self.shared.inner.lock();
        inner.state = StreamState::Paused;
        inner.emit(StreamEvent::Paused);
    }

    pub(crate) fn stop(&self) {
        let mut inner = self.shared.inner.lock();
        inner.queue.clear();
        inner.requests = 0;
        inner.state = StreamState::Stopped;
        inner.emit(StreamEvent::Stopped);
    }

    pub(crate) fn shutdown(&self) {
        let mut inner = self.shared.inner.lock();
        inner.queue.clear();
        inner.requests = 0;
        inner.active = false;
        inner.state = StreamState::Shutdown;
        inner.events = None;
    }

    /**
        Queue a sample read from the container. Fails if the queue is full,
        which the source's pull loop never lets happen.
    */
    pub(crate) fn deliver(&self, sample: Sample) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        if inner.queue.push(sample).is_err() {
            return Err(Error::QueueFull(self.id()));
        }
        trace!(stream = %self.id(), queued = inner.queue.len(), "sample queued");
        self.dispatch(&mut inner);
        Ok(())
    }

    /**
        Mark that the container has no more samples for this stream.
    */
    pub(crate) fn end_of_stream(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.end_of_stream {
            return;
        }
        inner.end_of_stream = true;
        debug!(stream = %self.id(), "end of stream reached");
        self.dispatch(&mut inner);
    }

    /**
        Answer pending requests from the queue, then either report the end
        of the stream or ask the source for more data.
    */
    fn dispatch(&self, inner: &mut StreamInner) {
        if inner.state != StreamState::Started {
            return;
        }
        while inner.requests > 0 {
            let Some(sample) = inner.queue.pop() else {
                break;
            };
            inner.requests -= 1;
            inner.emit(StreamEvent::Sample(sample));
        }

        if inner.queue.is_empty() && inner.end_of_stream {
            if !inner.end_reported {
                inner.end_reported = true;
                inner.requests = 0;
                inner.emit(StreamEvent::EndOfStream);
                self.post(Command::EndOfStream {
                    stream: self.id(),
                    epoch: inner.epoch,
                });
            }
        } else if inner.active && !inner.end_of_stream && inner.queue.has_room() {
            self.post(Command::RequestData);
        }
    }

    fn post(&self, command: Command) {
        if self.shared.commands.send(command).is_err() {
            trace!(stream = %self.id(), "command processor gone");
        }
    }
}
