/*!
    The media source and its command processor.
*/

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use media_avi::ParserConfig;
use media_types::{Error, MediaTime, PresentationDescriptor, Result, StreamId};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::command::{Command, Reply};
use crate::config::SourceConfig;
use crate::demuxer::{AviDemuxer, Demuxer};
use crate::event::SourceEvent;
use crate::state::SourceState;
use crate::stream::{SourceStream, StartKind};

/**
    Capabilities a source advertises to its consumers.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceCharacteristics {
    pub can_pause: bool,
    pub can_seek: bool,
}

struct SourceCore {
    state: SourceState,
    config: SourceConfig,
    demuxer: Option<Box<dyn Demuxer>>,
    descriptor: Option<PresentationDescriptor>,
    streams: Vec<SourceStream>,
    /// Active streams that reported end of stream in the current run.
    ended: HashSet<StreamId>,
    presentation_ended: bool,
    /// Incremented on every start that repositions the streams.
    epoch: u64,
    /// Dropped at shutdown so waiting consumers see the source close.
    events: Option<mpsc::UnboundedSender<SourceEvent>>,
    commands: mpsc::UnboundedSender<Command>,
}

struct SourceShared {
    core: Mutex<SourceCore>,
    commands: mpsc::UnboundedSender<Command>,
}

/**
    A demand-driven source of media samples.

    The container header is parsed once when the source is opened. After
    that the source serves samples on demand: each active stream keeps a
    small queue of demuxed samples, and whenever a queue has room the
    source reads the next sample for that stream from the container.

    Start, pause and stop are executed by a single command processor task,
    one at a time and in the order they were issued. Their outcome is both
    returned to the caller and published as a [`SourceEvent`].

    A tokio runtime must be running when the source is created.
*/
pub struct MediaSource {
    shared: Arc<SourceShared>,
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<SourceEvent>>,
}

impl MediaSource {
    /**
        Open an AVI file.
    */
    pub async fn open(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        let path = path.as_ref();
        config.validate()?;
        let data = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = data.len(), "read source file");
        let parser_config =
            ParserConfig::default().with_audio_chunk_duration(config.audio_chunk_duration);
        Self::from_demuxer(Box::new(AviDemuxer::new(data, parser_config)), config).await
    }

    /**
        Create a source over any container parser.

        Returns once the header has been parsed and the source is stopped.
    */
    pub async fn from_demuxer(demuxer: Box<dyn Demuxer>, config: SourceConfig) -> Result<Self> {
        config.validate()?;

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(SourceShared {
            core: Mutex::new(SourceCore {
                state: SourceState::Uninitialized,
                config,
                demuxer: Some(demuxer),
                descriptor: None,
                streams: Vec::new(),
                ended: HashSet::new(),
                presentation_ended: false,
                epoch: 0,
                events: Some(events_tx),
                commands: commands_tx.clone(),
            }),
            commands: commands_tx,
        });
        tokio::spawn(run_commands(Arc::clone(&shared), commands_rx));

        let source = Self {
            shared,
            events: tokio::sync::Mutex::new(events_rx),
        };
        source.shared.core.lock().state = SourceState::Opening;
        source.post(|reply| Command::Open { reply }).await?;
        Ok(source)
    }

    pub fn state(&self) -> SourceState {
        self.shared.core.lock().state
    }

    pub fn characteristics(&self) -> SourceCharacteristics {
        SourceCharacteristics {
            can_pause: true,
            can_seek: true,
        }
    }

    /**
        A copy of the stream catalog, with every stream selected as it
        was at the last start.
    */
    pub fn presentation_descriptor(&self) -> Result<PresentationDescriptor> {
        let core = self.shared.core.lock();
        core.check_open()?;
        core.descriptor.clone().ok_or(Error::NotInitialized)
    }

    pub fn stream(&self, id: StreamId) -> Option<SourceStream> {
        let core = self.shared.core.lock();
        core.streams.iter().find(|s| s.id() == id).cloned()
    }

    pub fn streams(&self) -> Vec<SourceStream> {
        self.shared.core.lock().streams.clone()
    }

    /**
        Start playback of the streams selected in `descriptor`.

        From stopped, playback begins at `position` (or the beginning).
        From started or paused, a position makes this a seek and no
        position resumes where playback left off.
    */
    pub async fn start(
        &self,
        descriptor: &PresentationDescriptor,
        position: Option<MediaTime>,
    ) -> Result<()> {
        let descriptor = descriptor.clone();
        self.post(|reply| Command::Start {
            descriptor,
            position,
            reply,
        })
        .await
    }

    /**
        Pause playback. Only legal while started.
    */
    pub async fn pause(&self) -> Result<()> {
        self.post(|reply| Command::Pause { reply }).await
    }

    /**
        Stop playback, discarding buffered samples and pending requests.
    */
    pub async fn stop(&self) -> Result<()> {
        self.post(|reply| Command::Stop { reply }).await
    }

    /**
        Shut the source down, releasing the container and ending the
        command processor. Commands still queued fail with
        [`Error::Shutdown`]. This cannot be undone.
    */
    pub fn shutdown(&self) -> Result<()> {
        let mut core = self.shared.core.lock();
        if core.state == SourceState::Shutdown {
            return Err(Error::Shutdown);
        }
        for stream in core.streams.drain(..) {
            stream.shutdown();
        }
        core.demuxer = None;
        core.events = None;
        core.state = SourceState::Shutdown;
        drop(core);

        let _ = self.shared.commands.send(Command::Terminate);
        info!("source shut down");
        Ok(())
    }

    /**
        Wait for the next source event.
        Returns `None` once the source has shut down and every event
        has been taken.
    */
    pub async fn next_event(&self) -> Option<SourceEvent> {
        self.events.lock().await.recv().await
    }

    /**
        Take the next source event if one is already waiting.
    */
    pub fn try_next_event(&self) -> Option<SourceEvent> {
        self.events.try_lock().ok()?.try_recv().ok()
    }

    async fn post(&self, command: impl FnOnce(Reply) -> Command) -> Result<()> {
        if self.state() == SourceState::Shutdown {
            return Err(Error::Shutdown);
        }
        let (tx, rx) = oneshot::channel();
        self.shared
            .commands
            .send(command(tx))
            .map_err(|_| Error::Shutdown)?;
        rx.await.map_err(|_| Error::Shutdown)?
    }
}

impl Drop for MediaSource {
    fn drop(&mut self) {
        if self.state() != SourceState::Shutdown {
            let _ = self.shutdown();
        }
    }
}

async fn run_commands(shared: Arc<SourceShared>, mut commands: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = commands.recv().await {
        if matches!(command, Command::Terminate) {
            break;
        }
        shared.core.lock().handle(command);
    }
    debug!("command processor ended");
}

impl SourceCore {
    fn handle(&mut self, command: Command) {
        let operation = command.name();
        let (result, reply) = match command {
            Command::Open { reply } => (self.open(), Some(reply)),
            Command::Start {
                descriptor,
                position,
                reply,
            } => (self.start(&descriptor, position), Some(reply)),
            Command::Pause { reply } => (self.pause(), Some(reply)),
            Command::Stop { reply } => (self.stop(), Some(reply)),
            Command::EndOfStream { stream, epoch } => {
                self.end_of_stream(stream, epoch);
                (Ok(()), None)
            }
            Command::RequestData | Command::Terminate => (Ok(()), None),
        };

        if let Err(e) = &result {
            warn!(operation, error = %e, state = %self.state, "command failed");
            self.emit(SourceEvent::CommandFailed {
                operation,
                message: e.to_string(),
            });
        }

        if let Err(e) = self.request_data() {
            warn!(error = %e, "reading samples failed");
            self.emit(SourceEvent::Error {
                message: e.to_string(),
            });
        }

        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    fn emit(&self, event: SourceEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn check_open(&self) -> Result<()> {
        match self.state {
            SourceState::Shutdown => Err(Error::Shutdown),
            state if !state.is_open() => Err(Error::NotInitialized),
            _ => Ok(()),
        }
    }

    fn open(&mut self) -> Result<()> {
        match self.state {
            SourceState::Opening => {}
            SourceState::Shutdown => return Err(Error::Shutdown),
            other => return Err(Error::invalid_transition(other.name(), "open")),
        }
        let demuxer = self.demuxer.as_mut().ok_or(Error::NotInitialized)?;
        let descriptors = match demuxer.parse_header() {
            Ok(d) => d,
            Err(e) => {
                self.state = SourceState::Uninitialized;
                return Err(e);
            }
        };
        let duration = demuxer.duration();

        let mut streams = Vec::with_capacity(descriptors.len());
        for d in &descriptors {
            streams.push(SourceStream::new(
                d.clone(),
                self.config.queue_depth,
                self.commands.clone(),
            )?);
        }
        self.streams = streams;
        self.descriptor = Some(PresentationDescriptor::new(descriptors, duration));
        self.state = SourceState::Stopped;

        info!(streams = self.streams.len(), %duration, "source opened");
        self.emit(SourceEvent::Opened);
        Ok(())
    }

    fn start(
        &mut self,
        descriptor: &PresentationDescriptor,
        position: Option<MediaTime>,
    ) -> Result<()> {
        self.check_open()?;
        for d in &descriptor.streams {
            if !self.streams.iter().any(|s| s.id() == d.id) {
                return Err(Error::UnknownStream(d.id));
            }
        }
        if descriptor.selected().next().is_none() {
            return Err(Error::invalid_config("no stream is selected"));
        }

        let kind = match (self.state, position) {
            (SourceState::Stopped, _) => StartKind::Fresh,
            (_, Some(_)) => StartKind::Seek,
            (_, None) => StartKind::Resume,
        };
        if kind != StartKind::Resume {
            let target = position.unwrap_or(MediaTime::ZERO);
            self.demuxer
                .as_mut()
                .ok_or(Error::NotInitialized)?
                .set_position(target)?;
            self.epoch += 1;
            self.ended.clear();
            self.presentation_ended = false;
        }

        for stream in &self.streams {
            let id = stream.id();
            let selected = descriptor.is_selected(id);
            let was_active = stream.is_active();
            stream.activate(selected);
            if !selected {
                self.ended.remove(&id);
                continue;
            }
            let event = if was_active {
                SourceEvent::UpdatedStream(id)
            } else {
                SourceEvent::NewStream(id)
            };
            self.emit(event);

            // A stream joining a running presentation has nothing to resume.
            let stream_kind = if !was_active && kind == StartKind::Resume {
                self.ended.remove(&id);
                self.presentation_ended = false;
                StartKind::Fresh
            } else {
                kind
            };
            stream.start(stream_kind, position, self.epoch);
        }

        if let Some(current) = self.descriptor.as_mut() {
            for d in &mut current.streams {
                d.selected = descriptor.is_selected(d.id);
            }
        }
        self.state = SourceState::Started;

        let event = match (kind, position) {
            (StartKind::Seek, Some(position)) => SourceEvent::Seeked { position },
            _ => SourceEvent::Started { position },
        };
        info!(?kind, ?position, "source started");
        self.emit(event);

        // Deselecting the last stream still running ends the presentation.
        self.check_presentation_end();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.check_open()?;
        if self.state != SourceState::Started {
            return Err(Error::invalid_transition(self.state.name(), "pause"));
        }
        for stream in self.streams.iter().filter(|s| s.is_active()) {
            stream.pause();
        }
        self.state = SourceState::Paused;
        debug!("source paused");
        self.emit(SourceEvent::Paused);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.check_open()?;
        for stream in self.streams.iter().filter(|s| s.is_active()) {
            stream.stop();
        }
        self.ended.clear();
        self.state = SourceState::Stopped;
        debug!("source stopped");
        self.emit(SourceEvent::Stopped);
        Ok(())
    }

    fn end_of_stream(&mut self, id: StreamId, epoch: u64) {
        if epoch != self.epoch || !matches!(self.state, SourceState::Started | SourceState::Paused)
        {
            debug!(stream = %id, epoch, "ignoring stale end of stream");
            return;
        }
        if !self.streams.iter().any(|s| s.id() == id && s.is_active()) {
            debug!(stream = %id, "ignoring end of inactive stream");
            return;
        }
        self.ended.insert(id);
        debug!(stream = %id, ended = self.ended.len(), "stream ended");
        self.check_presentation_end();
    }

    /**
        Emit end of presentation once every active stream has ended.
    */
    fn check_presentation_end(&mut self) {
        if self.presentation_ended
            || !matches!(self.state, SourceState::Started | SourceState::Paused)
        {
            return;
        }
        let mut active = self.streams.iter().filter(|s| s.is_active()).peekable();
        if active.peek().is_none() {
            return;
        }
        if active.all(|s| self.ended.contains(&s.id())) {
            self.presentation_ended = true;
            info!("end of presentation");
            self.emit(SourceEvent::EndOfPresentation);
        }
    }

    /**
        Read from the container until no active stream has room left or
        every stream that wants data has reached its end.
    */
    fn request_data(&mut self) -> Result<()> {
        if self.state != SourceState::Started {
            return Ok(());
        }
        let Some(demuxer) = self.demuxer.as_mut() else {
            return Ok(());
        };
        loop {
            let mut progressed = false;
            for stream in &self.streams {
                if !stream.needs_data() {
                    continue;
                }
                progressed = true;
                let id = stream.id();
                if demuxer.is_end_of_stream(id) {
                    stream.end_of_stream();
                    continue;
                }
                match demuxer.next_sample(id) {
                    Ok(sample) => stream.deliver(sample)?,
                    Err(e) if e.is_end_of_stream() => {
                        stream.end_of_stream();
                        continue;
                    }
                    Err(e) => return Err(e),
                }
                if demuxer.is_end_of_stream(id) {
                    stream.end_of_stream();
                }
            }
            if !progressed {
                return Ok(());
            }
        }
    }
}
