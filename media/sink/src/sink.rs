/*!
    The media sink.
*/

use std::io::Write;
use std::path::Path;

use media_types::{Error, MediaType, Result, Sample, StreamId};
use tracing::{debug, info, trace};

use crate::config::SinkConfig;
use crate::scheduler::{Selection, select_earliest, select_queued};
use crate::stream_sink::StreamSink;
use crate::writer::{AviByteStreamWriter, AviFileWriter, SampleWriter};

/**
    Lifecycle state of a [`MediaSink`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    Stopped,
    Started,
    Shutdown,
}

impl SinkState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Started => "started",
            Self::Shutdown => "shut down",
        }
    }
}

/**
    Collects samples from several streams and writes them in timestamp
    order.

    Each stream has a small queue. While started, the sink writes the
    earliest queued sample whenever every live stream has something
    queued, so the written timestamps never go backwards as long as each
    stream's own timestamps don't.
*/
pub struct MediaSink<W: SampleWriter> {
    config: SinkConfig,
    writer: W,
    streams: Vec<StreamSink>,
    state: SinkState,
    writing: bool,
    finalized: bool,
}

impl MediaSink<AviFileWriter> {
    /**
        Create a sink writing to a new file.
    */
    pub fn file(path: impl AsRef<Path>, config: SinkConfig) -> Result<Self> {
        let writer = AviFileWriter::create(path, config.write_index)?;
        Self::new(writer, config)
    }
}

impl<S: Write + Send> MediaSink<AviByteStreamWriter<S>> {
    /**
        Create a sink writing AVI to a byte stream that cannot seek.
        The index setting of `config` does not apply.
    */
    pub fn byte_stream(stream: S, config: SinkConfig) -> Result<Self> {
        Self::new(AviByteStreamWriter::new(stream), config)
    }
}

impl<W: SampleWriter> MediaSink<W> {
    pub fn new(writer: W, config: SinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            writer,
            streams: Vec::new(),
            state: SinkState::Stopped,
            writing: false,
            finalized: false,
        })
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    pub fn streams(&self) -> &[StreamSink] {
        &self.streams
    }

    pub fn stream(&self, id: StreamId) -> Option<&StreamSink> {
        self.streams.iter().find(|s| s.id() == id)
    }

    /**
        Add an input stream. Streams must be added before the first
        sample is written.
    */
    pub fn add_stream(&mut self, id: StreamId, media_type: &MediaType) -> Result<()> {
        self.check_alive()?;
        if self.writing {
            return Err(Error::invalid_transition("writing", "add stream"));
        }
        if self.stream(id).is_some() {
            return Err(Error::invalid_config(format!("stream {id} added twice")));
        }
        let mut stream = StreamSink::new(id, media_type.clone(), self.config.queue_capacity)?;
        stream.output_index = self.writer.add_stream(media_type)?;
        debug!(stream = %id, index = stream.output_index, "sink stream added");
        self.streams.push(stream);
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SinkState::Shutdown => return Err(Error::Shutdown),
            SinkState::Started => return Ok(()),
            SinkState::Stopped => {}
        }
        if self.streams.is_empty() {
            return Err(Error::invalid_config("sink has no streams"));
        }
        self.state = SinkState::Started;
        debug!(streams = self.streams.len(), "sink started");
        self.write_ready()
    }

    /**
        Stop writing. Queued samples are kept and written after the next
        start or by [`MediaSink::finalize`].
    */
    pub fn stop(&mut self) -> Result<()> {
        self.check_alive()?;
        self.state = SinkState::Stopped;
        debug!("sink stopped");
        Ok(())
    }

    /**
        True if the stream exists, has not ended and has room for
        another sample.
    */
    pub fn needs_data(&self, id: StreamId) -> bool {
        self.state != SinkState::Shutdown
            && self
                .stream(id)
                .is_some_and(|s| !s.is_ended() && s.queue.has_room())
    }

    /**
        Queue a sample and write whatever has become ready.
    */
    pub fn process_sample(&mut self, sample: Sample) -> Result<()> {
        self.check_alive()?;
        let id = sample.stream_id;
        let stream = self.stream_mut(id)?;
        if stream.is_ended() {
            return Err(Error::WrongState { state: "ended" });
        }
        if stream.push(sample).is_err() {
            return Err(Error::QueueFull(id));
        }
        if self.state == SinkState::Started {
            self.write_ready()?;
        }
        Ok(())
    }

    /**
        Mark a stream as complete. Other streams no longer wait for it.
    */
    pub fn end_of_stream(&mut self, id: StreamId) -> Result<()> {
        self.check_alive()?;
        let stream = self.stream_mut(id)?;
        stream.end();
        debug!(stream = %id, pending = stream.pending(), "sink stream ended");
        if self.state == SinkState::Started {
            self.write_ready()?;
        }
        Ok(())
    }

    /**
        True once every stream has ended and all its samples are written.
    */
    pub fn is_finished(&self) -> bool {
        !self.streams.is_empty() && self.streams.iter().all(StreamSink::is_drained)
    }

    /**
        Write everything still queued, in timestamp order, and complete the
        output. Streams that have not ended are treated as ended. Only the
        first call does any work.
    */
    pub fn finalize(&mut self) -> Result<()> {
        self.check_alive()?;
        if self.finalized {
            return Ok(());
        }
        for s in &mut self.streams {
            s.end();
        }
        while let Selection::Stream(i) = select_queued(&self.streams) {
            self.write_from(i)?;
        }
        self.writer.finish()?;
        self.finalized = true;

        let written: u64 = self.streams.iter().map(StreamSink::written).sum();
        info!(samples = written, "sink finalized");
        Ok(())
    }

    /**
        Release the sink without completing the output.
    */
    pub fn shutdown(&mut self) -> Result<()> {
        self.check_alive()?;
        for s in &mut self.streams {
            s.queue.clear();
        }
        self.state = SinkState::Shutdown;
        debug!("sink shut down");
        Ok(())
    }

    fn check_alive(&self) -> Result<()> {
        if self.state == SinkState::Shutdown {
            Err(Error::Shutdown)
        } else {
            Ok(())
        }
    }

    fn stream_mut(&mut self, id: StreamId) -> Result<&mut StreamSink> {
        self.streams
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or(Error::UnknownStream(id))
    }

    fn write_ready(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        while let Selection::Stream(i) = select_earliest(&self.streams) {
            self.write_from(i)?;
        }
        Ok(())
    }

    fn write_from(&mut self, index: usize) -> Result<()> {
        let stream = &mut self.streams[index];
        let Some(sample) = stream.queue.pop() else {
            return Ok(());
        };
        trace!(stream = %stream.id(), time = %sample.time, "writing sample");
        self.writer.write_sample(stream.output_index, &sample)?;
        stream.written += 1;
        self.writing = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use media_avi::{AviParser, ParserConfig};
    use media_types::{AudioFormat, FourCc, MediaTime, Rational, VideoFormat};

    use super::*;
    use crate::writer::MemoryWriter;

    const V: StreamId = StreamId(0);
    const A: StreamId = StreamId(1);

    fn video() -> MediaType {
        MediaType::Video(VideoFormat {
            fourcc: FourCc::new(b"MJPG"),
            width: 8,
            height: 8,
            bit_count: 24,
            image_size: 0,
            frame_rate: Rational { num: 25, den: 1 },
            extra_data: Vec::new(),
        })
    }

    fn audio() -> MediaType {
        MediaType::Audio(AudioFormat::pcm(1, 8000, 8))
    }

    fn sample(id: StreamId, ms: i64) -> Sample {
        Sample::new(id, vec![0x80u8; 8], MediaTime::from_millis(ms))
    }

    fn sink() -> MediaSink<MemoryWriter> {
        let mut sink = MediaSink::new(MemoryWriter::new(), SinkConfig::default()).unwrap();
        sink.add_stream(V, &video()).unwrap();
        sink.add_stream(A, &audio()).unwrap();
        sink
    }

    fn written(sink: &MediaSink<MemoryWriter>) -> Vec<(u32, i64)> {
        sink.writer()
            .samples
            .iter()
            .map(|(i, s)| (*i, s.time.as_millis()))
            .collect()
    }

    #[test]
    fn interleaves_by_timestamp() {
        let mut sink = sink();
        sink.start().unwrap();
        sink.process_sample(sample(V, 0)).unwrap();
        sink.process_sample(sample(V, 40)).unwrap();
        sink.process_sample(sample(V, 80)).unwrap();
        // nothing can be written until audio has something queued
        assert!(written(&sink).is_empty());

        sink.process_sample(sample(A, 0)).unwrap();
        sink.process_sample(sample(A, 100)).unwrap();
        assert_eq!(written(&sink), vec![(0, 0), (1, 0), (0, 40), (0, 80)]);

        sink.end_of_stream(V).unwrap();
        sink.end_of_stream(A).unwrap();
        assert!(sink.is_finished());
        assert_eq!(written(&sink).last(), Some(&(1, 100)));
    }

    #[test]
    fn nothing_written_while_stopped() {
        let mut sink = sink();
        sink.process_sample(sample(V, 0)).unwrap();
        sink.process_sample(sample(A, 0)).unwrap();
        assert!(written(&sink).is_empty());
        sink.start().unwrap();
        assert_eq!(written(&sink).len(), 2);

        sink.stop().unwrap();
        sink.process_sample(sample(V, 40)).unwrap();
        sink.process_sample(sample(A, 100)).unwrap();
        assert_eq!(written(&sink).len(), 2);
    }

    #[test]
    fn backpressure_and_queue_limit() {
        let mut sink = MediaSink::new(
            MemoryWriter::new(),
            SinkConfig::default().with_queue_capacity(2),
        )
        .unwrap();
        sink.add_stream(V, &video()).unwrap();
        sink.add_stream(A, &audio()).unwrap();
        sink.start().unwrap();

        assert!(sink.needs_data(V));
        sink.process_sample(sample(V, 0)).unwrap();
        sink.process_sample(sample(V, 40)).unwrap();
        assert!(!sink.needs_data(V));
        assert!(matches!(
            sink.process_sample(sample(V, 80)),
            Err(Error::QueueFull(V))
        ));
        assert!(!sink.needs_data(StreamId(7)));
    }

    #[test]
    fn ended_stream_rejects_samples() {
        let mut sink = sink();
        sink.end_of_stream(A).unwrap();
        assert!(!sink.needs_data(A));
        assert!(sink.process_sample(sample(A, 0)).is_err());
        assert!(matches!(
            sink.process_sample(sample(StreamId(5), 0)),
            Err(Error::UnknownStream(StreamId(5)))
        ));
    }

    #[test]
    fn streams_fixed_once_writing() {
        let mut sink = sink();
        assert!(sink.add_stream(V, &video()).is_err());
        sink.start().unwrap();
        sink.process_sample(sample(V, 0)).unwrap();
        sink.end_of_stream(A).unwrap();
        assert!(sink.add_stream(StreamId(2), &audio()).is_err());
    }

    #[test]
    fn start_needs_streams() {
        let mut sink = MediaSink::new(MemoryWriter::new(), SinkConfig::default()).unwrap();
        assert!(matches!(sink.start(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn finalize_writes_remaining_once() {
        let mut sink = sink();
        sink.start().unwrap();
        sink.process_sample(sample(V, 40)).unwrap();
        sink.process_sample(sample(V, 0)).unwrap();
        sink.finalize().unwrap();
        sink.finalize().unwrap();
        assert_eq!(written(&sink), vec![(0, 40), (0, 0)]);
        assert_eq!(sink.writer().finish_calls, 1);
        assert!(sink.is_finished());
    }

    #[test]
    fn shutdown_is_final() {
        let mut sink = sink();
        sink.process_sample(sample(V, 0)).unwrap();
        sink.shutdown().unwrap();
        assert_eq!(sink.state(), SinkState::Shutdown);
        assert!(matches!(sink.start(), Err(Error::Shutdown)));
        assert!(matches!(sink.finalize(), Err(Error::Shutdown)));
        assert!(matches!(sink.shutdown(), Err(Error::Shutdown)));
        assert!(!sink.needs_data(A));
        assert!(!sink.writer().is_finished());
    }

    #[test]
    fn writes_playable_avi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");
        let mut sink = MediaSink::file(&path, SinkConfig::avi()).unwrap();
        sink.add_stream(V, &video()).unwrap();
        sink.add_stream(A, &audio()).unwrap();
        sink.start().unwrap();
        for i in 0..5 {
            sink.process_sample(sample(V, i * 40)).unwrap();
            if i < 2 {
                sink.process_sample(
                    Sample::new(A, vec![0x80u8; 800], MediaTime::from_millis(i * 100)),
                )
                .unwrap();
            }
        }
        sink.end_of_stream(A).unwrap();
        sink.end_of_stream(V).unwrap();
        sink.finalize().unwrap();

        let parser =
            AviParser::parse(std::fs::read(&path).unwrap(), &ParserConfig::default()).unwrap();
        assert_eq!(parser.video_frame_count(), 5);
        assert_eq!(parser.audio_byte_len(), 1600);
    }
}
