use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use media_sink::{MediaSink, SampleWriter, SinkConfig};
use media_source::{MediaSource, SourceConfig, SourceEvent, SourceStream, StreamEvent};
use media_transform::{AudioGain, TimeShift, TransformChain};
use media_types::{MediaTime, MediaType, PresentationDescriptor, Sample, StreamId, StreamType};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, StreamSelection};

/// What a finished remux produced.
#[derive(Debug)]
pub struct RemuxSummary {
    pub duration: MediaTime,
    pub streams: Vec<StreamSummary>,
}

#[derive(Debug)]
pub struct StreamSummary {
    pub id: StreamId,
    pub stream_type: StreamType,
    pub samples: u64,
}

/// Sink side of the pipeline, shared by all stream tasks.
struct Output<W: SampleWriter> {
    sink: Arc<Mutex<MediaSink<W>>>,
    /// Signalled whenever the sink may have made room.
    room: Arc<Notify>,
}

impl<W: SampleWriter> Clone for Output<W> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            room: Arc::clone(&self.room),
        }
    }
}

impl<W: SampleWriter> Output<W> {
    async fn wait_for_room(&self, id: StreamId) {
        loop {
            let notified = self.room.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.sink.lock().needs_data(id) {
                return;
            }
            notified.await;
        }
    }

    async fn write(&self, sample: Sample) -> Result<()> {
        self.wait_for_room(sample.stream_id).await;
        let result = self.sink.lock().process_sample(sample);
        self.room.notify_waiters();
        Ok(result?)
    }

    fn end_of_stream(&self, id: StreamId) -> Result<()> {
        let result = self.sink.lock().end_of_stream(id);
        self.room.notify_waiters();
        Ok(result?)
    }
}

/**
    Copy the selected streams of `input` into a new AVI file at `output`,
    applying the configured start position and gain.
*/
pub async fn remux(input: &Path, output: &Path, config: &PipelineConfig) -> Result<RemuxSummary> {
    run(input, config, |sink_config| {
        MediaSink::file(output, sink_config)
            .with_context(|| format!("failed to create {}", output.display()))
    })
    .await
}

/**
    Like [`remux`], but writes AVI without an index into `writer` as the
    samples are produced.
*/
pub async fn stream<S>(input: &Path, writer: S, config: &PipelineConfig) -> Result<RemuxSummary>
where
    S: Write + Send + 'static,
{
    run(input, config, |sink_config| {
        Ok(MediaSink::byte_stream(writer, sink_config)?)
    })
    .await
}

async fn run<W, F>(input: &Path, config: &PipelineConfig, create_sink: F) -> Result<RemuxSummary>
where
    W: SampleWriter + 'static,
    F: FnOnce(SinkConfig) -> Result<MediaSink<W>>,
{
    config.validate()?;
    let source_config = SourceConfig::default()
        .with_queue_depth(config.queue_depth)
        .with_audio_chunk_duration(Duration::from_millis(config.audio_chunk_ms));
    let source = MediaSource::open(input, source_config)
        .await
        .with_context(|| format!("failed to open {}", input.display()))?;

    let mut descriptor = source.presentation_descriptor()?;
    select_streams(&mut descriptor, config.streams);
    if descriptor.selected().next().is_none() {
        bail!("{} has no stream matching the selection", input.display());
    }

    let sink_config = SinkConfig::avi()
        .with_queue_capacity(config.sink_queue_capacity)
        .with_index(config.write_index);
    let mut sink = create_sink(sink_config)?;

    let start = MediaTime::from_millis(config.start_ms as i64);
    let mut chains = Vec::new();
    for d in descriptor.selected() {
        let mut chain = build_chain(&d.media_type, start, config.gain)?;
        let output_type = chain
            .set_input_type(&d.media_type)
            .with_context(|| format!("cannot process stream {}", d.id))?;
        sink.add_stream(d.id, &output_type)?;
        debug!(stream = %d.id, stages = ?chain.stage_names(), "stream configured");
        chains.push((d.id, chain));
    }
    sink.start()?;

    let out = Output {
        sink: Arc::new(Mutex::new(sink)),
        room: Arc::new(Notify::new()),
    };

    let position = (config.start_ms > 0).then_some(start);
    source.start(&descriptor, position).await?;
    info!(input = %input.display(), ?position, "remux started");

    let mut tasks = JoinSet::new();
    for (id, chain) in chains {
        let stream = source
            .stream(id)
            .ok_or_else(|| anyhow!("source lost stream {id}"))?;
        tasks.spawn(pump_stream(stream, chain, out.clone()));
    }

    let mut counts = Vec::new();
    let mut presentation_ended = false;
    while !(presentation_ended && tasks.is_empty()) {
        tokio::select! {
            Some(joined) = tasks.join_next() => {
                let (id, samples) = joined.context("stream task failed")??;
                counts.push((id, samples));
            }
            event = source.next_event(), if !presentation_ended => match event {
                Some(SourceEvent::EndOfPresentation) => presentation_ended = true,
                Some(SourceEvent::Error { message }) => bail!("reading input failed: {message}"),
                Some(SourceEvent::CommandFailed { operation, message }) => {
                    bail!("source could not {operation}: {message}")
                }
                Some(_) => {}
                None => bail!("source closed unexpectedly"),
            },
        }
    }

    out.sink.lock().finalize()?;
    if let Err(e) = source.shutdown() {
        warn!(error = %e, "source shutdown failed");
    }

    counts.sort_by_key(|(id, _)| *id);
    let streams = counts
        .into_iter()
        .filter_map(|(id, samples)| {
            let d = descriptor.stream(id)?;
            Some(StreamSummary {
                id,
                stream_type: d.stream_type(),
                samples,
            })
        })
        .collect();
    Ok(RemuxSummary {
        duration: descriptor.duration.saturating_sub(start).max(MediaTime::ZERO),
        streams,
    })
}

fn select_streams(descriptor: &mut PresentationDescriptor, selection: StreamSelection) {
    let drop_type = match selection {
        StreamSelection::All => return,
        StreamSelection::VideoOnly => StreamType::Audio,
        StreamSelection::AudioOnly => StreamType::Video,
    };
    for d in &mut descriptor.streams {
        if d.stream_type() == drop_type {
            d.selected = false;
        }
    }
}

fn build_chain(media_type: &MediaType, start: MediaTime, gain: f32) -> Result<TransformChain> {
    let mut chain = TransformChain::new();
    if start > MediaTime::ZERO {
        chain = chain.with_stage(TimeShift::new(MediaTime::ZERO.saturating_sub(start)));
    }
    if media_type.stream_type().is_audio() && gain != 1.0 {
        chain = chain.with_stage(AudioGain::new(gain)?);
    }
    Ok(chain)
}

/**
    Move one stream's samples from the source, through its chain and into
    the sink, one request at a time.
*/
async fn pump_stream<W: SampleWriter + 'static>(
    stream: SourceStream,
    mut chain: TransformChain,
    out: Output<W>,
) -> Result<(StreamId, u64)> {
    let id = stream.id();
    let mut samples = 0u64;
    loop {
        out.wait_for_room(id).await;
        match stream.request_sample() {
            Ok(()) => {}
            Err(e) if e.is_end_of_stream() => break,
            Err(e) => return Err(e).context(format!("stream {id} refused a request")),
        }
        let sample = loop {
            match stream.next_event().await {
                Some(StreamEvent::Sample(sample)) => break Some(sample),
                Some(StreamEvent::EndOfStream) => break None,
                Some(_) => {}
                None => bail!("stream {id} closed"),
            }
        };
        let Some(sample) = sample else {
            break;
        };
        for processed in chain.process(sample)? {
            out.write(processed).await?;
            samples += 1;
        }
    }
    chain.flush();
    out.end_of_stream(id)?;
    debug!(stream = %id, samples, "stream complete");
    Ok((id, samples))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use media_avi::{AviParser, AviWriter, ParserConfig};
    use media_sink::MemoryWriter;
    use media_transform::{Passthrough, Transform, TransformOutput};
    use media_types::{AudioFormat, FourCc, Rational, VideoFormat};

    use super::*;

    /// 20 frames at 25 fps with a keyframe every 5, and 8 chunks of
    /// 100 ms PCM audio at 8 kHz mono.
    fn write_input(path: &Path) {
        let mut w = AviWriter::new(Cursor::new(Vec::new()));
        let video = w
            .add_stream(&MediaType::Video(VideoFormat {
                fourcc: FourCc::new(b"MJPG"),
                width: 16,
                height: 16,
                bit_count: 24,
                image_size: 0,
                frame_rate: Rational { num: 25, den: 1 },
                extra_data: Vec::new(),
            }))
            .unwrap();
        let audio = w
            .add_stream(&MediaType::Audio(AudioFormat::pcm(1, 8000, 8)))
            .unwrap();
        for i in 0..20u8 {
            w.write_sample(video, &[i; 7], i % 5 == 0).unwrap();
            if i % 2 == 0 && i < 16 {
                w.write_sample(audio, &[0x90; 800], true).unwrap();
            }
        }
        w.finish().unwrap();
        std::fs::write(path, w.into_inner().into_inner()).unwrap();
    }

    fn counts(summary: &RemuxSummary) -> Vec<(StreamType, u64)> {
        summary
            .streams
            .iter()
            .map(|s| (s.stream_type, s.samples))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn copies_every_sample() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        let output = dir.path().join("out.avi");
        write_input(&input);

        let summary = remux(&input, &output, &PipelineConfig::default())
            .await
            .unwrap();
        assert_eq!(
            counts(&summary),
            vec![(StreamType::Video, 20), (StreamType::Audio, 8)]
        );
        assert_eq!(summary.duration, MediaTime::from_millis(800));

        let parser =
            AviParser::parse(std::fs::read(&output).unwrap(), &ParserConfig::default()).unwrap();
        assert_eq!(parser.video_frame_count(), 20);
        assert_eq!(parser.audio_byte_len(), 6400);
    }

    /// Chunk ids of the `movi` list, in file order.
    fn movi_chunk_ids(data: &[u8]) -> Vec<[u8; 4]> {
        let movi = data.windows(4).position(|w| w == b"movi").unwrap();
        let mut pos = movi + 4;
        let mut ids = Vec::new();
        while pos + 8 <= data.len() {
            let id: [u8; 4] = data[pos..pos + 4].try_into().unwrap();
            if &id == b"idx1" {
                break;
            }
            let size = u32::from_le_bytes(data[pos + 4..pos + 8].try_into().unwrap()) as usize;
            ids.push(id);
            pos += 8 + size + (size & 1);
        }
        ids
    }

    #[tokio::test]
    async fn output_is_interleaved_in_time_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        let output = dir.path().join("out.avi");
        write_input(&input);
        remux(&input, &output, &PipelineConfig::default())
            .await
            .unwrap();

        // frames are 40 ms apart and audio chunks 100 ms
        let ids = movi_chunk_ids(&std::fs::read(&output).unwrap());
        let (mut frames, mut chunks) = (0i64, 0i64);
        let mut times = Vec::new();
        for id in &ids {
            match id {
                b"00dc" => {
                    times.push(frames * 40);
                    frames += 1;
                }
                b"01wb" => {
                    times.push(chunks * 100);
                    chunks += 1;
                }
                other => panic!("unexpected chunk {other:?}"),
            }
        }
        assert_eq!((frames, chunks), (20, 8));
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "{times:?}");
    }

    /// Passes samples through and counts flushes.
    struct CountFlushes {
        inner: Passthrough,
        flushes: Arc<AtomicUsize>,
    }

    impl Transform for CountFlushes {
        fn name(&self) -> &'static str {
            "count flushes"
        }

        fn set_input_type(&mut self, media_type: &MediaType) -> media_types::Result<()> {
            self.inner.set_input_type(media_type)
        }

        fn output_type(&self) -> Option<MediaType> {
            self.inner.output_type()
        }

        fn process_input(&mut self, sample: Sample) -> media_types::Result<()> {
            self.inner.process_input(sample)
        }

        fn process_output(&mut self) -> media_types::Result<TransformOutput> {
            self.inner.process_output()
        }

        fn flush(&mut self) {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            self.inner.flush();
        }
    }

    #[tokio::test]
    async fn end_of_stream_flushes_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        write_input(&input);

        let source = MediaSource::open(&input, SourceConfig::default()).await.unwrap();
        let mut pd = source.presentation_descriptor().unwrap();
        select_streams(&mut pd, StreamSelection::AudioOnly);
        let audio = pd.selected().next().unwrap().clone();

        let flushes = Arc::new(AtomicUsize::new(0));
        let mut chain = TransformChain::new().with_stage(CountFlushes {
            inner: Passthrough::new(),
            flushes: Arc::clone(&flushes),
        });
        let output_type = chain.set_input_type(&audio.media_type).unwrap();
        let mut sink = MediaSink::new(MemoryWriter::new(), SinkConfig::default()).unwrap();
        sink.add_stream(audio.id, &output_type).unwrap();
        sink.start().unwrap();
        let out = Output {
            sink: Arc::new(Mutex::new(sink)),
            room: Arc::new(Notify::new()),
        };

        source.start(&pd, None).await.unwrap();
        let stream = source.stream(audio.id).unwrap();
        let (id, samples) = pump_stream(stream, chain, out.clone()).await.unwrap();
        assert_eq!((id, samples), (audio.id, 8));
        assert_eq!(flushes.load(Ordering::SeqCst), 1);
        assert!(out.sink.lock().stream(audio.id).unwrap().is_ended());
    }

    #[tokio::test]
    async fn streams_into_a_byte_sink() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        write_input(&input);

        let buffer = SharedBuffer::default();
        let summary = stream(&input, buffer.clone(), &PipelineConfig::default())
            .await
            .unwrap();
        assert_eq!(
            counts(&summary),
            vec![(StreamType::Video, 20), (StreamType::Audio, 8)]
        );

        let data = buffer.0.lock().clone();
        assert!(!data.windows(4).any(|w| w == b"idx1"));
        let parser = AviParser::parse(data, &ParserConfig::default()).unwrap();
        assert_eq!(parser.video_frame_count(), 20);
        assert_eq!(parser.audio_byte_len(), 6400);
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn audio_only_with_gain() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        let output = dir.path().join("out.avi");
        write_input(&input);

        let config = PipelineConfig {
            streams: StreamSelection::AudioOnly,
            gain: 2.0,
            ..PipelineConfig::default()
        };
        let summary = remux(&input, &output, &config).await.unwrap();
        assert_eq!(counts(&summary), vec![(StreamType::Audio, 8)]);

        let mut parser =
            AviParser::parse(std::fs::read(&output).unwrap(), &ParserConfig::default()).unwrap();
        assert!(parser.video_format().is_none());
        let first = parser.next_audio_sample().unwrap();
        // 0x90 is 16 above the midpoint
        assert!(first.data.iter().all(|&b| b == 0xA0));
    }

    #[tokio::test]
    async fn start_position_trims_and_rebases() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        let output = dir.path().join("out.avi");
        write_input(&input);

        let config = PipelineConfig {
            start_ms: 400,
            ..PipelineConfig::default()
        };
        let summary = remux(&input, &output, &config).await.unwrap();
        // frame 10 is a keyframe at 400 ms; audio resumes at chunk 4
        assert_eq!(
            counts(&summary),
            vec![(StreamType::Video, 10), (StreamType::Audio, 4)]
        );
        assert_eq!(summary.duration, MediaTime::from_millis(400));
    }

    #[tokio::test]
    async fn missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = remux(
            &dir.path().join("missing.avi"),
            &dir.path().join("out.avi"),
            &PipelineConfig::default(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_selection_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        let mut w = AviWriter::new(Cursor::new(Vec::new()));
        let a = w
            .add_stream(&MediaType::Audio(AudioFormat::pcm(1, 8000, 8)))
            .unwrap();
        w.write_sample(a, &[0x80; 800], true).unwrap();
        w.finish().unwrap();
        std::fs::write(&input, w.into_inner().into_inner()).unwrap();

        let config = PipelineConfig {
            streams: StreamSelection::VideoOnly,
            ..PipelineConfig::default()
        };
        let err = remux(&input, &dir.path().join("out.avi"), &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no stream"));
    }
}
