/*!
    Test doubles for the source.
*/

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use media_avi::AviWriter;
use media_types::{
    AudioFormat, Error, FourCc, MediaTime, MediaType, Rational, Result, Sample, StreamDescriptor,
    StreamId, VideoFormat,
};
use parking_lot::Mutex;

use crate::demuxer::Demuxer;

struct ScriptedStream {
    descriptor: StreamDescriptor,
    count: usize,
    interval: MediaTime,
    cursor: usize,
}

/**
    A demuxer whose streams carry `count` evenly spaced samples each.
    Every sample is a keyframe, so seeking floors to the sample that
    contains the target.
*/
pub(crate) struct ScriptedDemuxer {
    streams: Vec<ScriptedStream>,
    header_parses: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
    positions: Arc<Mutex<Vec<MediaTime>>>,
    fail_header: bool,
    fail_after: Option<usize>,
}

impl ScriptedDemuxer {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            header_parses: Arc::default(),
            reads: Arc::default(),
            positions: Arc::default(),
            fail_header: false,
            fail_after: None,
        }
    }

    pub fn with_video(self, id: StreamId, count: usize, interval: MediaTime) -> Self {
        let format = VideoFormat {
            fourcc: FourCc::new(b"MJPG"),
            width: 16,
            height: 16,
            bit_count: 24,
            image_size: 0,
            frame_rate: Rational { num: 25, den: 1 },
            extra_data: Vec::new(),
        };
        self.with_stream(id, MediaType::Video(format), count, interval)
    }

    pub fn with_audio(self, id: StreamId, count: usize, interval: MediaTime) -> Self {
        let format = AudioFormat::pcm(1, 8000, 8);
        self.with_stream(id, MediaType::Audio(format), count, interval)
    }

    fn with_stream(
        mut self,
        id: StreamId,
        media_type: MediaType,
        count: usize,
        interval: MediaTime,
    ) -> Self {
        self.streams.push(ScriptedStream {
            descriptor: StreamDescriptor::new(id, media_type),
            count,
            interval,
            cursor: 0,
        });
        self
    }

    pub fn failing_header(mut self) -> Self {
        self.fail_header = true;
        self
    }

    pub fn failing_reads_after(mut self, reads: usize) -> Self {
        self.fail_after = Some(reads);
        self
    }

    pub fn header_parses(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.header_parses)
    }

    /// Number of `next_sample` calls.
    pub fn reads(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }

    /// Every position passed to `set_position`.
    pub fn positions(&self) -> Arc<Mutex<Vec<MediaTime>>> {
        Arc::clone(&self.positions)
    }

    fn find(&self, id: StreamId) -> Option<&ScriptedStream> {
        self.streams.iter().find(|s| s.descriptor.id == id)
    }
}

impl Demuxer for ScriptedDemuxer {
    fn parse_header(&mut self) -> Result<Vec<StreamDescriptor>> {
        self.header_parses.fetch_add(1, Ordering::SeqCst);
        if self.fail_header {
            return Err(Error::invalid_data("scripted header failure"));
        }
        Ok(self.streams.iter().map(|s| s.descriptor.clone()).collect())
    }

    fn duration(&self) -> MediaTime {
        self.streams
            .iter()
            .map(|s| MediaTime::from_ticks(s.interval.ticks() * s.count as i64))
            .max()
            .unwrap_or(MediaTime::ZERO)
    }

    fn next_sample(&mut self, id: StreamId) -> Result<Sample> {
        let reads = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_after.is_some_and(|n| reads > n) {
            return Err(Error::invalid_data("scripted read failure"));
        }
        let stream = self
            .streams
            .iter_mut()
            .find(|s| s.descriptor.id == id)
            .ok_or(Error::UnknownStream(id))?;
        if stream.cursor >= stream.count {
            return Err(Error::EndOfStream);
        }
        let time = MediaTime::from_ticks(stream.interval.ticks() * stream.cursor as i64);
        stream.cursor += 1;
        Ok(Sample::new(id, vec![stream.cursor as u8; 4], time).with_duration(stream.interval))
    }

    fn is_end_of_stream(&self, id: StreamId) -> bool {
        self.find(id).is_none_or(|s| s.cursor >= s.count)
    }

    fn set_position(&mut self, position: MediaTime) -> Result<()> {
        self.positions.lock().push(position);
        for s in &mut self.streams {
            let index = position.ticks().max(0) / s.interval.ticks().max(1);
            s.cursor = (index as usize).min(s.count);
        }
        Ok(())
    }
}

/**
    An AVI file with a 25 fps video stream and a PCM audio stream of
    100 ms chunks at 8 kHz mono.
*/
pub(crate) fn avi_file(video_frames: usize, audio_chunks: usize) -> Vec<u8> {
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
    for i in 0..video_frames.max(audio_chunks) {
        if i < video_frames {
            w.write_sample(video, &[i as u8; 5], i % 3 == 0).unwrap();
        }
        if i < audio_chunks {
            w.write_sample(audio, &[0x80; 800], true).unwrap();
        }
    }
    w.finish().unwrap();
    w.into_inner().into_inner()
}
