/*!
    AVI demuxer.

    The whole file is held in memory and parsed once. After that, samples
    are sliced out of it on demand by advancing a read cursor per stream.
*/

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use media_types::{AudioFormat, MediaTime, Rational, TICKS_PER_SECOND, VideoFormat};
use tracing::{debug, warn};

use crate::chunk::{
    AUDS, AVI, AVIH, CHUNK_HEADER_LEN, ChunkHeader, HDRL, IDX1, IndexEntry, LIST, MOVI, PayloadKind,
    REC, RIFF, STRF, STRH, STRL, VIDS, parse_stream_tag, read_index,
};
use crate::error::{AviError, AviResult};
use crate::header::{MainHeader, StreamHeader, parse_audio_format, parse_video_format};
use crate::reader::RiffReader;

/**
    Configuration for [`AviParser`].
*/
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Amount of audio returned per audio sample.
    pub audio_chunk_duration: Duration,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            audio_chunk_duration: Duration::from_millis(100),
        }
    }
}

impl ParserConfig {
    pub fn with_audio_chunk_duration(mut self, duration: Duration) -> Self {
        self.audio_chunk_duration = duration;
        self
    }
}

/**
    One demuxed unit of a stream.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AviPacket {
    pub data: Bytes,
    pub time: MediaTime,
    pub duration: MediaTime,
    pub is_keyframe: bool,
}

#[derive(Clone, Copy, Debug)]
struct ChunkRef {
    /// Absolute offset of the chunk payload.
    offset: usize,
    size: usize,
    keyframe: bool,
}

struct VideoTrack {
    index: u32,
    header: StreamHeader,
    format: VideoFormat,
    frames: Vec<ChunkRef>,
    cursor: usize,
}

impl VideoTrack {
    fn rate(&self) -> Rational {
        self.format.frame_rate
    }

    fn duration(&self) -> MediaTime {
        let length = match self.header.length {
            0 => self.frames.len() as u64,
            n => n as u64,
        };
        self.rate().ticks_to_time(length)
    }
}

struct AudioTrack {
    index: u32,
    header: StreamHeader,
    format: AudioFormat,
    chunks: Vec<ChunkRef>,
    /// Logical byte position at which each chunk starts.
    starts: Vec<u64>,
    total_bytes: u64,
    cursor: u64,
    read_size: u64,
}

impl AudioTrack {
    fn bytes_to_time(&self, bytes: u64) -> MediaTime {
        let t = bytes as u128 * TICKS_PER_SECOND as u128 / self.format.avg_bytes_per_sec as u128;
        MediaTime(i64::try_from(t).unwrap_or(i64::MAX))
    }

    fn duration(&self) -> MediaTime {
        match self.header.unit_rate() {
            Some(rate) if self.header.length > 0 => rate.ticks_to_time(self.header.length as u64),
            _ => self.bytes_to_time(self.total_bytes),
        }
    }

    /**
        Copy `len` bytes of the logical audio byte stream starting at `start`.
        Reads that stay inside one chunk share the file buffer.
    */
    fn read(&self, file: &Bytes, start: u64, len: u64) -> Bytes {
        let mut i = self.starts.partition_point(|&s| s <= start).saturating_sub(1);
        let within = (start - self.starts[i]) as usize;
        let len = len as usize;
        let first = self.chunks[i];
        if within + len <= first.size {
            return file.slice(first.offset + within..first.offset + within + len);
        }

        let mut out = BytesMut::with_capacity(len);
        let mut skip = within;
        while out.len() < len && i < self.chunks.len() {
            let c = self.chunks[i];
            let take = (c.size - skip).min(len - out.len());
            out.extend_from_slice(&file[c.offset + skip..c.offset + skip + take]);
            skip = 0;
            i += 1;
        }
        out.freeze()
    }
}

enum ParsedStream {
    Video(StreamHeader, VideoFormat),
    Audio(StreamHeader, AudioFormat),
    Other(StreamHeader),
}

/**
    Demuxer for AVI files.

    Exposes the first video and the first audio stream. Video is delivered
    one frame per sample; audio is delivered in chunks of roughly
    [`ParserConfig::audio_chunk_duration`], aligned to whole sample frames.
*/
pub struct AviParser {
    data: Bytes,
    main_header: MainHeader,
    video: Option<VideoTrack>,
    audio: Option<AudioTrack>,
}

impl AviParser {
    /**
        Parse the headers and index of an AVI file held in memory.
    */
    pub fn parse(data: impl Into<Bytes>, config: &ParserConfig) -> AviResult<Self> {
        let data: Bytes = data.into();
        let mut r = RiffReader::new(&data);

        let magic = r.read_fourcc()?;
        if magic != RIFF {
            return Err(AviError::NotRiff { found: magic });
        }
        let riff_size = r.read_u32()? as usize;
        let form = r.read_fourcc()?;
        if form != AVI {
            return Err(AviError::NotAvi { found: form });
        }
        let mut body = r.sub_reader_lossy(riff_size.saturating_sub(4));

        let mut hdrl = None;
        let mut movi = None;
        let mut index = None;
        while body.remaining() >= CHUNK_HEADER_LEN {
            let header = ChunkHeader::read(&mut body)?;
            let size = header.size as usize;
            let mut chunk = body.sub_reader_lossy(size);
            body.skip_padding(size);

            if header.id == IDX1 {
                index = Some(read_index(chunk)?);
            } else if header.id == LIST && chunk.remaining() >= 4 {
                let list_pos = chunk.offset();
                let list_type = chunk.read_fourcc()?;
                if list_type == HDRL {
                    hdrl = Some(parse_hdrl(chunk)?);
                } else if list_type == MOVI {
                    movi = Some((list_pos, chunk));
                } else {
                    debug!(%list_type, "skipping list");
                }
            }
        }

        let (main_header, streams) = hdrl.ok_or(AviError::MissingChunk("hdrl"))?;
        let (movi_pos, movi_list) = movi.ok_or(AviError::MissingChunk("movi"))?;

        let mut video = None;
        let mut audio = None;
        for (i, stream) in streams.into_iter().enumerate() {
            let i = i as u32;
            match stream {
                ParsedStream::Video(header, format) if video.is_none() => {
                    video = Some((i, header, format));
                }
                ParsedStream::Audio(header, format) if audio.is_none() => {
                    audio = Some((i, header, format));
                }
                ParsedStream::Video(..) | ParsedStream::Audio(..) => {
                    warn!(stream = i, "ignoring additional stream of the same type");
                }
                ParsedStream::Other(header) => {
                    debug!(stream = i, kind = %header.fcc_type, "ignoring stream");
                }
            }
        }
        if video.is_none() && audio.is_none() {
            return Err(AviError::NoStreams);
        }

        let chunks = match index.filter(|entries| !entries.is_empty()) {
            Some(entries) => chunks_from_index(&data, movi_pos, &entries),
            None => {
                debug!("no idx1 index, scanning movi");
                let mut out = Vec::new();
                scan_movi(movi_list, &mut out)?;
                out
            }
        };

        let video = video.map(|(index, header, format)| VideoTrack {
            index,
            header,
            format,
            frames: chunks
                .iter()
                .filter(|(i, kind, _)| *i == index && *kind == PayloadKind::Video)
                .map(|(_, _, c)| *c)
                .collect(),
            cursor: 0,
        });

        let audio = audio.map(|(index, header, format)| {
            let chunks: Vec<ChunkRef> = chunks
                .iter()
                .filter(|(i, kind, _)| *i == index && *kind == PayloadKind::Audio)
                .map(|(_, _, c)| *c)
                .collect();
            let mut starts = Vec::with_capacity(chunks.len());
            let mut total_bytes = 0u64;
            for c in &chunks {
                starts.push(total_bytes);
                total_bytes += c.size as u64;
            }
            let read_size = audio_read_size(&format, config.audio_chunk_duration);
            AudioTrack {
                index,
                header,
                format,
                chunks,
                starts,
                total_bytes,
                cursor: 0,
                read_size,
            }
        });

        let parser = Self {
            data,
            main_header,
            video,
            audio,
        };
        debug!(
            video_frames = parser.video_frame_count(),
            audio_bytes = parser.audio_byte_len(),
            duration = %parser.duration(),
            "parsed AVI"
        );
        Ok(parser)
    }

    pub fn main_header(&self) -> &MainHeader {
        &self.main_header
    }

    pub fn video_format(&self) -> Option<&VideoFormat> {
        self.video.as_ref().map(|v| &v.format)
    }

    pub fn audio_format(&self) -> Option<&AudioFormat> {
        self.audio.as_ref().map(|a| &a.format)
    }

    /**
        Position of the video stream among the file's `strl` lists.
    */
    pub fn video_stream_index(&self) -> Option<u32> {
        self.video.as_ref().map(|v| v.index)
    }

    pub fn audio_stream_index(&self) -> Option<u32> {
        self.audio.as_ref().map(|a| a.index)
    }

    pub fn video_frame_count(&self) -> usize {
        self.video.as_ref().map(|v| v.frames.len()).unwrap_or(0)
    }

    pub fn audio_byte_len(&self) -> u64 {
        self.audio.as_ref().map(|a| a.total_bytes).unwrap_or(0)
    }

    /**
        Duration of the longest exposed stream.
    */
    pub fn duration(&self) -> MediaTime {
        let video = self.video.as_ref().map(VideoTrack::duration);
        let audio = self.audio.as_ref().map(AudioTrack::duration);
        video.max(audio).unwrap_or(MediaTime::ZERO)
    }

    /**
        True once every video frame has been read, or if there is no video.
    */
    pub fn is_video_eos(&self) -> bool {
        self.video
            .as_ref()
            .is_none_or(|v| v.cursor >= v.frames.len())
    }

    pub fn is_audio_eos(&self) -> bool {
        self.audio
            .as_ref()
            .is_none_or(|a| a.cursor >= a.total_bytes)
    }

    /**
        Read the next video frame, or `None` at end of stream.
    */
    pub fn next_video_sample(&mut self) -> Option<AviPacket> {
        let v = self.video.as_mut()?;
        let frame = *v.frames.get(v.cursor)?;
        let n = v.cursor as u64;
        v.cursor += 1;

        let time = v.rate().ticks_to_time(n);
        Some(AviPacket {
            data: self.data.slice(frame.offset..frame.offset + frame.size),
            time,
            duration: v.rate().ticks_to_time(n + 1).saturating_sub(time),
            is_keyframe: frame.keyframe,
        })
    }

    /**
        Read the next chunk of audio, or `None` at end of stream.
    */
    pub fn next_audio_sample(&mut self) -> Option<AviPacket> {
        let a = self.audio.as_mut()?;
        if a.cursor >= a.total_bytes {
            return None;
        }
        let len = a.read_size.min(a.total_bytes - a.cursor);
        let data = a.read(&self.data, a.cursor, len);
        let time = a.bytes_to_time(a.cursor);
        let duration = a.bytes_to_time(len);
        a.cursor += len;
        Some(AviPacket {
            data,
            time,
            duration,
            is_keyframe: true,
        })
    }

    /**
        Move both read cursors to `position`.

        Video restarts at the last keyframe at or before the target frame,
        audio at the target byte rounded down to a whole sample frame.
        Positions past the end leave the stream at end of stream.
    */
    pub fn set_position(&mut self, position: MediaTime) {
        if let Some(v) = self.video.as_mut() {
            let target = v.rate().time_to_ticks(position);
            v.cursor = match usize::try_from(target) {
                Ok(t) if t < v.frames.len() => v.frames[..=t]
                    .iter()
                    .rposition(|f| f.keyframe)
                    .unwrap_or(0),
                _ => v.frames.len(),
            };
        }
        if let Some(a) = self.audio.as_mut() {
            let bytes = if position.0 <= 0 {
                0
            } else {
                position.0 as u128 * a.format.avg_bytes_per_sec as u128 / TICKS_PER_SECOND as u128
            };
            let align = a.format.block_align as u128;
            a.cursor = (bytes / align * align).min(a.total_bytes as u128) as u64;
        }
        debug!(%position, video = ?self.video.as_ref().map(|v| v.cursor), audio = ?self.audio.as_ref().map(|a| a.cursor), "seek");
    }

    /**
        Time of the next video frame to be read.
    */
    pub fn video_position(&self) -> Option<MediaTime> {
        self.video
            .as_ref()
            .map(|v| v.rate().ticks_to_time(v.cursor as u64))
    }

    /**
        Time of the next audio chunk to be read.
    */
    pub fn audio_position(&self) -> Option<MediaTime> {
        self.audio.as_ref().map(|a| a.bytes_to_time(a.cursor))
    }
}

/**
    Audio read size: the configured duration's worth of bytes, rounded
    up to whole blocks.
*/
fn audio_read_size(format: &AudioFormat, chunk: Duration) -> u64 {
    let align = format.block_align as u64;
    let bytes = (format.avg_bytes_per_sec as u128 * chunk.as_nanos() / 1_000_000_000) as u64;
    ((bytes + align - 1) / align * align).max(align)
}

fn parse_hdrl(mut list: RiffReader<'_>) -> AviResult<(MainHeader, Vec<ParsedStream>)> {
    let mut main_header = None;
    let mut streams = Vec::new();
    while list.remaining() >= CHUNK_HEADER_LEN {
        let header = ChunkHeader::read(&mut list)?;
        let size = header.size as usize;
        let mut chunk = list.sub_reader_lossy(size);
        list.skip_padding(size);

        if header.id == AVIH {
            main_header = Some(MainHeader::parse(chunk)?);
        } else if header.id == LIST && chunk.remaining() >= 4 && chunk.read_fourcc()? == STRL {
            streams.push(parse_strl(chunk)?);
        }
    }
    let main_header = main_header.ok_or(AviError::MissingChunk("avih"))?;
    Ok((main_header, streams))
}

fn parse_strl(mut list: RiffReader<'_>) -> AviResult<ParsedStream> {
    let mut strh = None;
    let mut strf = None;
    while list.remaining() >= CHUNK_HEADER_LEN {
        let header = ChunkHeader::read(&mut list)?;
        let size = header.size as usize;
        let chunk = list.sub_reader_lossy(size);
        list.skip_padding(size);
        if header.id == STRH {
            strh = Some(StreamHeader::parse(chunk)?);
        } else if header.id == STRF {
            strf = Some(chunk);
        }
    }

    let header = strh.ok_or(AviError::MissingChunk("strh"))?;
    if header.fcc_type == VIDS {
        let rate = header
            .unit_rate()
            .ok_or_else(|| AviError::invalid_header("strh", "video rate or scale is zero"))?;
        let strf = strf.ok_or(AviError::MissingChunk("strf"))?;
        let format = parse_video_format(strf, rate)?;
        Ok(ParsedStream::Video(header, format))
    } else if header.fcc_type == AUDS {
        let strf = strf.ok_or(AviError::MissingChunk("strf"))?;
        let format = parse_audio_format(strf)?;
        Ok(ParsedStream::Audio(header, format))
    } else {
        Ok(ParsedStream::Other(header))
    }
}

/**
    Resolve `idx1` entries to payload locations.

    Index offsets are normally relative to the `movi` list type, but some
    writers store absolute file offsets; the first entry decides which.
    Entries that point outside the file are dropped.
*/
fn chunks_from_index(
    data: &[u8],
    movi_pos: usize,
    entries: &[IndexEntry],
) -> Vec<(u32, PayloadKind, ChunkRef)> {
    let header_matches = |base: usize, e: &IndexEntry| {
        let pos = base + e.offset as usize;
        data.get(pos..pos + 4) == Some(e.id.as_bytes().as_slice())
    };
    let base = match entries.iter().find(|e| parse_stream_tag(e.id).is_some()) {
        Some(first) if !header_matches(movi_pos, first) && header_matches(0, first) => 0,
        _ => movi_pos,
    };

    let mut out = Vec::with_capacity(entries.len());
    for e in entries {
        let Some((index, kind)) = parse_stream_tag(e.id) else {
            continue;
        };
        let offset = base + e.offset as usize + CHUNK_HEADER_LEN;
        let size = e.size as usize;
        if offset + size > data.len() {
            warn!(chunk = %e.id, offset, size, "index entry points past end of file");
            continue;
        }
        out.push((
            index,
            kind,
            ChunkRef {
                offset,
                size,
                keyframe: e.is_keyframe(),
            },
        ));
    }
    out
}

/**
    Walk the `movi` list sequentially, descending into `rec ` groups.
    Without an index there are no keyframe flags, so every chunk counts
    as one.
*/
fn scan_movi(mut list: RiffReader<'_>, out: &mut Vec<(u32, PayloadKind, ChunkRef)>) -> AviResult<()> {
    while list.remaining() >= CHUNK_HEADER_LEN {
        let header = ChunkHeader::read(&mut list)?;
        let size = header.size as usize;
        let offset = list.offset();
        let mut chunk = list.sub_reader_lossy(size);
        list.skip_padding(size);

        if header.id == LIST {
            if chunk.remaining() >= 4 && chunk.read_fourcc()? == REC {
                scan_movi(chunk, out)?;
            }
            continue;
        }
        if let Some((index, kind)) = parse_stream_tag(header.id) {
            out.push((
                index,
                kind,
                ChunkRef {
                    offset,
                    size: chunk.remaining(),
                    keyframe: true,
                },
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use media_types::{FourCc, MediaType};

    use super::*;
    use crate::AviWriter;

    const FPS_10: Rational = Rational { num: 10, den: 1 };

    fn video_type() -> MediaType {
        MediaType::Video(VideoFormat {
            fourcc: FourCc::new(b"MJPG"),
            width: 16,
            height: 16,
            bit_count: 24,
            image_size: 0,
            frame_rate: FPS_10,
            extra_data: Vec::new(),
        })
    }

    // 8 kHz mono 16-bit: 16000 bytes per second
    fn audio_type() -> MediaType {
        MediaType::Audio(AudioFormat::pcm(1, 8000, 16))
    }

    /// 10 frames (keyframe every 4th) interleaved with 10 audio chunks of 1600 bytes.
    fn build_file(with_index: bool) -> Vec<u8> {
        let mut w = AviWriter::new(Cursor::new(Vec::new())).with_index(with_index);
        let v = w.add_stream(&video_type()).unwrap();
        let a = w.add_stream(&audio_type()).unwrap();
        for i in 0..10u8 {
            w.write_sample(v, &[i; 5], i % 4 == 0).unwrap();
            w.write_sample(a, &vec![i; 1600], true).unwrap();
        }
        w.finish().unwrap();
        w.into_inner().into_inner()
    }

    #[test]
    fn parses_streams_and_duration() {
        let p = AviParser::parse(build_file(true), &ParserConfig::default()).unwrap();
        assert_eq!(p.video_stream_index(), Some(0));
        assert_eq!(p.audio_stream_index(), Some(1));
        assert_eq!(p.video_frame_count(), 10);
        assert_eq!(p.audio_byte_len(), 16_000);
        assert_eq!(p.duration(), MediaTime::from_millis(1000));
        assert_eq!(p.main_header().total_frames, 10);
        assert!(p.main_header().has_index());
    }

    #[test]
    fn video_samples_carry_time_and_keyframes() {
        let mut p = AviParser::parse(build_file(true), &ParserConfig::default()).unwrap();
        let first = p.next_video_sample().unwrap();
        assert_eq!(first.time, MediaTime::ZERO);
        assert_eq!(first.duration, MediaTime::from_millis(100));
        assert!(first.is_keyframe);
        assert_eq!(&first.data[..], &[0; 5]);

        let second = p.next_video_sample().unwrap();
        assert_eq!(second.time, MediaTime::from_millis(100));
        assert!(!second.is_keyframe);

        for _ in 2..10 {
            assert!(p.next_video_sample().is_some());
        }
        assert!(p.is_video_eos());
        assert!(p.next_video_sample().is_none());
    }

    #[test]
    fn audio_is_rechunked_across_chunk_boundaries() {
        // 250 ms at 16000 B/s = 4000 bytes per read, spanning 1600 byte chunks
        let config = ParserConfig::default().with_audio_chunk_duration(Duration::from_millis(250));
        let mut p = AviParser::parse(build_file(true), &config).unwrap();

        let first = p.next_audio_sample().unwrap();
        assert_eq!(first.data.len(), 4000);
        assert_eq!(first.time, MediaTime::ZERO);
        assert_eq!(first.duration, MediaTime::from_millis(250));
        assert_eq!(&first.data[1599..1601], &[0, 1]);
        assert_eq!(first.data[3999], 2);

        let second = p.next_audio_sample().unwrap();
        assert_eq!(second.time, MediaTime::from_millis(250));
        assert_eq!(second.data[0], 2);

        let mut total = first.data.len() + second.data.len();
        while let Some(s) = p.next_audio_sample() {
            total += s.data.len();
        }
        assert_eq!(total, 16_000);
        assert!(p.is_audio_eos());
    }

    #[test]
    fn default_audio_chunk_is_100ms() {
        let mut p = AviParser::parse(build_file(true), &ParserConfig::default()).unwrap();
        let s = p.next_audio_sample().unwrap();
        assert_eq!(s.data.len(), 1600);
        assert_eq!(s.duration, MediaTime::from_millis(100));
    }

    #[test]
    fn read_size_rounds_up_to_block_align() {
        let mut f = AudioFormat::pcm(2, 44100, 16);
        f.avg_bytes_per_sec = 176_410;
        assert_eq!(audio_read_size(&f, Duration::from_millis(100)), 17_640 + 4);
        assert_eq!(audio_read_size(&f, Duration::ZERO), 4);
    }

    #[test]
    fn sequential_scan_without_index() {
        let mut p = AviParser::parse(build_file(false), &ParserConfig::default()).unwrap();
        assert_eq!(p.video_frame_count(), 10);
        assert_eq!(p.audio_byte_len(), 16_000);
        // no index means no keyframe flags, so every frame is one
        p.next_video_sample().unwrap();
        assert!(p.next_video_sample().unwrap().is_keyframe);
    }

    #[test]
    fn seek_moves_to_previous_keyframe() {
        let mut p = AviParser::parse(build_file(true), &ParserConfig::default()).unwrap();
        p.set_position(MediaTime::from_millis(650));
        // frame 6 is the target, frame 4 the keyframe before it
        assert_eq!(p.video_position(), Some(MediaTime::from_millis(400)));
        let v = p.next_video_sample().unwrap();
        assert!(v.is_keyframe);
        assert_eq!(v.data[0], 4);

        // 650 ms * 16000 B/s = 10400 bytes
        assert_eq!(p.audio_position(), Some(MediaTime::from_millis(650)));
        let a = p.next_audio_sample().unwrap();
        assert_eq!(a.time, MediaTime::from_millis(650));
        assert_eq!(a.data[0], 6);
    }

    #[test]
    fn seek_aligns_audio_to_blocks() {
        let mut p = AviParser::parse(build_file(true), &ParserConfig::default()).unwrap();
        // 625 ticks is one byte, half of a 2-byte block
        p.set_position(MediaTime(625));
        assert_eq!(p.audio_position(), Some(MediaTime::ZERO));
        p.set_position(MediaTime(1250));
        assert_eq!(p.audio_position(), Some(MediaTime(1250)));
    }

    #[test]
    fn seek_past_end_is_end_of_stream() {
        let mut p = AviParser::parse(build_file(true), &ParserConfig::default()).unwrap();
        p.set_position(MediaTime::from_millis(5000));
        assert!(p.is_video_eos());
        assert!(p.is_audio_eos());

        p.set_position(MediaTime::ZERO);
        assert!(!p.is_video_eos());
        assert!(!p.is_audio_eos());
    }

    #[test]
    fn rejects_non_riff() {
        let err = AviParser::parse(b"RIFX\0\0\0\0AVI ".to_vec(), &ParserConfig::default());
        assert!(matches!(err, Err(AviError::NotRiff { .. })));
    }

    #[test]
    fn rejects_non_avi_form() {
        let err = AviParser::parse(b"RIFF\x04\0\0\0WAVE".to_vec(), &ParserConfig::default());
        assert!(matches!(err, Err(AviError::NotAvi { .. })));
    }

    #[test]
    fn missing_header_list() {
        let err = AviParser::parse(b"RIFF\x04\0\0\0AVI ".to_vec(), &ParserConfig::default());
        assert!(matches!(err, Err(AviError::MissingChunk("hdrl"))));
    }

    #[test]
    fn truncated_file_still_parses_complete_chunks() {
        let mut data = build_file(true);
        // drop the index and the tail of movi
        let idx = data.windows(4).rposition(|w| w == b"idx1").unwrap();
        data.truncate(idx - 3000);
        let p = AviParser::parse(data, &ParserConfig::default()).unwrap();
        assert!(p.video_frame_count() < 10);
        assert!(p.video_frame_count() > 0);
    }
}
