/*!
    AVI muxer.
*/

use std::io::{Cursor, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use media_types::{AudioFormat, FourCc, MediaType, VideoFormat};
use tracing::debug;

use crate::chunk::{
    AUDS, AVI, AVIH, AVIIF_KEYFRAME, HDRL, IDX1, IndexEntry, LIST, MOVI, RIFF, STRF, STRH, STRL,
    VIDS, stream_tag,
};
use crate::error::{AviError, AviResult};
use crate::header::{AVIF_HASINDEX, AVIF_ISINTERLEAVED, MAIN_HEADER_LEN, STREAM_HEADER_LEN};

// RIFF header + hdrl LIST header + avih chunk header
const AVIH_BODY_POS: u64 = 12 + 12 + 8;
const AVIH_TOTAL_FRAMES_POS: u64 = AVIH_BODY_POS + 16;
const AVIH_SUGGESTED_BUFFER_POS: u64 = AVIH_BODY_POS + 28;
const STRH_LENGTH_FIELD: u64 = 32;
const STRH_SUGGESTED_BUFFER_FIELD: u64 = 36;

/// RIFF and `movi` size written by [`AviStreamWriter`], meaning "unknown".
pub const LIVE_LIST_SIZE: u32 = u32::MAX;

struct WriterStream {
    media_type: MediaType,
    tag: FourCc,
    /// Offset of the `strh` body, recorded when the header is written.
    strh_pos: u64,
    samples: u64,
    bytes: u64,
    largest: u32,
}

impl WriterStream {
    /**
        Stream length in `strh` units: frames for video, blocks for audio.
    */
    fn length(&self) -> u64 {
        match &self.media_type {
            MediaType::Video(_) => self.samples,
            MediaType::Audio(a) => self.bytes / a.block_align.max(1) as u64,
        }
    }
}

/**
    Writes samples into an AVI file with a trailing `idx1` index.

    Streams are declared up front with [`AviWriter::add_stream`]; the header
    is emitted with the first sample and patched with the final counts by
    [`AviWriter::finish`].
*/
pub struct AviWriter<W: Write + Seek> {
    writer: W,
    streams: Vec<WriterStream>,
    index: Vec<IndexEntry>,
    write_index: bool,
    /// Offset of the `movi` list type, which index offsets are relative to.
    movi_pos: u64,
    header_written: bool,
    finished: bool,
}

impl<W: Write + Seek> AviWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            streams: Vec::new(),
            index: Vec::new(),
            write_index: true,
            movi_pos: 0,
            header_written: false,
            finished: false,
        }
    }

    /**
        Enable or disable the trailing `idx1` index.
    */
    pub fn with_index(mut self, enabled: bool) -> Self {
        self.write_index = enabled;
        self
    }

    /**
        Declare a stream, returning its index. Must happen before the
        first sample is written.
    */
    pub fn add_stream(&mut self, media_type: &MediaType) -> AviResult<u32> {
        if self.header_written {
            return Err(AviError::Writer("streams must be added before writing samples"));
        }
        if self.streams.len() >= 100 {
            return Err(AviError::Writer("at most 100 streams are supported"));
        }
        let index = self.streams.len() as u32;
        self.streams.push(WriterStream {
            tag: stream_tag(index, media_type.stream_type()),
            media_type: media_type.clone(),
            strh_pos: 0,
            samples: 0,
            bytes: 0,
            largest: 0,
        });
        Ok(index)
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /**
        Append one sample to the `movi` list.
    */
    pub fn write_sample(&mut self, stream: u32, data: &[u8], keyframe: bool) -> AviResult<()> {
        if self.finished {
            return Err(AviError::Writer("writer is already finished"));
        }
        if stream as usize >= self.streams.len() {
            return Err(AviError::UnknownStream(stream));
        }
        if !self.header_written {
            self.write_header()?;
        }

        let chunk_pos = self.writer.stream_position()?;
        let s = &mut self.streams[stream as usize];
        let size = write_chunk(&mut self.writer, s.tag, data)?;

        if self.write_index {
            self.index.push(IndexEntry {
                id: s.tag,
                flags: if keyframe { AVIIF_KEYFRAME } else { 0 },
                offset: (chunk_pos - self.movi_pos) as u32,
                size,
            });
        }
        s.samples += 1;
        s.bytes += size as u64;
        s.largest = s.largest.max(size);
        Ok(())
    }

    /**
        Number of samples written to a stream so far.
    */
    pub fn samples_written(&self, stream: u32) -> u64 {
        self.streams
            .get(stream as usize)
            .map(|s| s.samples)
            .unwrap_or(0)
    }

    /**
        Close the `movi` list, write the index and patch all sizes and
        counts. Calling it again is a no-op.
    */
    pub fn finish(&mut self) -> AviResult<()> {
        if self.finished {
            return Ok(());
        }
        if !self.header_written {
            self.write_header()?;
        }

        let movi_end = self.writer.stream_position()?;
        self.patch_u32(self.movi_pos - 4, movi_end - self.movi_pos)?;

        if self.write_index {
            self.writer.write_all(IDX1.as_bytes())?;
            self.writer
                .write_u32::<LittleEndian>((self.index.len() * IndexEntry::LEN) as u32)?;
            for e in &self.index {
                self.writer.write_all(e.id.as_bytes())?;
                self.writer.write_u32::<LittleEndian>(e.flags)?;
                self.writer.write_u32::<LittleEndian>(e.offset)?;
                self.writer.write_u32::<LittleEndian>(e.size)?;
            }
        }

        let file_end = self.writer.stream_position()?;
        self.patch_u32(4, file_end - 8)?;

        let total_frames = self
            .streams
            .iter()
            .find(|s| s.media_type.stream_type().is_video())
            .map(|s| s.samples)
            .unwrap_or(0);
        let largest = self.streams.iter().map(|s| s.largest).max().unwrap_or(0);
        self.patch_u32(AVIH_TOTAL_FRAMES_POS, total_frames)?;
        self.patch_u32(AVIH_SUGGESTED_BUFFER_POS, largest as u64)?;

        let patches: Vec<_> = self
            .streams
            .iter()
            .map(|s| (s.strh_pos, s.length(), s.largest))
            .collect();
        for (strh_pos, length, largest) in patches {
            self.patch_u32(strh_pos + STRH_LENGTH_FIELD, length)?;
            self.patch_u32(strh_pos + STRH_SUGGESTED_BUFFER_FIELD, largest as u64)?;
        }

        self.writer.seek(SeekFrom::Start(file_end))?;
        self.writer.flush()?;
        self.finished = true;
        debug!(
            bytes = file_end,
            streams = self.streams.len(),
            entries = self.index.len(),
            "AVI finished"
        );
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /**
        Give back the underlying writer.
    */
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> AviResult<()> {
        if self.streams.is_empty() {
            return Err(AviError::NoStreams);
        }

        self.writer.write_all(RIFF.as_bytes())?;
        self.writer.write_u32::<LittleEndian>(0)?;
        self.writer.write_all(AVI.as_bytes())?;

        let hdrl = self.begin_list(HDRL)?;
        self.write_main_header()?;
        for i in 0..self.streams.len() {
            let strl = self.begin_list(STRL)?;
            self.write_stream_header(i)?;
            self.write_stream_format(i)?;
            self.end_list(strl)?;
        }
        self.end_list(hdrl)?;

        self.begin_list(MOVI)?;
        self.movi_pos = self.writer.stream_position()? - 4;
        self.header_written = true;
        Ok(())
    }

    fn write_main_header(&mut self) -> AviResult<()> {
        let video = self
            .streams
            .iter()
            .find_map(|s| s.media_type.as_video().cloned());
        let micro_sec_per_frame = video
            .as_ref()
            .and_then(|v| (1_000_000u64 * v.frame_rate.den as u64).checked_div(v.frame_rate.num as u64))
            .unwrap_or(0) as u32;
        let (width, height) = video.as_ref().map(|v| (v.width, v.height)).unwrap_or((0, 0));

        let w = &mut self.writer;
        w.write_all(AVIH.as_bytes())?;
        w.write_u32::<LittleEndian>(MAIN_HEADER_LEN as u32)?;
        w.write_u32::<LittleEndian>(micro_sec_per_frame)?;
        w.write_u32::<LittleEndian>(0)?; // max bytes per sec
        w.write_u32::<LittleEndian>(0)?; // padding granularity
        let flags = if self.write_index {
            AVIF_HASINDEX | AVIF_ISINTERLEAVED
        } else {
            AVIF_ISINTERLEAVED
        };
        w.write_u32::<LittleEndian>(flags)?;
        w.write_u32::<LittleEndian>(0)?; // total frames, patched
        w.write_u32::<LittleEndian>(0)?; // initial frames
        w.write_u32::<LittleEndian>(self.streams.len() as u32)?;
        w.write_u32::<LittleEndian>(0)?; // suggested buffer size, patched
        w.write_u32::<LittleEndian>(width)?;
        w.write_u32::<LittleEndian>(height)?;
        w.write_all(&[0u8; 16])?;
        Ok(())
    }

    fn write_stream_header(&mut self, i: usize) -> AviResult<()> {
        self.writer.write_all(STRH.as_bytes())?;
        self.writer
            .write_u32::<LittleEndian>(STREAM_HEADER_LEN as u32)?;
        self.streams[i].strh_pos = self.writer.stream_position()?;

        let (fcc_type, handler, scale, rate, sample_size, right, bottom) =
            match &self.streams[i].media_type {
                MediaType::Video(v) => (
                    VIDS,
                    v.fourcc,
                    v.frame_rate.den,
                    v.frame_rate.num,
                    0,
                    v.width.min(i16::MAX as u32) as i16,
                    v.height.min(i16::MAX as u32) as i16,
                ),
                MediaType::Audio(a) => (
                    AUDS,
                    FourCc::default(),
                    a.block_align as u32,
                    a.avg_bytes_per_sec,
                    a.block_align as u32,
                    0,
                    0,
                ),
            };

        let w = &mut self.writer;
        w.write_all(fcc_type.as_bytes())?;
        w.write_all(handler.as_bytes())?;
        w.write_u32::<LittleEndian>(0)?; // flags
        w.write_u16::<LittleEndian>(0)?; // priority
        w.write_u16::<LittleEndian>(0)?; // language
        w.write_u32::<LittleEndian>(0)?; // initial frames
        w.write_u32::<LittleEndian>(scale)?;
        w.write_u32::<LittleEndian>(rate)?;
        w.write_u32::<LittleEndian>(0)?; // start
        w.write_u32::<LittleEndian>(0)?; // length, patched
        w.write_u32::<LittleEndian>(0)?; // suggested buffer size, patched
        w.write_i32::<LittleEndian>(-1)?; // quality
        w.write_u32::<LittleEndian>(sample_size)?;
        w.write_i16::<LittleEndian>(0)?;
        w.write_i16::<LittleEndian>(0)?;
        w.write_i16::<LittleEndian>(right)?;
        w.write_i16::<LittleEndian>(bottom)?;
        Ok(())
    }

    fn write_stream_format(&mut self, i: usize) -> AviResult<()> {
        let body = match &self.streams[i].media_type {
            MediaType::Video(v) => video_format_body(v)?,
            MediaType::Audio(a) => audio_format_body(a)?,
        };
        self.writer.write_all(STRF.as_bytes())?;
        self.writer.write_u32::<LittleEndian>(body.len() as u32)?;
        self.writer.write_all(&body)?;
        if body.len() % 2 == 1 {
            self.writer.write_u8(0)?;
        }
        Ok(())
    }

    /**
        Write a `LIST` header with a placeholder size, returning the
        offset of the size field.
    */
    fn begin_list(&mut self, list_type: FourCc) -> AviResult<u64> {
        self.writer.write_all(LIST.as_bytes())?;
        let size_pos = self.writer.stream_position()?;
        self.writer.write_u32::<LittleEndian>(0)?;
        self.writer.write_all(list_type.as_bytes())?;
        Ok(size_pos)
    }

    fn end_list(&mut self, size_pos: u64) -> AviResult<()> {
        let end = self.writer.stream_position()?;
        self.patch_u32(size_pos, end - size_pos - 4)?;
        self.writer.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    fn patch_u32(&mut self, pos: u64, value: u64) -> AviResult<()> {
        let value = u32::try_from(value).map_err(|_| AviError::Writer("file exceeds 4 GiB"))?;
        self.writer.seek(SeekFrom::Start(pos))?;
        self.writer.write_u32::<LittleEndian>(value)?;
        Ok(())
    }
}

/**
    Writes AVI to a byte stream that cannot seek, such as a socket.

    Sizes that are only known at the end are left as [`LIVE_LIST_SIZE`]
    and no `idx1` index is written, so readers have to walk the `movi`
    list. Each sample is flushed to the underlying writer as soon as it
    has been written.
*/
pub struct AviStreamWriter<W: Write> {
    writer: W,
    /// Builds the header in memory; never receives samples.
    header: AviWriter<Cursor<Vec<u8>>>,
    header_written: bool,
    finished: bool,
}

impl<W: Write> AviStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header: AviWriter::new(Cursor::new(Vec::new())).with_index(false),
            header_written: false,
            finished: false,
        }
    }

    pub fn add_stream(&mut self, media_type: &MediaType) -> AviResult<u32> {
        if self.header_written {
            return Err(AviError::Writer("streams must be added before writing samples"));
        }
        self.header.add_stream(media_type)
    }

    pub fn stream_count(&self) -> usize {
        self.header.stream_count()
    }

    pub fn write_sample(&mut self, stream: u32, data: &[u8]) -> AviResult<()> {
        if self.finished {
            return Err(AviError::Writer("writer is already finished"));
        }
        let Some(s) = self.header.streams.get(stream as usize) else {
            return Err(AviError::UnknownStream(stream));
        };
        let tag = s.tag;
        if !self.header_written {
            self.write_header()?;
        }
        let size = write_chunk(&mut self.writer, tag, data)?;
        self.writer.flush()?;

        let s = &mut self.header.streams[stream as usize];
        s.samples += 1;
        s.bytes += size as u64;
        Ok(())
    }

    pub fn samples_written(&self, stream: u32) -> u64 {
        self.header.samples_written(stream)
    }

    /**
        Write the header if nothing was written yet and flush. Calling it
        again is a no-op.
    */
    pub fn finish(&mut self) -> AviResult<()> {
        if self.finished {
            return Ok(());
        }
        if !self.header_written {
            self.write_header()?;
        }
        self.writer.flush()?;
        self.finished = true;
        debug!(streams = self.stream_count(), "live AVI finished");
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> AviResult<()> {
        self.header.write_header()?;
        let movi_size_pos = self.header.movi_pos as usize - 4;
        let mut bytes = std::mem::take(self.header.writer.get_mut());
        bytes[4..8].copy_from_slice(&LIVE_LIST_SIZE.to_le_bytes());
        bytes[movi_size_pos..movi_size_pos + 4].copy_from_slice(&LIVE_LIST_SIZE.to_le_bytes());
        self.writer.write_all(&bytes)?;
        self.header_written = true;
        debug!(bytes = bytes.len(), "live AVI header written");
        Ok(())
    }
}

/**
    Write one chunk with its pad byte, returning the payload size.
*/
fn write_chunk<W: Write>(w: &mut W, tag: FourCc, data: &[u8]) -> AviResult<u32> {
    let size = u32::try_from(data.len()).map_err(|_| AviError::Writer("sample exceeds 4 GiB"))?;
    w.write_all(tag.as_bytes())?;
    w.write_u32::<LittleEndian>(size)?;
    w.write_all(data)?;
    if size % 2 == 1 {
        w.write_u8(0)?;
    }
    Ok(size)
}

fn video_format_body(v: &VideoFormat) -> AviResult<Vec<u8>> {
    let mut d = Vec::with_capacity(40 + v.extra_data.len());
    d.write_u32::<LittleEndian>((40 + v.extra_data.len()) as u32)?;
    d.write_i32::<LittleEndian>(v.width as i32)?;
    d.write_i32::<LittleEndian>(v.height as i32)?;
    d.write_u16::<LittleEndian>(1)?; // planes
    d.write_u16::<LittleEndian>(v.bit_count)?;
    d.write_all(v.fourcc.as_bytes())?;
    d.write_u32::<LittleEndian>(v.image_size)?;
    d.write_all(&[0u8; 16])?;
    d.write_all(&v.extra_data)?;
    Ok(d)
}

fn audio_format_body(a: &AudioFormat) -> AviResult<Vec<u8>> {
    let mut d = Vec::with_capacity(18 + a.extra_data.len());
    d.write_u16::<LittleEndian>(a.format_tag)?;
    d.write_u16::<LittleEndian>(a.channels)?;
    d.write_u32::<LittleEndian>(a.samples_per_sec)?;
    d.write_u32::<LittleEndian>(a.avg_bytes_per_sec)?;
    d.write_u16::<LittleEndian>(a.block_align)?;
    d.write_u16::<LittleEndian>(a.bits_per_sample)?;
    d.write_u16::<LittleEndian>(a.extra_data.len() as u16)?;
    d.write_all(&a.extra_data)?;
    Ok(d)
}
