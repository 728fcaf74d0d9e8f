/*!
    RIFF chunk identifiers and the `idx1` index.
*/

use media_types::{FourCc, StreamType};

use crate::error::AviResult;
use crate::reader::RiffReader;

pub const RIFF: FourCc = FourCc::new(b"RIFF");
pub const LIST: FourCc = FourCc::new(b"LIST");
pub const AVI: FourCc = FourCc::new(b"AVI ");
pub const HDRL: FourCc = FourCc::new(b"hdrl");
pub const AVIH: FourCc = FourCc::new(b"avih");
pub const STRL: FourCc = FourCc::new(b"strl");
pub const STRH: FourCc = FourCc::new(b"strh");
pub const STRF: FourCc = FourCc::new(b"strf");
pub const MOVI: FourCc = FourCc::new(b"movi");
pub const REC: FourCc = FourCc::new(b"rec ");
pub const IDX1: FourCc = FourCc::new(b"idx1");
pub const VIDS: FourCc = FourCc::new(b"vids");
pub const AUDS: FourCc = FourCc::new(b"auds");

/// `idx1` flag marking a chunk as a keyframe.
pub const AVIIF_KEYFRAME: u32 = 0x10;

/// Size of a chunk header (id + size).
pub const CHUNK_HEADER_LEN: usize = 8;

/**
    Header of a single RIFF chunk.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: FourCc,
    pub size: u32,
}

impl ChunkHeader {
    pub fn read(r: &mut RiffReader<'_>) -> AviResult<Self> {
        let id = r.read_fourcc()?;
        let size = r.read_u32()?;
        Ok(Self { id, size })
    }
}

/**
    Kind of data carried by a `movi` chunk.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// `dc` compressed or `db` uncompressed video.
    Video,
    /// `wb` audio.
    Audio,
    /// Palette changes, subtitles and anything else.
    Other,
}

/**
    Decode a stream chunk id such as `00dc` or `01wb` into the stream
    index and payload kind. Returns `None` for ids without two leading
    decimal digits.
*/
pub fn parse_stream_tag(id: FourCc) -> Option<(u32, PayloadKind)> {
    let [d0, d1, t0, t1] = id.0;
    if !d0.is_ascii_digit() || !d1.is_ascii_digit() {
        return None;
    }
    let index = ((d0 - b'0') * 10 + (d1 - b'0')) as u32;
    let kind = match &[t0, t1] {
        b"dc" | b"db" => PayloadKind::Video,
        b"wb" => PayloadKind::Audio,
        _ => PayloadKind::Other,
    };
    Some((index, kind))
}

/**
    Chunk id used for a stream's payload chunks. Indices above 99
    cannot be expressed and wrap.
*/
pub fn stream_tag(index: u32, stream_type: StreamType) -> FourCc {
    let index = (index % 100) as u8;
    let suffix = match stream_type {
        StreamType::Video => b"dc",
        StreamType::Audio => b"wb",
    };
    FourCc([b'0' + index / 10, b'0' + index % 10, suffix[0], suffix[1]])
}

/**
    One 16-byte entry of the legacy `idx1` index.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: FourCc,
    pub flags: u32,
    /// Offset of the chunk header, relative to the `movi` fourcc or absolute.
    pub offset: u32,
    pub size: u32,
}

impl IndexEntry {
    pub const LEN: usize = 16;

    pub fn is_keyframe(&self) -> bool {
        self.flags & AVIIF_KEYFRAME != 0
    }

    pub fn read(r: &mut RiffReader<'_>) -> AviResult<Self> {
        Ok(Self {
            id: r.read_fourcc()?,
            flags: r.read_u32()?,
            offset: r.read_u32()?,
            size: r.read_u32()?,
        })
    }
}

/**
    Parse all complete entries of an `idx1` chunk body.
    A trailing partial entry is ignored.
*/
pub fn read_index(mut r: RiffReader<'_>) -> AviResult<Vec<IndexEntry>> {
    let mut entries = Vec::with_capacity(r.remaining() / IndexEntry::LEN);
    while r.remaining() >= IndexEntry::LEN {
        entries.push(IndexEntry::read(&mut r)?);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stream_tags() {
        assert_eq!(
            parse_stream_tag(FourCc::new(b"00dc")),
            Some((0, PayloadKind::Video))
        );
        assert_eq!(
            parse_stream_tag(FourCc::new(b"01wb")),
            Some((1, PayloadKind::Audio))
        );
        assert_eq!(
            parse_stream_tag(FourCc::new(b"12db")),
            Some((12, PayloadKind::Video))
        );
        assert_eq!(
            parse_stream_tag(FourCc::new(b"02pc")),
            Some((2, PayloadKind::Other))
        );
        assert_eq!(parse_stream_tag(FourCc::new(b"JUNK")), None);
    }

    #[test]
    fn stream_tags_for_writing() {
        assert_eq!(stream_tag(0, StreamType::Video), FourCc::new(b"00dc"));
        assert_eq!(stream_tag(11, StreamType::Audio), FourCc::new(b"11wb"));
    }

    #[test]
    fn index_entries() {
        let mut data = Vec::new();
        for (id, flags, offset) in [(b"00dc", 0x10u32, 4u32), (b"01wb", 0, 20)] {
            data.extend_from_slice(id);
            data.extend_from_slice(&flags.to_le_bytes());
            data.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(&8u32.to_le_bytes());
        }
        data.extend_from_slice(&[1, 2, 3]);

        let entries = read_index(RiffReader::new(&data)).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_keyframe());
        assert!(!entries[1].is_keyframe());
        assert_eq!(entries[1].offset, 20);
    }
}
