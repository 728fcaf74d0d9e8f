/*!
    Parsing of the `avih`, `strh` and `strf` header chunks.
*/

use media_types::{AudioFormat, FourCc, Rational, VideoFormat};

use crate::error::{AviError, AviResult};
use crate::reader::RiffReader;

/// `avih` flag: the file carries an `idx1` index.
pub const AVIF_HASINDEX: u32 = 0x10;
/// `avih` flag: chunks are interleaved.
pub const AVIF_ISINTERLEAVED: u32 = 0x100;

/// Length of the `avih` body.
pub const MAIN_HEADER_LEN: usize = 56;
/// Length of the `strh` body written by [`crate::AviWriter`].
pub const STREAM_HEADER_LEN: usize = 56;
const STREAM_HEADER_MIN_LEN: usize = 48;
const BITMAP_INFO_LEN: usize = 40;
const WAVE_FORMAT_MIN_LEN: usize = 16;

/**
    The `avih` main header.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MainHeader {
    pub micro_sec_per_frame: u32,
    pub max_bytes_per_sec: u32,
    pub flags: u32,
    pub total_frames: u32,
    pub initial_frames: u32,
    pub streams: u32,
    pub suggested_buffer_size: u32,
    pub width: u32,
    pub height: u32,
}

impl MainHeader {
    pub fn parse(mut r: RiffReader<'_>) -> AviResult<Self> {
        if r.remaining() < MAIN_HEADER_LEN {
            return Err(AviError::invalid_header(
                "avih",
                format!("{} bytes, expected {MAIN_HEADER_LEN}", r.remaining()),
            ));
        }
        let micro_sec_per_frame = r.read_u32()?;
        let max_bytes_per_sec = r.read_u32()?;
        r.skip(4)?; // padding granularity
        let flags = r.read_u32()?;
        let total_frames = r.read_u32()?;
        let initial_frames = r.read_u32()?;
        let streams = r.read_u32()?;
        let suggested_buffer_size = r.read_u32()?;
        let width = r.read_u32()?;
        let height = r.read_u32()?;
        Ok(Self {
            micro_sec_per_frame,
            max_bytes_per_sec,
            flags,
            total_frames,
            initial_frames,
            streams,
            suggested_buffer_size,
            width,
            height,
        })
    }

    pub fn has_index(&self) -> bool {
        self.flags & AVIF_HASINDEX != 0
    }
}

/**
    The `strh` stream header.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    pub fcc_type: FourCc,
    pub handler: FourCc,
    pub flags: u32,
    pub initial_frames: u32,
    pub scale: u32,
    pub rate: u32,
    pub start: u32,
    /// Stream length in units of `scale / rate` seconds.
    pub length: u32,
    pub suggested_buffer_size: u32,
    pub sample_size: u32,
}

impl StreamHeader {
    pub fn parse(mut r: RiffReader<'_>) -> AviResult<Self> {
        if r.remaining() < STREAM_HEADER_MIN_LEN {
            return Err(AviError::invalid_header(
                "strh",
                format!("{} bytes, expected at least {STREAM_HEADER_MIN_LEN}", r.remaining()),
            ));
        }
        let fcc_type = r.read_fourcc()?;
        let handler = r.read_fourcc()?;
        let flags = r.read_u32()?;
        r.skip(4)?; // priority + language
        let initial_frames = r.read_u32()?;
        let scale = r.read_u32()?;
        let rate = r.read_u32()?;
        let start = r.read_u32()?;
        let length = r.read_u32()?;
        let suggested_buffer_size = r.read_u32()?;
        r.skip(4)?; // quality
        let sample_size = r.read_u32()?;
        Ok(Self {
            fcc_type,
            handler,
            flags,
            initial_frames,
            scale,
            rate,
            start,
            length,
            suggested_buffer_size,
            sample_size,
        })
    }

    /**
        Units per second as `rate / scale`, if both are non-zero.
    */
    pub fn unit_rate(&self) -> Option<Rational> {
        Rational::new(self.rate, self.scale)
    }
}

/**
    Parse a `BITMAPINFOHEADER` video `strf` body.
*/
pub fn parse_video_format(mut r: RiffReader<'_>, frame_rate: Rational) -> AviResult<VideoFormat> {
    if r.remaining() < BITMAP_INFO_LEN {
        return Err(AviError::invalid_header(
            "strf",
            format!("video format is {} bytes, expected {BITMAP_INFO_LEN}", r.remaining()),
        ));
    }
    let declared = r.read_u32()? as usize;
    let width = r.read_i32()?;
    let height = r.read_i32()?;
    r.skip(2)?; // planes
    let bit_count = r.read_u16()?;
    let fourcc = r.read_fourcc()?;
    let image_size = r.read_u32()?;
    r.skip(16)?; // pels per meter, palette counts

    let extra_len = declared
        .saturating_sub(BITMAP_INFO_LEN)
        .min(r.remaining());
    let extra_data = r.read_bytes(extra_len)?.to_vec();

    Ok(VideoFormat {
        fourcc,
        width: width.unsigned_abs(),
        height: height.unsigned_abs(),
        bit_count,
        image_size,
        frame_rate,
        extra_data,
    })
}

/**
    Parse a `WAVEFORMATEX` audio `strf` body.

    A zero average byte rate is recomputed from the sample rate and block
    alignment, since audio timestamps are derived from it.
*/
pub fn parse_audio_format(mut r: RiffReader<'_>) -> AviResult<AudioFormat> {
    if r.remaining() < WAVE_FORMAT_MIN_LEN {
        return Err(AviError::invalid_header(
            "strf",
            format!("audio format is {} bytes, expected at least {WAVE_FORMAT_MIN_LEN}", r.remaining()),
        ));
    }
    let format_tag = r.read_u16()?;
    let channels = r.read_u16()?;
    let samples_per_sec = r.read_u32()?;
    let mut avg_bytes_per_sec = r.read_u32()?;
    let block_align = r.read_u16()?;
    let bits_per_sample = r.read_u16()?;

    let extra_data = if r.remaining() >= 2 {
        let extra_len = (r.read_u16()? as usize).min(r.remaining());
        r.read_bytes(extra_len)?.to_vec()
    } else {
        Vec::new()
    };

    if block_align == 0 {
        return Err(AviError::invalid_header("strf", "block align is zero"));
    }
    if avg_bytes_per_sec == 0 {
        avg_bytes_per_sec = samples_per_sec.saturating_mul(block_align as u32);
    }
    if avg_bytes_per_sec == 0 {
        return Err(AviError::invalid_header("strf", "audio byte rate is zero"));
    }

    Ok(AudioFormat {
        format_tag,
        channels,
        samples_per_sec,
        avg_bytes_per_sec,
        block_align,
        bits_per_sample,
        extra_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave_format(avg: u32, block_align: u16, extra: &[u8]) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&1u16.to_le_bytes());
        d.extend_from_slice(&2u16.to_le_bytes());
        d.extend_from_slice(&22050u32.to_le_bytes());
        d.extend_from_slice(&avg.to_le_bytes());
        d.extend_from_slice(&block_align.to_le_bytes());
        d.extend_from_slice(&16u16.to_le_bytes());
        d.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        d.extend_from_slice(extra);
        d
    }

    #[test]
    fn audio_format_with_extra_data() {
        let d = wave_format(88200, 4, &[9, 8]);
        let f = parse_audio_format(RiffReader::new(&d)).unwrap();
        assert_eq!(f.channels, 2);
        assert_eq!(f.avg_bytes_per_sec, 88200);
        assert_eq!(f.extra_data, vec![9, 8]);
        assert!(f.is_pcm());
    }

    #[test]
    fn zero_byte_rate_recomputed() {
        let d = wave_format(0, 4, &[]);
        let f = parse_audio_format(RiffReader::new(&d)).unwrap();
        assert_eq!(f.avg_bytes_per_sec, 88200);
    }

    #[test]
    fn zero_block_align_rejected() {
        let d = wave_format(88200, 0, &[]);
        assert!(parse_audio_format(RiffReader::new(&d)).is_err());
    }

    #[test]
    fn video_format_negative_height() {
        let mut d = Vec::new();
        d.extend_from_slice(&40u32.to_le_bytes());
        d.extend_from_slice(&64i32.to_le_bytes());
        d.extend_from_slice(&(-48i32).to_le_bytes());
        d.extend_from_slice(&1u16.to_le_bytes());
        d.extend_from_slice(&24u16.to_le_bytes());
        d.extend_from_slice(b"MJPG");
        d.extend_from_slice(&[0u8; 20]);
        let rate = Rational::new(25, 1).unwrap();
        let f = parse_video_format(RiffReader::new(&d), rate).unwrap();
        assert_eq!((f.width, f.height), (64, 48));
        assert_eq!(f.fourcc, FourCc::new(b"MJPG"));
        assert!(f.extra_data.is_empty());
    }

    #[test]
    fn short_stream_header_rejected() {
        let d = [0u8; 20];
        assert!(matches!(
            StreamHeader::parse(RiffReader::new(&d)),
            Err(AviError::InvalidHeader { chunk: "strh", .. })
        ));
    }
}
