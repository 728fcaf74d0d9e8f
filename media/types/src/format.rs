/*!
    Stream format descriptions.

    These mirror what a container stores per stream: the codec tag and
    geometry for video, the wave format for audio. Payloads are carried
    opaquely, so nothing here knows how to decode them.
*/

use serde::Serialize;

use crate::{FourCc, Rational};

/// Wave format tag for integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

const LEGACY_FOURCC_REMAP: &[(&[u8; 4], &[u8; 4])] = &[(b"DIV3", b"MP43"), (b"DIVX", b"MP4V")];

/**
    Video or audio.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
}

impl StreamType {
    pub fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }

    pub fn is_audio(self) -> bool {
        matches!(self, Self::Audio)
    }
}

/**
    Format of a video stream.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VideoFormat {
    /// Compression tag (`H264`, `MJPG`, ...). All zero means uncompressed RGB.
    pub fourcc: FourCc,
    pub width: u32,
    pub height: u32,
    pub bit_count: u16,
    /// Size of one frame in bytes, zero if unknown.
    pub image_size: u32,
    pub frame_rate: Rational,
    #[serde(skip)]
    pub extra_data: Vec<u8>,
}

impl VideoFormat {
    /**
        Codec tag a decoder should be looked up by.

        Some legacy tags are aliases for codecs registered under a
        different tag and are remapped here.
    */
    pub fn decoder_fourcc(&self) -> FourCc {
        LEGACY_FOURCC_REMAP
            .iter()
            .find(|(from, _)| self.fourcc.eq_ignore_case(&FourCc::new(from)))
            .map(|(_, to)| FourCc::new(to))
            .unwrap_or(self.fourcc)
    }
}

/**
    Format of an audio stream.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AudioFormat {
    pub format_tag: u16,
    pub channels: u16,
    pub samples_per_sec: u32,
    pub avg_bytes_per_sec: u32,
    /// Size of one sample frame (all channels) in bytes.
    pub block_align: u16,
    pub bits_per_sample: u16,
    #[serde(skip)]
    pub extra_data: Vec<u8>,
}

impl AudioFormat {
    /**
        Create an integer PCM format.
    */
    pub fn pcm(channels: u16, samples_per_sec: u32, bits_per_sample: u16) -> Self {
        let block_align = channels * bits_per_sample.div_ceil(8);
        Self {
            format_tag: WAVE_FORMAT_PCM,
            channels,
            samples_per_sec,
            avg_bytes_per_sec: samples_per_sec * block_align as u32,
            block_align,
            bits_per_sample,
            extra_data: Vec::new(),
        }
    }

    pub fn is_pcm(&self) -> bool {
        self.format_tag == WAVE_FORMAT_PCM
    }
}

/**
    Full media type of a stream.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaType {
    Video(VideoFormat),
    Audio(AudioFormat),
}

impl MediaType {
    pub fn stream_type(&self) -> StreamType {
        match self {
            Self::Video(_) => StreamType::Video,
            Self::Audio(_) => StreamType::Audio,
        }
    }

    pub fn as_video(&self) -> Option<&VideoFormat> {
        match self {
            Self::Video(v) => Some(v),
            Self::Audio(_) => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioFormat> {
        match self {
            Self::Audio(a) => Some(a),
            Self::Video(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(tag: &[u8; 4]) -> VideoFormat {
        VideoFormat {
            fourcc: FourCc::new(tag),
            width: 320,
            height: 240,
            bit_count: 24,
            image_size: 0,
            frame_rate: Rational { num: 25, den: 1 },
            extra_data: Vec::new(),
        }
    }

    #[test]
    fn legacy_fourcc_remapped() {
        assert_eq!(video(b"DIV3").decoder_fourcc(), FourCc::new(b"MP43"));
        assert_eq!(video(b"divx").decoder_fourcc(), FourCc::new(b"MP4V"));
        assert_eq!(video(b"H264").decoder_fourcc(), FourCc::new(b"H264"));
    }

    #[test]
    fn pcm_derived_fields() {
        let a = AudioFormat::pcm(2, 44100, 16);
        assert!(a.is_pcm());
        assert_eq!(a.block_align, 4);
        assert_eq!(a.avg_bytes_per_sec, 176_400);
    }

    #[test]
    fn media_type_accessors() {
        let mt = MediaType::Video(video(b"MJPG"));
        assert_eq!(mt.stream_type(), StreamType::Video);
        assert!(mt.as_video().is_some());
        assert!(mt.as_audio().is_none());
    }
}
