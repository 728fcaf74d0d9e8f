/*!
    Volume scaling for PCM audio.
*/

use bytes::Bytes;
use media_types::{AudioFormat, Error, MediaType, Result, Sample};
use tracing::debug;

use crate::transform::{OutputSlot, Transform, TransformOutput};

/**
    Scales PCM audio by a constant factor.

    Supports 8-bit unsigned and 16-bit signed little-endian samples.
    Results that fall outside the sample range are clamped.
*/
#[derive(Debug)]
pub struct AudioGain {
    gain: f32,
    format: Option<AudioFormat>,
    slot: OutputSlot,
}

impl AudioGain {
    /**
        Create a gain stage. `gain` must be finite and not negative;
        1.0 leaves the audio unchanged.
    */
    pub fn new(gain: f32) -> Result<Self> {
        if !gain.is_finite() || gain < 0.0 {
            return Err(Error::invalid_config(format!("invalid gain {gain}")));
        }
        Ok(Self {
            gain,
            format: None,
            slot: OutputSlot::default(),
        })
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    fn scale(&self, bits: u16, data: &[u8]) -> Bytes {
        let mut out = Vec::with_capacity(data.len());
        match bits {
            8 => {
                out.extend(data.iter().map(|&b| {
                    let v = (f32::from(b) - 128.0) * self.gain;
                    (v.round().clamp(-128.0, 127.0) + 128.0) as u8
                }));
            }
            _ => {
                let mut chunks = data.chunks_exact(2);
                for pair in &mut chunks {
                    let v = f32::from(i16::from_le_bytes([pair[0], pair[1]])) * self.gain;
                    let v = v.round().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
                    out.extend_from_slice(&v.to_le_bytes());
                }
                out.extend_from_slice(chunks.remainder());
            }
        }
        Bytes::from(out)
    }
}

impl Transform for AudioGain {
    fn name(&self) -> &'static str {
        "gain"
    }

    fn set_input_type(&mut self, media_type: &MediaType) -> Result<()> {
        let Some(audio) = media_type.as_audio() else {
            return Err(Error::unsupported_format("gain only applies to audio"));
        };
        if !audio.is_pcm() || !matches!(audio.bits_per_sample, 8 | 16) {
            return Err(Error::unsupported_format(format!(
                "gain needs 8 or 16 bit PCM, got format tag {:#06x} with {} bits",
                audio.format_tag, audio.bits_per_sample
            )));
        }
        debug!(gain = self.gain, bits = audio.bits_per_sample, "gain configured");
        self.format = Some(audio.clone());
        Ok(())
    }

    fn output_type(&self) -> Option<MediaType> {
        self.format.clone().map(MediaType::Audio)
    }

    fn process_input(&mut self, mut sample: Sample) -> Result<()> {
        let bits = self
            .format
            .as_ref()
            .ok_or(Error::NotInitialized)?
            .bits_per_sample;
        if self.slot.is_full() {
            return Err(Error::NotAccepting);
        }
        if self.gain != 1.0 {
            sample.data = self.scale(bits, &sample.data);
        }
        self.slot.put(sample)
    }

    fn process_output(&mut self) -> Result<TransformOutput> {
        Ok(self.slot.take())
    }

    fn flush(&mut self) {
        self.slot.clear();
    }
}
