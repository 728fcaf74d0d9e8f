/*!
    Ordered chains of transforms.
*/

use media_types::{MediaType, Result, Sample};
use tracing::debug;

use crate::transform::{Transform, TransformOutput};

/**
    Transforms applied one after another.

    An empty chain passes samples through untouched.
*/
#[derive(Default)]
pub struct TransformChain {
    stages: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Append a stage to the end of the chain.
    */
    pub fn with_stage(mut self, stage: impl Transform + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn Transform>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /**
        Configure every stage, feeding each one the output type of the
        stage before it. Returns the type leaving the chain.
    */
    pub fn set_input_type(&mut self, media_type: &MediaType) -> Result<MediaType> {
        let mut current = media_type.clone();
        for stage in &mut self.stages {
            stage.set_input_type(&current)?;
            if let Some(next) = stage.output_type() {
                current = next;
            }
            debug!(stage = stage.name(), "stage configured");
        }
        Ok(current)
    }

    /**
        Run one sample through every stage and collect what comes out.
    */
    pub fn process(&mut self, sample: Sample) -> Result<Vec<Sample>> {
        let mut current = vec![sample];
        for stage in &mut self.stages {
            let mut next = Vec::with_capacity(current.len());
            for sample in current {
                stage.process_input(sample)?;
                while let TransformOutput::Sample(out) = stage.process_output()? {
                    next.push(out);
                }
            }
            current = next;
        }
        Ok(current)
    }

    /**
        Discard output held by any stage.
    */
    pub fn flush(&mut self) {
        for stage in &mut self.stages {
            stage.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use media_types::{AudioFormat, Error, FourCc, MediaTime, Rational, StreamId, VideoFormat};

    use super::*;
    use crate::{AudioGain, Passthrough, TimeShift};

    fn pcm() -> MediaType {
        MediaType::Audio(AudioFormat::pcm(1, 8000, 8))
    }

    fn sample(ms: i64, data: Vec<u8>) -> Sample {
        Sample::new(StreamId(1), data, MediaTime::from_millis(ms))
    }

    #[test]
    fn empty_chain_passes_through() {
        let mut chain = TransformChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.set_input_type(&pcm()).unwrap(), pcm());
        let s = sample(40, vec![1, 2, 3]);
        assert_eq!(chain.process(s.clone()).unwrap(), vec![s]);
    }

    #[test]
    fn stages_run_in_order() {
        let mut chain = TransformChain::new()
            .with_stage(TimeShift::new(MediaTime::from_millis(-100)))
            .with_stage(AudioGain::new(2.0).unwrap())
            .with_stage(Passthrough::new());
        assert_eq!(chain.stage_names(), vec!["time shift", "gain", "passthrough"]);
        chain.set_input_type(&pcm()).unwrap();

        let out = chain.process(sample(300, vec![130])).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time, MediaTime::from_millis(200));
        assert_eq!(out[0].data.as_ref(), &[132]);
    }

    #[test]
    fn process_before_configuration_fails() {
        let mut chain = TransformChain::new().with_stage(Passthrough::new());
        assert!(matches!(
            chain.process(sample(0, vec![0])),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn incompatible_stage_rejects_type() {
        let mut chain = TransformChain::new().with_stage(AudioGain::new(1.5).unwrap());
        let video = MediaType::Video(VideoFormat {
            fourcc: FourCc::new(b"MJPG"),
            width: 8,
            height: 8,
            bit_count: 24,
            image_size: 0,
            frame_rate: Rational { num: 25, den: 1 },
            extra_data: Vec::new(),
        });
        assert!(chain.set_input_type(&video).is_err());
    }
}
