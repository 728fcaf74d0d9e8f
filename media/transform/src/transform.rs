/*!
    The transform trait and the pass-through stage.
*/

use media_types::{Error, MediaType, Result, Sample};

/**
    Result of asking a transform for output.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformOutput {
    Sample(Sample),
    /// Nothing is held; feed more input.
    NeedMoreInput,
}

/**
    A processing stage between a source and a sink.

    Stages follow an input/output handshake: after
    [`Transform::process_input`] accepts a sample, the caller drains
    [`Transform::process_output`] until it returns
    [`TransformOutput::NeedMoreInput`]. A stage holding undrained output
    refuses input with [`Error::NotAccepting`].
*/
pub trait Transform: Send {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /**
        Declare the format of incoming samples. Must be called before
        any input is processed and may be called again to change formats.
    */
    fn set_input_type(&mut self, media_type: &MediaType) -> Result<()>;

    /**
        Format of outgoing samples, once an input type is set.
    */
    fn output_type(&self) -> Option<MediaType>;

    fn process_input(&mut self, sample: Sample) -> Result<()>;

    fn process_output(&mut self) -> Result<TransformOutput>;

    /**
        Discard any held output, for example after a seek.
    */
    fn flush(&mut self);
}

/**
    Single-sample output buffer shared by the built-in stages.
*/
#[derive(Debug, Default)]
pub(crate) struct OutputSlot {
    held: Option<Sample>,
}

impl OutputSlot {
    pub fn put(&mut self, sample: Sample) -> Result<()> {
        if self.held.is_some() {
            return Err(Error::NotAccepting);
        }
        self.held = Some(sample);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.held.is_some()
    }

    pub fn take(&mut self) -> TransformOutput {
        match self.held.take() {
            Some(sample) => TransformOutput::Sample(sample),
            None => TransformOutput::NeedMoreInput,
        }
    }

    pub fn clear(&mut self) {
        self.held = None;
    }
}

/**
    A stage that hands every sample through unchanged.
*/
#[derive(Debug, Default)]
pub struct Passthrough {
    media_type: Option<MediaType>,
    slot: OutputSlot,
}

impl Passthrough {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn set_input_type(&mut self, media_type: &MediaType) -> Result<()> {
        self.media_type = Some(media_type.clone());
        Ok(())
    }

    fn output_type(&self) -> Option<MediaType> {
        self.media_type.clone()
    }

    fn process_input(&mut self, sample: Sample) -> Result<()> {
        if self.media_type.is_none() {
            return Err(Error::NotInitialized);
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
