/*!
    Timestamp offsetting.
*/

use media_types::{Error, MediaTime, MediaType, Result, Sample};

use crate::transform::{OutputSlot, Transform, TransformOutput};

/**
    Adds a fixed offset to every sample's timestamp.

    A negative offset moves samples earlier; times that would become
    negative are clamped to zero. Used to rebase a presentation that
    starts mid-file so that its output begins at zero.
*/
#[derive(Debug)]
pub struct TimeShift {
    offset: MediaTime,
    media_type: Option<MediaType>,
    slot: OutputSlot,
}

impl TimeShift {
    pub fn new(offset: MediaTime) -> Self {
        Self {
            offset,
            media_type: None,
            slot: OutputSlot::default(),
        }
    }

    pub fn offset(&self) -> MediaTime {
        self.offset
    }
}

impl Transform for TimeShift {
    fn name(&self) -> &'static str {
        "time shift"
    }

    fn set_input_type(&mut self, media_type: &MediaType) -> Result<()> {
        self.media_type = Some(media_type.clone());
        Ok(())
    }

    fn output_type(&self) -> Option<MediaType> {
        self.media_type.clone()
    }

    fn process_input(&mut self, mut sample: Sample) -> Result<()> {
        if self.media_type.is_none() {
            return Err(Error::NotInitialized);
        }
        sample.time = sample.time.saturating_add(self.offset).max(MediaTime::ZERO);
        self.slot.put(sample)
    }

    fn process_output(&mut self) -> Result<TransformOutput> {
        Ok(self.slot.take())
    }

    fn flush(&mut self) {
        self.slot.clear();
    }
}
