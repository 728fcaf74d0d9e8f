/*!
    Output backends for the sink.
*/

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use media_avi::{AviStreamWriter, AviWriter};
use media_types::{MediaType, Result, Sample};
use tracing::{debug, info};

/**
    Destination the sink writes ordered samples into.
*/
pub trait SampleWriter: Send {
    /**
        Declare an output stream, returning the index samples for it are
        written under. All streams are declared before the first write.
    */
    fn add_stream(&mut self, media_type: &MediaType) -> Result<u32>;

    fn write_sample(&mut self, stream: u32, sample: &Sample) -> Result<()>;

    /**
        Complete the output. Called once, after the last sample.
    */
    fn finish(&mut self) -> Result<()>;
}

/**
    Writes an AVI file to disk.
*/
pub struct AviFileWriter {
    path: PathBuf,
    avi: AviWriter<BufWriter<File>>,
}

impl AviFileWriter {
    /**
        Create (or truncate) the file at `path`.
    */
    pub fn create(path: impl AsRef<Path>, write_index: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            avi: AviWriter::new(BufWriter::new(file)).with_index(write_index),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleWriter for AviFileWriter {
    fn add_stream(&mut self, media_type: &MediaType) -> Result<u32> {
        Ok(self.avi.add_stream(media_type)?)
    }

    fn write_sample(&mut self, stream: u32, sample: &Sample) -> Result<()> {
        Ok(self
            .avi
            .write_sample(stream, &sample.data, sample.is_keyframe)?)
    }

    fn finish(&mut self) -> Result<()> {
        self.avi.finish()?;
        info!(path = %self.path.display(), "output written");
        Ok(())
    }
}

/**
    Writes AVI to a byte stream that cannot seek, such as an HTTP
    response body. The output has no index.
*/
pub struct AviByteStreamWriter<W: Write + Send> {
    avi: AviStreamWriter<W>,
}

impl<W: Write + Send> AviByteStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            avi: AviStreamWriter::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.avi.into_inner()
    }
}

impl<W: Write + Send> SampleWriter for AviByteStreamWriter<W> {
    fn add_stream(&mut self, media_type: &MediaType) -> Result<u32> {
        Ok(self.avi.add_stream(media_type)?)
    }

    fn write_sample(&mut self, stream: u32, sample: &Sample) -> Result<()> {
        Ok(self.avi.write_sample(stream, &sample.data)?)
    }

    fn finish(&mut self) -> Result<()> {
        self.avi.finish()?;
        debug!(streams = self.avi.stream_count(), "byte stream finished");
        Ok(())
    }
}

/**
    Keeps everything written to it, for inspection.
*/
#[derive(Debug, Default)]
pub struct MemoryWriter {
    pub streams: Vec<MediaType>,
    /// Written samples with the stream index they were written under.
    pub samples: Vec<(u32, Sample)>,
    pub finish_calls: usize,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finish_calls > 0
    }
}

impl SampleWriter for MemoryWriter {
    fn add_stream(&mut self, media_type: &MediaType) -> Result<u32> {
        self.streams.push(media_type.clone());
        Ok(self.streams.len() as u32 - 1)
    }

    fn write_sample(&mut self, stream: u32, sample: &Sample) -> Result<()> {
        self.samples.push((stream, sample.clone()));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finish_calls += 1;
        Ok(())
    }
}
