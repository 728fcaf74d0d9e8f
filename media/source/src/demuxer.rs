/*!
    Container parsers as seen by the source.
*/

use bytes::Bytes;
use media_avi::{AviPacket, AviParser, ParserConfig};
use media_types::{
    Error, MediaTime, MediaType, Result, Sample, StreamDescriptor, StreamId,
};

/**
    A container parser that can hand out samples per stream.

    The source calls [`Demuxer::parse_header`] exactly once, on its command
    processor, before any other method. Every other call also happens on
    the command processor, so implementations need no locking.
*/
pub trait Demuxer: Send {
    /**
        Parse the container header and describe its streams.
    */
    fn parse_header(&mut self) -> Result<Vec<StreamDescriptor>>;

    /**
        Duration of the presentation.
    */
    fn duration(&self) -> MediaTime;

    /**
        Read the next sample of a stream, advancing its cursor.
        Returns [`Error::EndOfStream`] when the stream has no more samples.
    */
    fn next_sample(&mut self, stream: StreamId) -> Result<Sample>;

    /**
        True when the stream's cursor is past its last sample.
    */
    fn is_end_of_stream(&self, stream: StreamId) -> bool;

    /**
        Move every stream's cursor to `position`.
    */
    fn set_position(&mut self, position: MediaTime) -> Result<()>;
}

/**
    [`Demuxer`] for AVI files held in memory.

    Stream ids are the streams' positions in the file's header.
*/
pub struct AviDemuxer {
    data: Option<Bytes>,
    config: ParserConfig,
    parser: Option<AviParser>,
}

impl AviDemuxer {
    pub fn new(data: impl Into<Bytes>, config: ParserConfig) -> Self {
        Self {
            data: Some(data.into()),
            config,
            parser: None,
        }
    }

    fn parser(&self) -> Result<&AviParser> {
        self.parser.as_ref().ok_or(Error::NotInitialized)
    }

    fn parser_mut(&mut self) -> Result<&mut AviParser> {
        self.parser.as_mut().ok_or(Error::NotInitialized)
    }
}

fn to_sample(stream: StreamId, packet: AviPacket) -> Sample {
    Sample::new(stream, packet.data, packet.time)
        .with_duration(packet.duration)
        .with_keyframe(packet.is_keyframe)
}

impl Demuxer for AviDemuxer {
    fn parse_header(&mut self) -> Result<Vec<StreamDescriptor>> {
        let data = self.data.take().ok_or(Error::NotInitialized)?;
        let parser = AviParser::parse(data, &self.config)?;

        let mut streams = Vec::new();
        if let (Some(index), Some(format)) = (parser.video_stream_index(), parser.video_format()) {
            streams.push(StreamDescriptor::new(
                StreamId(index),
                MediaType::Video(format.clone()),
            ));
        }
        if let (Some(index), Some(format)) = (parser.audio_stream_index(), parser.audio_format()) {
            streams.push(StreamDescriptor::new(
                StreamId(index),
                MediaType::Audio(format.clone()),
            ));
        }
        self.parser = Some(parser);
        Ok(streams)
    }

    fn duration(&self) -> MediaTime {
        self.parser
            .as_ref()
            .map(AviParser::duration)
            .unwrap_or(MediaTime::ZERO)
    }

    fn next_sample(&mut self, stream: StreamId) -> Result<Sample> {
        let parser = self.parser_mut()?;
        let packet = if parser.video_stream_index() == Some(stream.0) {
            parser.next_video_sample()
        } else if parser.audio_stream_index() == Some(stream.0) {
            parser.next_audio_sample()
        } else {
            return Err(Error::UnknownStream(stream));
        };
        packet
            .map(|p| to_sample(stream, p))
            .ok_or(Error::EndOfStream)
    }

    fn is_end_of_stream(&self, stream: StreamId) -> bool {
        let Ok(parser) = self.parser() else {
            return true;
        };
        if parser.video_stream_index() == Some(stream.0) {
            parser.is_video_eos()
        } else if parser.audio_stream_index() == Some(stream.0) {
            parser.is_audio_eos()
        } else {
            true
        }
    }

    fn set_position(&mut self, position: MediaTime) -> Result<()> {
        self.parser_mut()?.set_position(position);
        Ok(())
    }
}
