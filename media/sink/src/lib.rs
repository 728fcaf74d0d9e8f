/*!
    Timestamp-ordered media output for the media pipeline crates.

    A [`MediaSink`] receives samples from several streams, each at its own
    pace, and writes them into a single container in timestamp order.

    # Basic Usage

    ```ignore
    use media_sink::{MediaSink, SinkConfig};

    let mut sink = MediaSink::file("output.avi", SinkConfig::avi())?;
    sink.add_stream(video_id, &video_type)?;
    sink.add_stream(audio_id, &audio_type)?;
    sink.start()?;

    // from any number of producers, respecting needs_data()
    sink.process_sample(sample)?;

    // when a stream runs out
    sink.end_of_stream(audio_id)?;

    // complete the file (critical!)
    sink.finalize()?;
    ```

    # Ordering

    The sink only writes when every stream that has not ended has at least
    one sample queued, and then writes the earliest one. Streams signal
    the end with [`MediaSink::end_of_stream`] so the others stop waiting
    for them. See [`select_earliest`].

    # Output

    - [`AviFileWriter`] - AVI files on disk
    - [`AviByteStreamWriter`] - AVI without an index, for sockets and pipes
    - [`MemoryWriter`] - Keeps samples in memory for inspection
    - Anything implementing [`SampleWriter`]
*/

mod config;
mod scheduler;
mod sink;
mod stream_sink;
mod writer;

pub use config::{ContainerFormat, DEFAULT_QUEUE_CAPACITY, SinkConfig};
pub use scheduler::{Selection, select_earliest, select_queued};
pub use sink::{MediaSink, SinkState};
pub use stream_sink::StreamSink;
pub use writer::{AviByteStreamWriter, AviFileWriter, MemoryWriter, SampleWriter};

static_assertions::assert_impl_all!(MediaSink<AviFileWriter>: Send);
static_assertions::assert_impl_all!(MediaSink<MemoryWriter>: Send);
static_assertions::assert_impl_all!(MediaSink<AviByteStreamWriter<Vec<u8>>>: Send);
