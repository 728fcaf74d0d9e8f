/*!
    Shared types for the media pipeline crates.

    This crate is the vocabulary every stage speaks: the source produces
    [`Sample`]s described by a [`PresentationDescriptor`], transforms and
    sinks consume them. It has no knowledge of any container format.

    # Timing

    - [`MediaTime`] - Presentation time in 100ns ticks
    - [`Rational`] - Stream rates (`rate / scale`)

    # Streams

    - [`StreamId`], [`StreamType`] and [`MediaType`] - Stream identity and format
    - [`VideoFormat`] and [`AudioFormat`] - Per-stream format details
    - [`StreamDescriptor`] and [`PresentationDescriptor`] - Stream catalog
    - [`FourCc`] - Codec and chunk tags

    # Data Flow

    - [`Sample`] - One timestamped buffer
    - [`BoundedQueue`] - Fixed-capacity FIFO between stages

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod error;
mod format;
mod fourcc;
mod queue;
mod rational;
mod sample;
mod stream;
mod time;

pub use error::{Error, Result};
pub use format::{AudioFormat, MediaType, StreamType, VideoFormat, WAVE_FORMAT_PCM};
pub use fourcc::FourCc;
pub use queue::BoundedQueue;
pub use rational::Rational;
pub use sample::Sample;
pub use stream::{PresentationDescriptor, StreamDescriptor, StreamId};
pub use time::{MediaTime, TICKS_PER_SECOND};

static_assertions::assert_impl_all!(Sample: Send, Sync, Clone);
static_assertions::assert_impl_all!(PresentationDescriptor: Send, Sync, Clone);
static_assertions::assert_impl_all!(Error: Send, Sync);
