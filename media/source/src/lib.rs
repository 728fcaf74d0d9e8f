/*!
    Demand-driven media source.

    A [`MediaSource`] opens a container, describes its streams with a
    [`PresentationDescriptor`](media_types::PresentationDescriptor) and
    then serves [`Sample`](media_types::Sample)s only as fast as they are
    asked for. Consumers talk to each elementary stream through a
    [`SourceStream`] handle.

    # Lifecycle

    ```text
    Uninitialized -> Opening -> Stopped <-> Started <-> Paused
                                   \___________\___________\___> Shutdown
    ```

    Start, pause and stop are serialized on one command processor task,
    so their effects are observed in the order they were issued.

    # Events

    - [`SourceEvent`] - Presentation level notifications
    - [`StreamEvent`] - Samples and per-stream notifications
*/

mod command;
mod config;
mod demuxer;
mod event;
mod source;
mod state;
mod stream;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_QUEUE_DEPTH, SourceConfig};
pub use demuxer::{AviDemuxer, Demuxer};
pub use event::{SourceEvent, StreamEvent};
pub use source::{MediaSource, SourceCharacteristics};
pub use state::{SourceState, StreamState};
pub use stream::SourceStream;

static_assertions::assert_impl_all!(MediaSource: Send, Sync);
static_assertions::assert_impl_all!(SourceStream: Send, Sync, Clone);
