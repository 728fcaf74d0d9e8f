use media_types::{MediaTime, PresentationDescriptor, Result, StreamId};
use tokio::sync::oneshot;

pub(crate) type Reply = oneshot::Sender<Result<()>>;

/**
    Work items for a source's command processor. They are executed one at
    a time in the order they were posted.
*/
pub(crate) enum Command {
    Open {
        reply: Reply,
    },
    Start {
        descriptor: PresentationDescriptor,
        position: Option<MediaTime>,
        reply: Reply,
    },
    Pause {
        reply: Reply,
    },
    Stop {
        reply: Reply,
    },
    /// A stream has room in its queue.
    RequestData,
    /// A stream drained its last sample during the given run.
    EndOfStream { stream: StreamId, epoch: u64 },
    /// Posted by shutdown; ends the processor.
    Terminate,
}

impl Command {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Start { .. } => "start",
            Self::Pause { .. } => "pause",
            Self::Stop { .. } => "stop",
            Self::RequestData => "request data",
            Self::EndOfStream { .. } => "end of stream",
            Self::Terminate => "terminate",
        }
    }
}
