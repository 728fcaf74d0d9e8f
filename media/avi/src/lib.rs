/*!
    AVI container support for the media pipeline crates.

    - [`AviParser`] reads a RIFF/AVI file and hands out demuxed samples
      for its first video and first audio stream, with seeking.
    - [`AviWriter`] writes samples from any number of streams into a new
      AVI file with an `idx1` index.
    - [`AviStreamWriter`] writes AVI to a byte stream that cannot seek,
      without an index and with open-ended list sizes.

    Payloads are never decoded; codec handling is left to later stages.
*/

mod chunk;
mod error;
mod header;
mod parser;
mod reader;
mod writer;

pub use chunk::{AVIIF_KEYFRAME, IndexEntry};
pub use error::{AviError, AviResult};
pub use header::{MainHeader, StreamHeader};
pub use parser::{AviPacket, AviParser, ParserConfig};
pub use writer::{AviStreamWriter, AviWriter, LIVE_LIST_SIZE};

static_assertions::assert_impl_all!(AviParser: Send, Sync);
