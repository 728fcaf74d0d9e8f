/*!
    Choosing which stream to write next.
*/

use crate::stream_sink::StreamSink;

/**
    Decision of the write scheduler.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Write the next sample of the stream at this index.
    Stream(usize),
    /// A stream that has not ended has nothing queued; writing now could
    /// put a later sample before one that is still on its way.
    Pending,
    /// Every stream has ended and has nothing left to write.
    Drained,
}

/**
    Pick the stream whose next sample has the earliest timestamp.

    Only decides once every stream that has not ended has a sample queued.
    Ties go to the stream with the lowest index.
*/
pub fn select_earliest(streams: &[StreamSink]) -> Selection {
    if streams.iter().any(|s| !s.is_ended() && s.pending() == 0) {
        return Selection::Pending;
    }
    select_queued(streams)
}

/**
    Like [`select_earliest`], but only looks at queued samples. Used when
    the output is finalized and nothing more will arrive.
*/
pub fn select_queued(streams: &[StreamSink]) -> Selection {
    let mut best: Option<(usize, media_types::MediaTime)> = None;
    for (i, s) in streams.iter().enumerate() {
        let Some(t) = s.peek_time() else {
            continue;
        };
        if best.is_none_or(|(_, bt)| t < bt) {
            best = Some((i, t));
        }
    }
    match best {
        Some((i, _)) => Selection::Stream(i),
        None => Selection::Drained,
    }
}

#[cfg(test)]
mod tests {
    use media_types::{AudioFormat, MediaTime, MediaType, Sample, StreamId};

    use super::*;

    fn sink(id: u32, times: &[i64], ended: bool) -> StreamSink {
        let mut s = StreamSink::new(
            StreamId(id),
            MediaType::Audio(AudioFormat::pcm(1, 8000, 8)),
            8,
        )
        .unwrap();
        for &t in times {
            s.push(Sample::new(StreamId(id), vec![0u8], MediaTime::from_millis(t)))
                .unwrap();
        }
        if ended {
            s.end();
        }
        s
    }

    #[test]
    fn earliest_wins() {
        let streams = [sink(0, &[40], false), sink(1, &[20], false)];
        assert_eq!(select_earliest(&streams), Selection::Stream(1));
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let streams = [sink(0, &[20], false), sink(1, &[20], false)];
        assert_eq!(select_earliest(&streams), Selection::Stream(0));
    }

    #[test]
    fn waits_for_empty_live_stream() {
        let streams = [sink(0, &[10], false), sink(1, &[], false)];
        assert_eq!(select_earliest(&streams), Selection::Pending);
        assert_eq!(select_queued(&streams), Selection::Stream(0));
    }

    #[test]
    fn ended_streams_are_skipped() {
        let streams = [sink(0, &[], true), sink(1, &[500], false)];
        assert_eq!(select_earliest(&streams), Selection::Stream(1));
    }

    #[test]
    fn drained_when_all_ended_and_empty() {
        let streams = [sink(0, &[], true), sink(1, &[], true)];
        assert_eq!(select_earliest(&streams), Selection::Drained);
        assert_eq!(select_earliest(&[]), Selection::Drained);
    }

    #[test]
    fn ended_stream_with_samples_still_written() {
        let streams = [sink(0, &[5], true), sink(1, &[9], false)];
        assert_eq!(select_earliest(&streams), Selection::Stream(0));
    }
}
