/*!
    Sample transforms for the media pipeline crates.

    A [`Transform`] sits between a source and a sink and rewrites samples
    one at a time using an input/output handshake:

    ```ignore
    use media_transform::{AudioGain, TimeShift, TransformChain};

    let mut chain = TransformChain::new()
        .with_stage(TimeShift::new(-start))
        .with_stage(AudioGain::new(0.5)?);
    chain.set_input_type(&audio_type)?;

    for sample in samples {
        for out in chain.process(sample)? {
            sink.process_sample(out)?;
        }
    }
    ```

    Payloads are carried opaquely; only [`AudioGain`] looks inside them,
    and only for PCM audio.
*/

mod chain;
mod gain;
mod shift;
mod transform;

pub use chain::TransformChain;
pub use gain::AudioGain;
pub use shift::TimeShift;
pub use transform::{Passthrough, Transform, TransformOutput};

static_assertions::assert_impl_all!(TransformChain: Send);
