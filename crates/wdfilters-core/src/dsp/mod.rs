//! # Per-sample processing
//!
//! The traits in this module describe anything that turns samples into samples: filters, parameter
//! smoothers, or whole circuits. Multichannel I/O is expressed through the `I` and `O` const
//! generics; it's up to each implementor to document what the inputs and outputs mean.
use crate::Scalar;

pub mod parameter;

/// Metadata shared by all processors.
pub trait DSPMeta {
    /// Type of the audio sample used by this processor.
    type Sample: Scalar;

    /// Report the latency of this processor, that is the time, in samples, it takes for an input
    /// sample to be output back.
    fn latency(&self) -> usize {
        0
    }

    /// Reset this instance. Parameters should be kept, but any memory and derived state should be
    /// put back to a well-known default value.
    fn reset(&mut self) {}
}

/// Processing trait. Implementors of this trait are processes that work on a per-sample basis.
///
/// Implementations are called from the audio thread and must not allocate, lock or panic.
pub trait DSPProcess<const I: usize, const O: usize>: DSPMeta {
    /// Process a single frame of audio.
    fn process(&mut self, x: [Self::Sample; I]) -> [Self::Sample; O];
}

impl<P: DSPMeta> DSPMeta for &mut P {
    type Sample = P::Sample;

    fn latency(&self) -> usize {
        P::latency(self)
    }

    fn reset(&mut self) {
        P::reset(self)
    }
}

impl<P: DSPProcess<I, O>, const I: usize, const O: usize> DSPProcess<I, O> for &mut P {
    fn process(&mut self, x: [Self::Sample; I]) -> [Self::Sample; O] {
        P::process(self, x)
    }
}
