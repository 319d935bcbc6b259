//! Pull-based sample source for the output thread

use crate::error::Result;

/// Interleaved stereo `f32` at the output sample rate
///
/// The audio callback pulls from the source on demand, so only a few
/// packets of decoded audio exist at any time.
pub trait AudioSource: Send {
    /// Fill `buffer` with the next samples
    ///
    /// Returns the number of samples written; `0` means end of stream.
    fn read_samples(&mut self, buffer: &mut [f32]) -> Result<usize>;

    /// Start again from the first sample
    fn rewind(&mut self) -> Result<()>;
}
