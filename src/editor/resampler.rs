//! Adapter between [`Editor::resample`](super::Editor::resample) and rubato.
//!
//! The whole buffer is converted in one call: the sinc kernel is sized to take
//! every input frame at once, then its delay line is drained with silence so the
//! tail of the signal is not lost. Drain passes shrink the kernel's chunk to
//! what is still missing. The kernel's reported output delay is trimmed from the
//! front and the result is capped at `ceil(frames * ratio)` frames.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    calculate_cutoff,
};
use tracing::{debug, warn};

use crate::audio::ResampleError;

/// Smallest chunk handed to the kernel. Short inputs are zero padded up to this.
const MIN_CHUNK_FRAMES: usize = 1024;

/// Upper bound on silent passes used to drain the kernel's delay line.
const MAX_FLUSH_PASSES: usize = 4;

/// Largest interleaved output a single conversion may allocate.
pub const MAX_OUTPUT_SAMPLES: usize = 1 << 31;

/// Quality tier of the sinc interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleQuality {
    /// For previews.
    Fast,
    Balanced,
    /// Longest sinc, used for every editor resample.
    #[default]
    Best,
}

impl ResampleQuality {
    pub fn parameters(self) -> SincInterpolationParameters {
        match self {
            Self::Fast => SincInterpolationParameters {
                sinc_len: 64,
                f_cutoff: 0.91,
                oversampling_factor: 128,
                interpolation: SincInterpolationType::Linear,
                window: WindowFunction::Blackman,
            },
            Self::Balanced => SincInterpolationParameters {
                sinc_len: 128,
                f_cutoff: 0.95,
                oversampling_factor: 256,
                interpolation: SincInterpolationType::Cubic,
                window: WindowFunction::BlackmanHarris,
            },
            Self::Best => SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: calculate_cutoff::<f32>(256, WindowFunction::BlackmanHarris2),
                oversampling_factor: 256,
                interpolation: SincInterpolationType::Cubic,
                window: WindowFunction::BlackmanHarris2,
            },
        }
    }
}

/// Interleaved output of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    pub samples: Vec<f32>,
    pub frame_count: usize,
}

/// Number of output frames a conversion of `frame_count` frames may produce.
pub fn output_capacity(frame_count: usize, ratio: f64) -> usize {
    (frame_count as f64 * ratio).ceil() as usize
}

/// Input frames for one drain pass that still owes `missing` output frames.
fn drain_chunk_frames(missing: usize, ratio: f64, max_chunk: usize) -> usize {
    ((missing as f64 / ratio).ceil() as usize + 1).clamp(1, max_chunk)
}

/// Convert interleaved `samples` by `ratio` (target rate / source rate).
pub fn resample_interleaved(
    samples: &[f32],
    frame_count: usize,
    channel_count: usize,
    ratio: f64,
    quality: ResampleQuality,
) -> Result<Resampled, ResampleError> {
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(ResampleError::InvalidRatio(ratio));
    }

    if frame_count == 0 || channel_count == 0 {
        return Ok(Resampled {
            samples: Vec::new(),
            frame_count: 0,
        });
    }

    let output_samples = (frame_count as f64 * ratio).ceil() * channel_count as f64;
    if output_samples > MAX_OUTPUT_SAMPLES as f64 {
        return Err(ResampleError::OutputTooLarge {
            frames: frame_count,
            channels: channel_count,
            ratio,
        });
    }

    let capacity = output_capacity(frame_count, ratio);
    let chunk_size = frame_count.max(MIN_CHUNK_FRAMES);
    let mut kernel = SincFixedIn::<f32>::new(
        ratio,
        1.0,
        quality.parameters(),
        chunk_size,
        channel_count,
    )?;

    let delay = kernel.output_delay();
    let needed = delay + capacity;
    debug!(
        "Resampling {} frames x {} channels by {:.6} ({:?}): capacity {}, kernel delay {}",
        frame_count, channel_count, ratio, quality, capacity, delay
    );

    let input = deinterleave(samples, channel_count);
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(needed); channel_count];

    let converted = kernel.process_partial(Some(input.as_slice()), None)?;
    append_planar(&mut output, converted);

    let mut passes = 0;
    while output[0].len() < needed && passes < MAX_FLUSH_PASSES {
        kernel.set_chunk_size(drain_chunk_frames(
            needed - output[0].len(),
            ratio,
            chunk_size,
        ))?;
        let tail = kernel.process_partial(None::<&[Vec<f32>]>, None)?;
        append_planar(&mut output, tail);
        passes += 1;
    }

    let frames = output[0].len().saturating_sub(delay).min(capacity);
    if frames < capacity {
        warn!("Resampler produced {} frames, expected {}", frames, capacity);
    }

    let mut interleaved = Vec::with_capacity(frames * channel_count);
    for frame_idx in delay..delay + frames {
        for channel in &output {
            interleaved.push(channel[frame_idx]);
        }
    }

    Ok(Resampled {
        samples: interleaved,
        frame_count: frames,
    })
}

fn deinterleave(samples: &[f32], channel_count: usize) -> Vec<Vec<f32>> {
    (0..channel_count)
        .map(|ch| {
            samples
                .iter()
                .skip(ch)
                .step_by(channel_count)
                .copied()
                .collect()
        })
        .collect()
}

fn append_planar(output: &mut [Vec<f32>], block: Vec<Vec<f32>>) {
    for (channel, data) in output.iter_mut().zip(block) {
        channel.extend_from_slice(&data);
    }
}
