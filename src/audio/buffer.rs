use std::path::Path;

use super::format::AudioFormat;
use super::{Result, file};

/// Metadata describing an [`AudioBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    /// Samples per channel.
    pub frame_count: usize,
    pub sample_rate: u32,
    pub channel_count: usize,
    pub format: AudioFormat,
}

/// Interleaved `f32` samples together with their format metadata.
///
/// This is a plain value container: setters do not check that
/// `samples.len() == frame_count * channel_count`. Whoever rewrites the
/// samples (normally an [`Editor`](crate::Editor)) restores that invariant
/// before handing the buffer back. [`Clone`] is a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    frame_count: usize,
    sample_rate: u32,
    channel_count: usize,
    format: AudioFormat,
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Create a buffer from decoded metadata and interleaved samples.
    pub fn new(info: AudioInfo, samples: Vec<f32>) -> Self {
        Self {
            frame_count: info.frame_count,
            sample_rate: info.sample_rate,
            channel_count: info.channel_count,
            format: info.format,
            samples,
        }
    }

    /// Create a buffer whose frame count is derived from the sample count.
    pub fn from_interleaved(
        samples: Vec<f32>,
        sample_rate: u32,
        channel_count: usize,
        format: AudioFormat,
    ) -> Self {
        let frame_count = if channel_count == 0 {
            0
        } else {
            samples.len() / channel_count
        };
        Self {
            frame_count,
            sample_rate,
            channel_count,
            format,
            samples,
        }
    }

    /// Decode a file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        file::decode(path)
    }

    /// Write the buffer to disk using its own format tag.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        file::encode(self, path)
    }

    pub fn info(&self) -> AudioInfo {
        AudioInfo {
            frame_count: self.frame_count,
            sample_rate: self.sample_rate,
            channel_count: self.channel_count,
            format: self.format,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn set_frame_count(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn set_channel_count(&mut self, channel_count: usize) {
        self.channel_count = channel_count;
    }

    /// The format tag is fixed at construction.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Access the interleaved sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Access the interleaved sample data mutably.
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn set_samples(&mut self, samples: Vec<f32>) {
        self.samples = samples;
    }

    /// Consumes the buffer and returns the raw vector.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Total number of samples across all channels.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the sample count matches `frame_count * channel_count`.
    pub fn is_consistent(&self) -> bool {
        self.frame_count
            .checked_mul(self.channel_count)
            .is_some_and(|expected| expected == self.samples.len())
    }

    /// Duration in seconds, `None` when the sample rate is unset.
    pub fn duration_secs(&self) -> Option<f64> {
        (self.sample_rate > 0).then(|| self.frame_count as f64 / self.sample_rate as f64)
    }

    /// Returns an iterator over the samples of a specific channel,
    /// or `None` when the buffer has no such channel.
    pub fn iter_channel(&self, channel_idx: usize) -> Option<impl Iterator<Item = &f32>> {
        (channel_idx < self.channel_count)
            .then(|| self.samples.iter().skip(channel_idx).step_by(self.channel_count))
    }
}
