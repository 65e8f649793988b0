//! Editing operations on an [`AudioBuffer`].
//!
//! An [`Editor`] either works on a private copy of the caller's buffer
//! ([`EditMode::NonDestructive`]) or directly on the caller's buffer
//! ([`EditMode::Destructive`]). The operations behave the same in both modes.
//!
//! Every operation validates the buffer first and computes its new samples
//! before touching any field, so a failed edit leaves the buffer as it was.
//!
//! # Example
//!
//! ```ignore
//! let source = AudioBuffer::open("take.wav")?;
//! let mut editor = Editor::non_destructive(&source);
//! editor.mixdown()?.resample(16000)?;
//! editor.result().export("take-16k-mono.wav")?;
//! ```

pub mod resampler;

use tracing::debug;

use crate::audio::{AudioBuffer, AudioError, Result};

pub use resampler::{ResampleQuality, Resampled};

/// How an [`Editor`] obtains the buffer it mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Edit a deep copy; the caller's buffer is never touched.
    NonDestructive,
    /// Edit the caller's buffer in place.
    Destructive,
}

#[derive(Debug)]
enum Target<'a> {
    Owned(AudioBuffer),
    Borrowed(&'a mut AudioBuffer),
}

/// Applies mixdown and sample-rate conversion to one buffer it has exclusive access to.
#[derive(Debug)]
pub struct Editor<'a> {
    target: Target<'a>,
}

impl<'a> Editor<'a> {
    /// Create an editor over `buffer`, copying it only in [`EditMode::NonDestructive`].
    ///
    /// Callers holding only a shared reference use [`Editor::non_destructive`].
    pub fn new(buffer: &'a mut AudioBuffer, mode: EditMode) -> Self {
        let target = match mode {
            EditMode::NonDestructive => Target::Owned(buffer.clone()),
            EditMode::Destructive => Target::Borrowed(buffer),
        };
        Self { target }
    }

    /// Edit a deep copy of `buffer`.
    pub fn non_destructive(buffer: &AudioBuffer) -> Editor<'static> {
        Editor {
            target: Target::Owned(buffer.clone()),
        }
    }

    /// Edit `buffer` in place.
    pub fn destructive(buffer: &'a mut AudioBuffer) -> Self {
        Self::new(buffer, EditMode::Destructive)
    }

    pub fn mode(&self) -> EditMode {
        match self.target {
            Target::Owned(_) => EditMode::NonDestructive,
            Target::Borrowed(_) => EditMode::Destructive,
        }
    }

    /// The buffer in its current edited state.
    ///
    /// For destructive editors this is the caller's own buffer.
    pub fn result(&self) -> &AudioBuffer {
        match &self.target {
            Target::Owned(buffer) => buffer,
            Target::Borrowed(buffer) => &**buffer,
        }
    }

    /// Consumes the editor and returns the edited buffer.
    pub fn into_result(self) -> AudioBuffer {
        match self.target {
            Target::Owned(buffer) => buffer,
            Target::Borrowed(buffer) => buffer.clone(),
        }
    }

    fn buffer_mut(&mut self) -> &mut AudioBuffer {
        match &mut self.target {
            Target::Owned(buffer) => buffer,
            Target::Borrowed(buffer) => &mut **buffer,
        }
    }

    /// Average all channels of each frame into a single channel.
    ///
    /// Sums are accumulated in `f32`, channel by channel in index order, then
    /// divided by the channel count. A mono buffer is left untouched.
    pub fn mixdown(&mut self) -> Result<&mut Self> {
        mixdown_buffer(self.buffer_mut())?;
        Ok(self)
    }

    /// Convert the buffer to `target_sample_rate` with the best sinc quality tier.
    ///
    /// Converting to the current rate is a no-op. On failure the buffer is unchanged.
    pub fn resample(&mut self, target_sample_rate: u32) -> Result<&mut Self> {
        resample_buffer(self.buffer_mut(), target_sample_rate)?;
        Ok(self)
    }
}

fn check_consistent(buffer: &AudioBuffer) -> Result<()> {
    if buffer.is_consistent() {
        Ok(())
    } else {
        Err(AudioError::InvalidBuffer(format!(
            "{} samples do not match {} frames x {} channels",
            buffer.len(),
            buffer.frame_count(),
            buffer.channel_count()
        )))
    }
}

fn mixdown_buffer(buffer: &mut AudioBuffer) -> Result<()> {
    let channels = buffer.channel_count();
    if channels == 0 {
        return Err(AudioError::InvalidBuffer(
            "cannot mix down a buffer with zero channels".to_string(),
        ));
    }
    check_consistent(buffer)?;

    if channels == 1 {
        debug!("Mixdown skipped, buffer is already mono");
        return Ok(());
    }

    let mono: Vec<f32> = buffer
        .samples()
        .chunks_exact(channels)
        .map(|frame| frame.iter().fold(0.0f32, |acc, &s| acc + s) / channels as f32)
        .collect();

    debug!("Mixed {} channels down to mono ({} frames)", channels, mono.len());
    buffer.set_channel_count(1);
    buffer.set_samples(mono);
    Ok(())
}

fn resample_buffer(buffer: &mut AudioBuffer, target_sample_rate: u32) -> Result<()> {
    let current = buffer.sample_rate();
    if current == 0 {
        return Err(AudioError::InvalidBuffer(
            "cannot resample a buffer with a sample rate of 0".to_string(),
        ));
    }
    if buffer.channel_count() == 0 {
        return Err(AudioError::InvalidBuffer(
            "cannot resample a buffer with zero channels".to_string(),
        ));
    }
    check_consistent(buffer)?;

    if target_sample_rate == current {
        debug!("Resample skipped, buffer is already at {} Hz", current);
        return Ok(());
    }

    let ratio = target_sample_rate as f64 / current as f64;
    let resampled = resampler::resample_interleaved(
        buffer.samples(),
        buffer.frame_count(),
        buffer.channel_count(),
        ratio,
        ResampleQuality::Best,
    )?;

    debug!(
        "Resampled {} Hz -> {} Hz: {} -> {} frames",
        current,
        target_sample_rate,
        buffer.frame_count(),
        resampled.frame_count
    );
    buffer.set_sample_rate(target_sample_rate);
    buffer.set_frame_count(resampled.frame_count);
    buffer.set_samples(resampled.samples);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioFormat, Codec, ResampleError};
    use proptest::prelude::*;

    fn buffer(samples: Vec<f32>, sample_rate: u32, channels: usize) -> AudioBuffer {
        let format = AudioFormat::wav(Codec::PcmS16);
        AudioBuffer::from_interleaved(samples, sample_rate, channels, format)
    }

    fn tone(frames: usize, channels: usize, sample_rate: u32) -> AudioBuffer {
        let samples = (0..frames * channels)
            .map(|i| {
                let frame = (i / channels) as f32;
                0.4 * (2.0 * std::f32::consts::PI * 250.0 * frame / sample_rate as f32).sin()
            })
            .collect();
        buffer(samples, sample_rate, channels)
    }

    #[test]
    fn test_mixdown_averages_stereo() {
        let source = buffer(vec![1.0, 3.0, 0.0, 0.0], 48000, 2);
        let mut editor = Editor::non_destructive(&source);

        editor.mixdown().unwrap();

        let result = editor.result();
        assert_eq!(result.samples(), &[2.0, 0.0]);
        assert_eq!(result.channel_count(), 1);
        assert_eq!(result.frame_count(), 2);
        assert_eq!(result.sample_rate(), 48000);
        assert_eq!(result.format(), source.format());
    }

    #[test]
    fn test_mixdown_of_negative_zeros_is_positive_zero() {
        let source = buffer(vec![-0.0, -0.0, -0.0, -0.0, -0.0, -0.0], 48000, 3);
        let mut editor = Editor::non_destructive(&source);

        editor.mixdown().unwrap();

        assert_eq!(editor.result().samples()[0].to_bits(), 0);
        assert_eq!(editor.result().samples()[1].to_bits(), 0);
    }

    #[test]
    fn test_mixdown_averages_three_channels() {
        let source = buffer(vec![0.3, 0.6, 0.9, -1.0, 0.0, 1.0], 44100, 3);
        let mut editor = Editor::non_destructive(&source);

        editor.mixdown().unwrap();

        let mono = editor.result().samples();
        assert!((mono[0] - 0.6).abs() < 1e-6);
        assert_eq!(mono[1], 0.0);
    }

    #[test]
    fn test_mixdown_of_mono_is_noop() {
        let source = buffer(vec![0.1, -0.2, 0.3], 22050, 1);
        let mut editor = Editor::non_destructive(&source);

        editor.mixdown().unwrap().mixdown().unwrap();

        assert_eq!(editor.result(), &source);
    }

    #[test]
    fn test_mixdown_zero_channels_fails() {
        let mut source = buffer(Vec::new(), 48000, 0);
        let mut editor = Editor::destructive(&mut source);

        let err = editor.mixdown().unwrap_err();
        assert!(matches!(err, AudioError::InvalidBuffer(_)));
    }

    #[test]
    fn test_mixdown_inconsistent_buffer_fails_without_mutation() {
        let mut source = buffer(vec![0.5; 6], 48000, 2);
        source.set_frame_count(4);
        let snapshot = source.clone();
        let mut editor = Editor::destructive(&mut source);

        assert!(matches!(editor.mixdown(), Err(AudioError::InvalidBuffer(_))));
        drop(editor);
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_non_destructive_leaves_source_untouched() {
        let mut source = buffer(vec![1.0, 3.0, 0.0, 0.0], 48000, 2);
        let snapshot = source.clone();

        let mut editor = Editor::new(&mut source, EditMode::NonDestructive);
        assert_eq!(editor.mode(), EditMode::NonDestructive);
        editor.mixdown().unwrap();
        assert_eq!(editor.result().channel_count(), 1);
        let edited = editor.into_result();

        assert_eq!(source, snapshot);
        assert_eq!(source.channel_count(), 2);
        assert_eq!(edited.samples(), &[2.0, 0.0]);
    }

    #[test]
    fn test_destructive_mutates_source() {
        let mut source = buffer(vec![1.0, 3.0, 0.0, 0.0], 48000, 2);

        {
            let mut editor = Editor::new(&mut source, EditMode::Destructive);
            assert_eq!(editor.mode(), EditMode::Destructive);
            editor.mixdown().unwrap();
        }

        assert_eq!(source.channel_count(), 1);
        assert_eq!(source.samples(), &[2.0, 0.0]);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let source = tone(1000, 2, 8000);
        let mut editor = Editor::non_destructive(&source);

        editor.resample(8000).unwrap();

        assert_eq!(editor.result(), &source);
    }

    #[test]
    fn test_resample_doubles_frame_count() {
        let source = tone(1000, 2, 8000);
        let mut editor = Editor::non_destructive(&source);

        editor.resample(16000).unwrap();

        let result = editor.result();
        assert_eq!(result.sample_rate(), 16000);
        assert_eq!(result.frame_count(), 2000);
        assert_eq!(result.channel_count(), 2);
        assert_eq!(result.format(), source.format());
        assert!(result.is_consistent());

        // Both channels carried the same tone and must still match.
        let left: Vec<f32> = result.iter_channel(0).unwrap().copied().collect();
        let right: Vec<f32> = result.iter_channel(1).unwrap().copied().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_resample_down() {
        let source = tone(4800, 1, 48000);
        let mut editor = Editor::non_destructive(&source);

        editor.resample(44100).unwrap();

        assert_eq!(editor.result().frame_count(), 4410);
        assert_eq!(editor.result().len(), 4410);
    }

    #[test]
    fn test_resample_empty_buffer() {
        let source = buffer(Vec::new(), 44100, 2);
        let mut editor = Editor::non_destructive(&source);

        editor.resample(48000).unwrap();

        assert_eq!(editor.result().sample_rate(), 48000);
        assert_eq!(editor.result().frame_count(), 0);
        assert!(editor.result().is_consistent());
    }

    #[test]
    fn test_resample_failure_leaves_buffer_untouched() {
        let mut source = tone(500, 2, 44100);
        let snapshot = source.clone();
        let mut editor = Editor::destructive(&mut source);

        let err = editor.resample(0).unwrap_err();

        assert!(matches!(
            err,
            AudioError::ResampleFailed(ResampleError::InvalidRatio(_))
        ));
        assert_eq!(editor.result(), &snapshot);
        drop(editor);
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_resample_to_huge_rate_fails_without_mutation() {
        let mut source = buffer(vec![0.1, -0.1, 0.2, -0.2], 1, 2);
        let snapshot = source.clone();
        let mut editor = Editor::destructive(&mut source);

        let err = editor.resample(u32::MAX).unwrap_err();

        assert!(matches!(
            err,
            AudioError::ResampleFailed(ResampleError::OutputTooLarge { .. })
        ));
        assert_eq!(editor.result(), &snapshot);
    }

    #[test]
    fn test_resample_zero_source_rate_fails() {
        let source = buffer(vec![0.0; 4], 0, 2);
        let mut editor = Editor::non_destructive(&source);

        assert!(matches!(
            editor.resample(44100),
            Err(AudioError::InvalidBuffer(_))
        ));
    }

    #[test]
    fn test_edit_chain_then_export() -> anyhow::Result<()> {
        let source = AudioBuffer::from_interleaved(
            tone(2205, 2, 22050).into_samples(),
            22050,
            2,
            AudioFormat::wav(Codec::PcmF32),
        );
        let mut editor = Editor::non_destructive(&source);
        editor.mixdown()?.resample(44100)?;

        let path = std::env::temp_dir()
            .join(format!("audio-editor-{}.wav", uuid::Uuid::new_v4()));
        editor.result().export(&path)?;
        let decoded = AudioBuffer::open(&path);
        std::fs::remove_file(&path)?;
        let decoded = decoded?;

        assert_eq!(decoded.info(), editor.result().info());
        assert_eq!(decoded.samples(), editor.result().samples());
        Ok(())
    }

    fn interleaved_buffers() -> impl Strategy<Value = AudioBuffer> {
        (1usize..=4, 0usize..64, 1u32..=96000).prop_flat_map(|(channels, frames, rate)| {
            prop::collection::vec(-1.0f32..1.0, channels * frames)
                .prop_map(move |samples| buffer(samples, rate, channels))
        })
    }

    proptest! {
        #[test]
        fn mixdown_keeps_buffer_consistent(source in interleaved_buffers()) {
            let mut editor = Editor::non_destructive(&source);
            editor.mixdown().unwrap();

            let result = editor.result();
            prop_assert!(result.is_consistent());
            prop_assert_eq!(result.channel_count(), 1);
            prop_assert_eq!(result.frame_count(), source.frame_count());
            prop_assert_eq!(result.sample_rate(), source.sample_rate());
        }

        #[test]
        fn mixdown_output_stays_within_channel_range(source in interleaved_buffers()) {
            let channels = source.channel_count();
            let mut editor = Editor::non_destructive(&source);
            editor.mixdown().unwrap();

            let frames = source.samples().chunks_exact(channels);
            for (frame, mono) in frames.zip(editor.result().samples()) {
                let lo = frame.iter().copied().fold(f32::INFINITY, f32::min);
                let hi = frame.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                prop_assert!(*mono >= lo - 1e-6 && *mono <= hi + 1e-6);
            }
        }
    }
}
