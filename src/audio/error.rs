//! Error types for audio I/O and editing.

use std::path::PathBuf;

use thiserror::Error;

use super::format::{Codec, Container};

/// Main error type for audio operations.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to open audio file {path}: {source}")]
    CodecOpenFailed {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to write audio file {path}: {source}")]
    CodecWriteFailed {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },

    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),

    #[error("Resampling failed: {0}")]
    ResampleFailed(#[from] ResampleError),
}

/// Why a file could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Symphonia error: {0}")]
    Symphonia(#[from] symphonia::core::errors::Error),

    #[error("No supported audio track found")]
    NoTrack,

    #[error("Unknown sample rate")]
    UnknownSampleRate,

    #[error("Unknown channel layout")]
    UnknownChannels,
}

/// Why a buffer could not be written.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV writer error: {0}")]
    Hound(#[from] hound::Error),

    #[error("FLAC encoder error: {0}")]
    Flac(String),

    #[error("Writing {0:?} containers is not supported")]
    UnsupportedContainer(Container),

    #[error("Writing {0:?} samples is not supported")]
    UnsupportedCodec(Option<Codec>),

    #[error("{0}-bit samples cannot be written to this container")]
    UnsupportedBitDepth(u16),

    #[error("{0} channels do not fit the container header")]
    TooManyChannels(usize),
}

/// Error reported by the sample-rate conversion kernel.
#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("Invalid conversion ratio {0}")]
    InvalidRatio(f64),

    #[error("Converting {frames} frames x {channels} channels by {ratio} exceeds the output limit")]
    OutputTooLarge {
        frames: usize,
        channels: usize,
        ratio: f64,
    },

    #[error("Resampler construction failed: {0}")]
    Construction(#[from] rubato::ResamplerConstructionError),

    #[error("Resampler processing failed: {0}")]
    Process(#[from] rubato::ResampleError),
}

/// Result type alias for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;
