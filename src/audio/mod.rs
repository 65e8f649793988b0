//! Audio data types and file I/O.
//!
//! # Data Types
//! - [`AudioBuffer`] - Interleaved `f32` samples plus their metadata
//! - [`AudioInfo`] - Frame count, sample rate, channel count and format of a buffer
//! - [`AudioFormat`] - The container/codec tag inherited from the source file
//!
//! # Codec
//! - [`file`] - Decoding with symphonia, encoding WAV with hound
//!
//! # Errors
//! - [`AudioError`] - Every failure surfaced by this crate

pub mod buffer;
pub mod error;
pub mod file;
pub mod format;

pub use buffer::{AudioBuffer, AudioInfo};
pub use error::{AudioError, DecodeError, EncodeError, ResampleError, Result};
pub use file::{decode, encode};
pub use format::{AudioFormat, Codec, Container};
