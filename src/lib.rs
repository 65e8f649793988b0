//! In-memory audio buffers with non-destructive and destructive editing.
//!
//! - [`audio`] - The [`AudioBuffer`] entity, its format tag, and file decode/encode
//! - [`editor`] - The [`Editor`] applying mixdown and sample-rate conversion

pub mod audio;
pub mod editor;

pub use audio::{AudioBuffer, AudioError, AudioFormat, AudioInfo, Codec, Container, Result};
pub use editor::{EditMode, Editor, ResampleQuality};
