//! Container and codec tag carried by every [`AudioBuffer`](super::AudioBuffer).
//!
//! The tag is read when a file is decoded and reused when the buffer is written
//! back, so an edited file keeps the layout of its source.

use std::path::Path;

use symphonia::core::codecs::CodecType;

/// File container, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Wav,
    Flac,
    Ogg,
    Mp3,
    Mp4,
    Unknown,
}

impl Container {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("wav" | "wave") => Self::Wav,
            Some("flac") => Self::Flac,
            Some("ogg" | "oga" | "opus") => Self::Ogg,
            Some("mp3") => Self::Mp3,
            Some("mp4" | "m4a" | "aac") => Self::Mp4,
            _ => Self::Unknown,
        }
    }
}

/// Sample encoding inside the container.
/// Maps to symphonia's CodecType constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    PcmU8,
    PcmS16,
    PcmS24,
    PcmS32,
    PcmF32,
    PcmF64,
    Mp3,
    Aac,
    Flac,
    Vorbis,
    Opus,
    Alac,
}

impl Codec {
    pub fn from_symphonia(ct: CodecType) -> Option<Self> {
        use symphonia::core::codecs::*;
        if ct == CODEC_TYPE_PCM_U8 {
            Some(Self::PcmU8)
        } else if ct == CODEC_TYPE_PCM_S16LE || ct == CODEC_TYPE_PCM_S16BE {
            Some(Self::PcmS16)
        } else if ct == CODEC_TYPE_PCM_S24LE || ct == CODEC_TYPE_PCM_S24BE {
            Some(Self::PcmS24)
        } else if ct == CODEC_TYPE_PCM_S32LE || ct == CODEC_TYPE_PCM_S32BE {
            Some(Self::PcmS32)
        } else if ct == CODEC_TYPE_PCM_F32LE || ct == CODEC_TYPE_PCM_F32BE {
            Some(Self::PcmF32)
        } else if ct == CODEC_TYPE_PCM_F64LE || ct == CODEC_TYPE_PCM_F64BE {
            Some(Self::PcmF64)
        } else if ct == CODEC_TYPE_MP3 {
            Some(Self::Mp3)
        } else if ct == CODEC_TYPE_AAC {
            Some(Self::Aac)
        } else if ct == CODEC_TYPE_FLAC {
            Some(Self::Flac)
        } else if ct == CODEC_TYPE_VORBIS {
            Some(Self::Vorbis)
        } else if ct == CODEC_TYPE_OPUS {
            Some(Self::Opus)
        } else if ct == CODEC_TYPE_ALAC {
            Some(Self::Alac)
        } else {
            None
        }
    }

    /// Bits per sample for uncompressed PCM, `None` for compressed codecs.
    pub fn bits_per_sample(self) -> Option<u16> {
        match self {
            Self::PcmU8 => Some(8),
            Self::PcmS16 => Some(16),
            Self::PcmS24 => Some(24),
            Self::PcmS32 | Self::PcmF32 => Some(32),
            Self::PcmF64 => Some(64),
            _ => None,
        }
    }
}

/// Opaque format tag: where the samples came from and how they were stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    pub container: Container,
    /// `None` when symphonia decoded a codec this tag does not name.
    pub codec: Option<Codec>,
    /// Source bit depth. Fixed by the codec for PCM, read from the stream header otherwise.
    pub bits_per_sample: Option<u16>,
}

impl AudioFormat {
    pub fn new(container: Container, codec: Option<Codec>) -> Self {
        Self {
            container,
            codec,
            bits_per_sample: codec.and_then(Codec::bits_per_sample),
        }
    }

    /// Uncompressed WAV with the given sample encoding.
    pub fn wav(codec: Codec) -> Self {
        Self::new(Container::Wav, Some(codec))
    }

    /// Lossless FLAC at the given bit depth.
    pub fn flac(bits_per_sample: u16) -> Self {
        Self::new(Container::Flac, Some(Codec::Flac)).with_bits_per_sample(bits_per_sample)
    }

    /// Set the bit depth unless the codec already fixes it.
    pub fn with_bits_per_sample(mut self, bits_per_sample: u16) -> Self {
        if self.bits_per_sample.is_none() {
            self.bits_per_sample = Some(bits_per_sample);
        }
        self
    }
}

impl Default for AudioFormat {
    /// 32-bit float WAV, the lossless choice for `f32` samples.
    fn default() -> Self {
        Self::wav(Codec::PcmF32)
    }
}
