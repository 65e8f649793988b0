//! Audio file decoding using symphonia, WAV encoding using hound and FLAC
//! encoding using flacenc.
//!
//! [`decode`] reads any container symphonia is built with into interleaved
//! `f32` samples. [`encode`] writes a buffer back using the format tag it was
//! decoded with. WAV and FLAC are writable; lossy containers are refused.

use std::fs::File;
use std::path::Path;

use flacenc::component::BitRepr;
use flacenc::error::Verify;
use hound::{SampleFormat, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

use super::buffer::{AudioBuffer, AudioInfo};
use super::error::{AudioError, DecodeError, EncodeError, Result};
use super::format::{AudioFormat, Codec, Container};

const FLAC_MIN_BITS: u16 = 8;
const FLAC_MAX_BITS: u16 = 24;
const FLAC_DEFAULT_BITS: u16 = 24;
const FLAC_MAX_CHANNELS: usize = 8;

/// Decode every sample of the first audio track in `path`.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let buffer = decode_file(path).map_err(|source| AudioError::CodecOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Decoded {}: {} frames, {} Hz, {} channels",
        path.display(),
        buffer.frame_count(),
        buffer.sample_rate(),
        buffer.channel_count()
    );
    Ok(buffer)
}

fn decode_file(path: &Path) -> std::result::Result<AudioBuffer, DecodeError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let opened = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = opened.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;
    let mut channel_count = codec_params.channels.map(|c| c.count());

    let mut audio_format = AudioFormat::new(
        Container::from_path(path),
        Codec::from_symphonia(codec_params.codec),
    );
    if let Some(bits) = codec_params.bits_per_sample.and_then(|b| u16::try_from(b).ok()) {
        audio_format = audio_format.with_bits_per_sample(bits);
    }
    debug!("Opened {}: {:?}", path.display(), audio_format);

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = match (codec_params.n_frames, channel_count) {
        (Some(frames), Some(channels)) => Vec::with_capacity(frames as usize * channels),
        _ => Vec::new(),
    };

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if channel_count.is_none() {
            channel_count = Some(spec.channels.count());
        }

        let mut packet_samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        packet_samples.copy_interleaved_ref(decoded);
        samples.extend_from_slice(packet_samples.samples());
    }

    let channel_count = channel_count
        .filter(|&c| c > 0)
        .ok_or(DecodeError::UnknownChannels)?;

    let info = AudioInfo {
        frame_count: samples.len() / channel_count,
        sample_rate,
        channel_count,
        format: audio_format,
    };
    Ok(AudioBuffer::new(info, samples))
}

/// Write `buffer` to `path` using the buffer's own format, rate and channel count.
pub fn encode<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<()> {
    let path = path.as_ref();

    if !buffer.is_consistent() {
        return Err(AudioError::InvalidBuffer(format!(
            "{} samples do not match {} frames x {} channels",
            buffer.len(),
            buffer.frame_count(),
            buffer.channel_count()
        )));
    }
    if buffer.channel_count() == 0 || buffer.sample_rate() == 0 {
        return Err(AudioError::InvalidBuffer(format!(
            "cannot write {} channels at {} Hz",
            buffer.channel_count(),
            buffer.sample_rate()
        )));
    }

    let written = match buffer.format().container {
        Container::Wav => encode_wav(buffer, path),
        Container::Flac => encode_flac(buffer, path),
        other => Err(EncodeError::UnsupportedContainer(other)),
    };
    written.map_err(|source| AudioError::CodecWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Wrote {}: {} frames, {} Hz, {} channels",
        path.display(),
        buffer.frame_count(),
        buffer.sample_rate(),
        buffer.channel_count()
    );
    Ok(())
}

/// 64-bit float and compressed codecs have no hound writer and are refused.
fn encode_wav(buffer: &AudioBuffer, path: &Path) -> std::result::Result<(), EncodeError> {
    let format = buffer.format();
    let (bits_per_sample, sample_format) = match format.codec {
        Some(Codec::PcmU8) => (8, SampleFormat::Int),
        Some(Codec::PcmS16) => (16, SampleFormat::Int),
        Some(Codec::PcmS24) => (24, SampleFormat::Int),
        Some(Codec::PcmS32) => (32, SampleFormat::Int),
        Some(Codec::PcmF32) => (32, SampleFormat::Float),
        other => return Err(EncodeError::UnsupportedCodec(other)),
    };

    let channels = u16::try_from(buffer.channel_count())
        .map_err(|_| EncodeError::TooManyChannels(buffer.channel_count()))?;

    let spec = WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample,
        sample_format,
    };
    debug!("Writing {} with {:?}", path.display(), spec);

    let mut writer = WavWriter::create(path, spec)?;
    match sample_format {
        SampleFormat::Float => {
            for &sample in buffer.samples() {
                writer.write_sample(sample)?;
            }
        }
        SampleFormat::Int => {
            for &sample in buffer.samples() {
                writer.write_sample(quantize(sample, bits_per_sample))?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Integer FLAC at the source bit depth, 24-bit when the depth is unknown.
fn encode_flac(buffer: &AudioBuffer, path: &Path) -> std::result::Result<(), EncodeError> {
    let bits_per_sample = buffer
        .format()
        .bits_per_sample
        .unwrap_or(FLAC_DEFAULT_BITS);
    if !(FLAC_MIN_BITS..=FLAC_MAX_BITS).contains(&bits_per_sample) {
        return Err(EncodeError::UnsupportedBitDepth(bits_per_sample));
    }
    if buffer.channel_count() > FLAC_MAX_CHANNELS {
        return Err(EncodeError::TooManyChannels(buffer.channel_count()));
    }

    let quantized: Vec<i32> = buffer
        .samples()
        .iter()
        .map(|&s| quantize(s, bits_per_sample))
        .collect();

    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodeError::Flac(format!("{:?}", e)))?;
    let source = flacenc::source::MemSource::from_samples(
        &quantized,
        buffer.channel_count(),
        bits_per_sample as usize,
        buffer.sample_rate() as usize,
    );
    debug!(
        "Writing {} as {}-bit FLAC, block size {}",
        path.display(),
        bits_per_sample,
        config.block_size
    );

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodeError::Flac(format!("{:?}", e)))?;
    let mut sink = flacenc::bitsink::ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| EncodeError::Flac(format!("{:?}", e)))?;

    std::fs::write(path, sink.as_slice())?;
    Ok(())
}

/// Inverse of symphonia's integer-to-float conversion (`x / 2^(bits-1)`).
fn quantize(sample: f32, bits_per_sample: u16) -> i32 {
    let scale = (1i64 << (bits_per_sample - 1)) as f64;
    (sample as f64 * scale).round().clamp(-scale, scale - 1.0) as i32
}
