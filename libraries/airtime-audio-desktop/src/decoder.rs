//! Streaming decoding with Symphonia
//!
//! Packets are decoded on demand while the output thread pulls samples, and
//! resampled to the device rate in chunks of a tenth of a second. Only a few
//! packets of audio are held in memory whatever the length of the file.
//!
//! All Symphonia sample formats go through one generic interleaver; only the
//! normalisation closure differs per format. Mono is duplicated to both
//! channels, anything wider keeps its first two channels.

use crate::error::{AudioError, Result};
use crate::source::AudioSource;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Resampler input chunks per second of source audio
const CHUNKS_PER_SECOND: u32 = 10;

/// Probed container plus the decoder for its default track
struct OpenedTrack {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
}

fn open_track(path: &Path) -> Result<OpenedTrack> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::decode(path, format!("unrecognised container: {}", e)))?;
    let reader = probed.format;

    let track = reader
        .default_track()
        .ok_or_else(|| AudioError::decode(path, "no audio track"))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::decode(path, "unknown sample rate"))?;

    let decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::decode(path, format!("unsupported codec: {}", e)))?;

    Ok(OpenedTrack {
        reader,
        decoder,
        track_id,
        sample_rate,
    })
}

fn make_resampler(source_rate: u32, target_rate: u32) -> Result<SincFixedIn<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let chunk_frames = (source_rate / CHUNKS_PER_SECOND).max(1) as usize;

    SincFixedIn::<f32>::new(
        f64::from(target_rate) / f64::from(source_rate),
        2.0,
        params,
        chunk_frames,
        2,
    )
    .map_err(|e| AudioError::ResampleError(e.to_string()))
}

/// Streaming source for one audio file
///
/// Produces interleaved stereo `f32` at the rate given to [`open`](Self::open).
/// Corrupt packets are skipped.
pub struct StreamingDecoder {
    path: PathBuf,
    track: OpenedTrack,
    target_rate: u32,
    resampler: Option<SincFixedIn<f32>>,
    planar: Vec<Vec<f32>>,
    /// Stereo at the source rate, waiting for a full resampler chunk
    pending: Vec<f32>,
    /// Stereo at the target rate, ready to be read
    ready: VecDeque<f32>,
    eof: bool,
}

impl StreamingDecoder {
    /// Open `path` for playback at `target_rate`
    ///
    /// Decodes until the first audio is available, so a file that yields no
    /// audio at all fails here rather than inside the audio callback.
    pub fn open(path: &Path, target_rate: u32) -> Result<Self> {
        let track = open_track(path)?;

        let resampler = if track.sample_rate == target_rate {
            None
        } else {
            Some(make_resampler(track.sample_rate, target_rate)?)
        };
        let planar = resampler
            .as_ref()
            .map(|r| vec![vec![0.0; r.input_frames_next()]; 2])
            .unwrap_or_default();

        let mut source = Self {
            path: path.to_path_buf(),
            track,
            target_rate,
            resampler,
            planar,
            pending: Vec::new(),
            ready: VecDeque::new(),
            eof: false,
        };

        source.fill_to(2)?;
        if source.ready.is_empty() {
            return Err(AudioError::decode(path, "no audio decoded"));
        }

        tracing::debug!(
            "Streaming {}: {} Hz -> {} Hz",
            path.display(),
            source.track.sample_rate,
            target_rate
        );
        Ok(source)
    }

    /// Sample rate of the file itself
    pub fn source_sample_rate(&self) -> u32 {
        self.track.sample_rate
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.target_rate
    }

    /// Samples decoded but not yet read
    pub fn buffered_samples(&self) -> usize {
        self.ready.len() + self.pending.len()
    }

    fn fill_to(&mut self, wanted: usize) -> Result<()> {
        while self.ready.len() < wanted && !self.eof {
            self.decode_next_packet()?;
        }
        Ok(())
    }

    fn decode_next_packet(&mut self) -> Result<()> {
        let packet = match self.track.reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return self.finish();
            }
            Err(SymphoniaError::ResetRequired) => return self.finish(),
            Err(e) => return Err(AudioError::decode(&self.path, e.to_string())),
        };

        if packet.track_id() != self.track.track_id {
            return Ok(());
        }

        match self.track.decoder.decode(&packet) {
            Ok(decoded) => append_stereo_f32(decoded, &mut self.pending),
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::debug!(
                    "Skipping corrupt packet in {}: {}",
                    self.path.display(),
                    reason
                );
                return Ok(());
            }
            Err(e) => return Err(AudioError::decode(&self.path, e.to_string())),
        }

        self.resample_pending(false)
    }

    fn finish(&mut self) -> Result<()> {
        self.eof = true;
        self.resample_pending(true)
    }

    /// Move `pending` into `ready`, resampling whole chunks
    ///
    /// With `flush` the short final chunk is zero-padded and its output
    /// trimmed to the matching length.
    fn resample_pending(&mut self, flush: bool) -> Result<()> {
        let Some(resampler) = self.resampler.as_mut() else {
            self.ready.extend(self.pending.drain(..));
            return Ok(());
        };

        let chunk = resampler.input_frames_next();
        let ratio = f64::from(self.target_rate) / f64::from(self.track.sample_rate);
        let mut consumed = 0;

        loop {
            let available = (self.pending.len() - consumed) / 2;
            if available == 0 || (available < chunk && !flush) {
                break;
            }
            let frames = available.min(chunk);

            for channel in &mut self.planar {
                channel.resize(chunk, 0.0);
                channel.fill(0.0);
            }
            let input = &self.pending[consumed..consumed + frames * 2];
            for (i, frame) in input.chunks_exact(2).enumerate() {
                self.planar[0][i] = frame[0];
                self.planar[1][i] = frame[1];
            }

            let resampled = resampler
                .process(&self.planar, None)
                .map_err(|e| AudioError::ResampleError(e.to_string()))?;

            let produced = resampled[0].len();
            let keep = if frames == chunk {
                produced
            } else {
                ((frames as f64 * ratio).round() as usize).min(produced)
            };
            for i in 0..keep {
                self.ready.push_back(resampled[0][i]);
                self.ready.push_back(resampled[1][i]);
            }

            consumed += frames * 2;
        }

        self.pending.drain(..consumed);
        Ok(())
    }
}

impl AudioSource for StreamingDecoder {
    fn read_samples(&mut self, buffer: &mut [f32]) -> Result<usize> {
        self.fill_to(buffer.len())?;

        let count = self.ready.len().min(buffer.len());
        for (out, sample) in buffer.iter_mut().zip(self.ready.drain(..count)) {
            *out = sample;
        }
        Ok(count)
    }

    fn rewind(&mut self) -> Result<()> {
        let seek = self.track.reader.seek(
            SeekMode::Accurate,
            SeekTo::TimeStamp {
                ts: 0,
                track_id: self.track.track_id,
            },
        );
        match seek {
            Ok(_) => self.track.decoder.reset(),
            Err(e) => {
                tracing::debug!("Seek failed in {}, reopening: {}", self.path.display(), e);
                self.track = open_track(&self.path)?;
            }
        }

        if let Some(resampler) = self.resampler.as_mut() {
            resampler.reset();
        }
        self.pending.clear();
        self.ready.clear();
        self.eof = false;
        Ok(())
    }
}

fn interleave_stereo<T, F>(buf: &AudioBuffer<T>, normalize: F, out: &mut Vec<f32>)
where
    T: Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { left };

    out.reserve(buf.frames() * 2);
    for (l, r) in left.iter().zip(right.iter()) {
        out.push(normalize(*l));
        out.push(normalize(*r));
    }
}

fn append_stereo_f32(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_stereo(&buf, |s| s, out),
        AudioBufferRef::F64(buf) => interleave_stereo(&buf, |s| s as f32, out),

        AudioBufferRef::S8(buf) => interleave_stereo(&buf, |s| s as f32 / i8::MAX as f32, out),
        AudioBufferRef::S16(buf) => interleave_stereo(&buf, |s| s as f32 / i16::MAX as f32, out),
        AudioBufferRef::S24(buf) => {
            interleave_stereo(&buf, |s| s.inner() as f32 / 8_388_607.0, out);
        }
        AudioBufferRef::S32(buf) => interleave_stereo(&buf, |s| s as f32 / i32::MAX as f32, out),

        AudioBufferRef::U8(buf) => {
            interleave_stereo(&buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U16(buf) => {
            interleave_stereo(&buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U24(buf) => {
            interleave_stereo(&buf, |s| (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U32(buf) => {
            interleave_stereo(&buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0, out);
        }
    }
}
