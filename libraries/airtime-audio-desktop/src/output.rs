/// CPAL-based audio output driven by a dedicated audio thread
use crate::error::{AudioError, Result};
use crate::source::AudioSource;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Stereo scratch reserved per stream, in samples
const SCRATCH_SAMPLES: usize = 16 * 1024;

/// Commands sent to the audio thread
enum AudioCommand {
    /// Replace the current stream with a new source
    Play {
        source: Box<dyn AudioSource>,
        looping: bool,
        reply: Sender<Result<()>>,
    },
    /// Drop the current stream
    Stop,
    /// Exit the audio thread
    Shutdown,
}

/// State shared between the control thread and the audio callback
struct AudioState {
    playing: AtomicBool,
}

/// CPAL audio output
///
/// Uses a dedicated audio thread that owns the CPAL `Stream`; the control
/// thread talks to it over a channel, so the stream never has to be `Send`.
/// One buffer plays at a time.
pub struct CpalOutput {
    command_tx: Sender<AudioCommand>,
    sample_rate: u32,
    channels: usize,
    state: Arc<AudioState>,
    audio_thread: Option<JoinHandle<()>>,
}

impl CpalOutput {
    /// Open the default output device
    ///
    /// # Errors
    /// Returns an error if no audio device is found or configuration fails
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate();
        let channels = usize::from(config.channels());
        let config = config.config();

        tracing::info!(
            "Audio output: {} Hz, {} channel(s)",
            sample_rate,
            channels
        );

        let state = Arc::new(AudioState {
            playing: AtomicBool::new(false),
        });
        let (command_tx, command_rx) = bounded::<AudioCommand>(32);

        let state_clone = Arc::clone(&state);
        let audio_thread = thread::Builder::new()
            .name("airtime-audio".to_string())
            .spawn(move || Self::audio_thread_run(device, config, state_clone, command_rx))
            .map_err(|e| AudioError::CpalError(format!("failed to spawn audio thread: {}", e)))?;

        Ok(Self {
            command_tx,
            sample_rate,
            channels,
            state,
            audio_thread: Some(audio_thread),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Play `source`, replacing whatever was playing
    ///
    /// `source` must already produce audio at [`sample_rate`](Self::sample_rate).
    /// Blocks until the audio thread has the new stream running.
    pub fn play(&mut self, source: Box<dyn AudioSource>, looping: bool) -> Result<()> {
        tracing::trace!("Starting stream on {} channel(s)", self.channels);

        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(AudioCommand::Play {
                source,
                looping,
                reply: reply_tx,
            })
            .map_err(|_| AudioError::ThreadGone)?;

        reply_rx.recv().map_err(|_| AudioError::ThreadGone)?
    }

    pub fn stop(&mut self) {
        self.state.playing.store(false, Ordering::Release);
        if self.command_tx.send(AudioCommand::Stop).is_err() {
            tracing::warn!("Audio thread gone while stopping");
        }
    }

    /// Whether the last buffer is still sounding
    pub fn is_playing(&self) -> bool {
        self.state.playing.load(Ordering::Acquire)
    }

    fn audio_thread_run(
        device: Device,
        config: StreamConfig,
        state: Arc<AudioState>,
        command_rx: Receiver<AudioCommand>,
    ) {
        let mut stream: Option<Stream> = None;

        while let Ok(cmd) = command_rx.recv() {
            match cmd {
                AudioCommand::Play {
                    source,
                    looping,
                    reply,
                } => {
                    // Old stream must be gone before the flag is raised again
                    drop(stream.take());
                    state.playing.store(true, Ordering::Release);

                    let result = Self::build_stream(&device, &config, source, looping, &state)
                        .map(|s| stream = Some(s));
                    if result.is_err() {
                        state.playing.store(false, Ordering::Release);
                    }
                    // Caller may have given up waiting
                    let _ = reply.send(result);
                }
                AudioCommand::Stop => {
                    drop(stream.take());
                    state.playing.store(false, Ordering::Release);
                }
                AudioCommand::Shutdown => {
                    drop(stream.take());
                    break;
                }
            }
        }

        state.playing.store(false, Ordering::Release);
        tracing::debug!("Audio thread exited");
    }

    fn build_stream(
        device: &Device,
        config: &StreamConfig,
        mut source: Box<dyn AudioSource>,
        looping: bool,
        state: &Arc<AudioState>,
    ) -> Result<Stream> {
        let state_for_callback = Arc::clone(state);
        let channels = usize::from(config.channels).max(1);
        let mut stereo = Vec::with_capacity(SCRATCH_SAMPLES);
        let mut finished = false;

        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if finished {
                    data.fill(0.0);
                    return;
                }

                stereo.resize(data.len() / channels * 2, 0.0);
                let more = match fill_output(&mut stereo, source.as_mut(), looping) {
                    Ok(more) => more,
                    Err(e) => {
                        tracing::warn!("Playback stopped: {}", e);
                        stereo.fill(0.0);
                        false
                    }
                };
                write_channels(&stereo, data, channels);

                if !more {
                    finished = true;
                    state_for_callback.playing.store(false, Ordering::Release);
                }
            },
            |err| tracing::error!("Audio stream error: {}", err),
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_thread.take() {
            if handle.join().is_err() {
                tracing::warn!("Audio thread panicked");
            }
        }
    }
}

/// Fill interleaved stereo `output` from `source`
///
/// A looping source is rewound at end of stream. Returns `false` once a
/// non-looping source is exhausted, with the unfilled tail silenced.
fn fill_output(output: &mut [f32], source: &mut dyn AudioSource, looping: bool) -> Result<bool> {
    let mut written = 0;
    let mut rewound = false;

    while written < output.len() {
        let read = source.read_samples(&mut output[written..])?;
        if read > 0 {
            written += read;
            rewound = false;
            continue;
        }

        // An empty stream right after a rewind would spin forever
        if !looping || rewound {
            output[written..].fill(0.0);
            return Ok(false);
        }
        source.rewind()?;
        rewound = true;
    }

    Ok(true)
}

/// Spread interleaved stereo over `channels` output channels
fn write_channels(stereo: &[f32], output: &mut [f32], channels: usize) {
    match channels {
        2 => output[..stereo.len()].copy_from_slice(stereo),
        0 | 1 => {
            for (out, frame) in output.iter_mut().zip(stereo.chunks_exact(2)) {
                *out = (frame[0] + frame[1]) * 0.5;
            }
        }
        n => {
            for (out, frame) in output.chunks_exact_mut(n).zip(stereo.chunks_exact(2)) {
                out[0] = frame[0];
                out[1] = frame[1];
                out[2..].fill(0.0);
            }
        }
    }
}
