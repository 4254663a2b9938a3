use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

use crate::capture::SAMPLE_RATE;

/// Playback state machine: Idle -> Playing -> Paused -> Playing -> Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    Resumed,
    /// resume() while already playing is a no-op.
    AlreadyPlaying,
    /// The cursor is at end-of-data; nothing left to play.
    NothingToPlay,
}

/// Commands the event loop sends to the speak worker mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    Pause,
    Resume,
}

/// One decoded chunk's worth of samples plus a cursor, shared between the
/// device callback and the controlling thread.
///
/// The cursor survives pause/resume within the same chunk and is replaced
/// wholesale when the next chunk starts.
#[derive(Debug)]
pub struct PlaybackSession {
    samples: Vec<i16>,
    position: usize,
    state: PlaybackState,
    exhausted: bool,
}

impl PlaybackSession {
    pub fn idle() -> Self {
        PlaybackSession {
            samples: Vec::new(),
            position: 0,
            state: PlaybackState::Idle,
            exhausted: true,
        }
    }

    pub fn start(samples: Vec<i16>) -> Self {
        let exhausted = samples.is_empty();
        PlaybackSession {
            samples,
            position: 0,
            state: PlaybackState::Playing,
            exhausted,
        }
    }

    /// Fill an output buffer from the cursor, one source sample per frame.
    ///
    /// Zero-pads once the data runs out and flags exhaustion; the device
    /// callback must never block, so this only copies and advances.
    pub fn fill_frames(&mut self, out: &mut [f32], channels: usize) -> bool {
        for frame in out.chunks_mut(channels.max(1)) {
            let value = if self.position < self.samples.len() {
                let s = f32::from(self.samples[self.position]) / 32768.0;
                self.position += 1;
                s
            } else {
                self.exhausted = true;
                0.0
            };
            for slot in frame.iter_mut() {
                *slot = value;
            }
        }
        if self.position >= self.samples.len() {
            self.exhausted = true;
        }
        self.exhausted
    }

    /// Playing -> Paused. Returns false (no-op) in any other state.
    pub fn pause(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> ResumeOutcome {
        if self.position >= self.samples.len() {
            // Everything already played; the session is over, not resumable.
            self.state = PlaybackState::Idle;
            return ResumeOutcome::NothingToPlay;
        }
        if self.state == PlaybackState::Playing {
            return ResumeOutcome::AlreadyPlaying;
        }
        self.state = PlaybackState::Playing;
        ResumeOutcome::Resumed
    }

    /// Natural completion or explicit stop: back to Idle.
    pub fn finish(&mut self) {
        self.state = PlaybackState::Idle;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Drives one PlaybackSession at a time through a cpal output stream.
///
/// Pause drops the stream but keeps the session cursor; resume opens a
/// fresh stream continuing from the same position.
pub struct PlaybackController {
    device: Device,
    config: StreamConfig,
    session: Arc<Mutex<PlaybackSession>>,
    stream: Option<Stream>,
}

impl PlaybackController {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .context("No output device available")?;

        println!("Using audio output device: {}", device.name()?);

        // Prefer mono at 16kHz; fall back to more channels and duplicate
        // the sample across the frame.
        let supported = device
            .supported_output_configs()
            .context("Failed to query supported output configs")?
            .filter(|c| {
                c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .min_by_key(|c| c.channels())
            .context("No output config supporting 16kHz found")?;

        let config = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();

        Ok(PlaybackController {
            device,
            config,
            session: Arc::new(Mutex::new(PlaybackSession::idle())),
            stream: None,
        })
    }

    /// Start playing a new decoded chunk, superseding any previous session.
    pub fn play(&mut self, samples: Vec<i16>) -> Result<()> {
        self.stream.take();
        *self.session.lock().unwrap() = PlaybackSession::start(samples);
        self.open_stream()
    }

    pub fn pause(&mut self) {
        let paused = self.session.lock().unwrap().pause();
        if paused {
            self.stream.take();
            println!("⏸  Playback paused");
        }
    }

    pub fn resume(&mut self) -> Result<ResumeOutcome> {
        let outcome = self.session.lock().unwrap().resume();
        if outcome == ResumeOutcome::Resumed {
            self.open_stream()?;
            println!("▶️  Playback resumed");
        }
        Ok(outcome)
    }

    /// Poll for natural completion; releases the stream when the session
    /// has played out. Returns true once the controller is Idle.
    pub fn poll_done(&mut self) -> bool {
        let mut session = self.session.lock().unwrap();
        match session.state() {
            PlaybackState::Idle => true,
            PlaybackState::Paused => false,
            PlaybackState::Playing => {
                if session.is_exhausted() {
                    session.finish();
                    drop(session);
                    self.stream.take();
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.session.lock().unwrap().state()
    }

    fn open_stream(&mut self) -> Result<()> {
        let session = Arc::clone(&self.session);
        let channels = self.config.channels as usize;

        let err_fn = |err| eprintln!("🔴 Audio playback error: {}", err);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut session) = session.lock() else {
                        data.fill(0.0);
                        return;
                    };
                    session.fill_frames(data, channels);
                },
                err_fn,
                None,
            )
            .context("Failed to build output stream")?;

        stream.play().context("Failed to start playback stream")?;
        self.stream = Some(stream);
        Ok(())
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stream.take();
    }
}
