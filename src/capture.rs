use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Capture sample rate (16 kHz for speech transcription).
pub const SAMPLE_RATE: u32 = 16000;

/// Accumulates microphone samples from the cpal callback into one buffer.
///
/// The callback only copies data and appends; blocks land in strict
/// delivery order, so `stop()` returns exactly the concatenation of the
/// delivered blocks.
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<i16>>>,
    stream: Option<Stream>,
    started_at: Option<Instant>,
}

impl AudioCapture {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .context("No input device available")?;

        println!("Using audio input device: {}", device.name()?);

        // Prefer mono at 16kHz; fall back to any channel layout supporting
        // 16kHz and downmix in the callback.
        let supported = device
            .supported_input_configs()
            .context("Failed to query supported input configs")?
            .filter(|c| {
                c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .min_by_key(|c| c.channels())
            .context("No input config supporting 16kHz found")?;

        let config = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();

        println!(
            "Capture config: {} channels, {} Hz",
            config.channels, config.sample_rate.0
        );

        Ok(AudioCapture {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            started_at: None,
        })
    }

    /// Open the input stream. No-op when already recording.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(()); // Already recording
        }

        self.buffer.lock().unwrap().clear();

        let buffer = Arc::clone(&self.buffer);
        let channels = self.config.channels as usize;

        let err_fn = |err| eprintln!("🔴 Audio stream error: {}", err);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Handle poisoned mutex gracefully in audio callback
                    let Ok(mut buf) = buffer.lock() else {
                        eprintln!("⚠️  Audio buffer mutex poisoned, dropping audio data");
                        return;
                    };
                    append_block(&mut buf, data, channels);
                },
                err_fn,
                None,
            )
            .context("Failed to build input stream (microphone permissions?)")?;

        stream.play().context("Failed to start audio stream")?;

        self.stream = Some(stream);
        self.started_at = Some(Instant::now());
        println!("🎙️  Recording started");

        Ok(())
    }

    /// Close the stream and take ownership of the accumulated samples.
    pub fn stop(&mut self) -> Result<Vec<i16>> {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            println!("Recording stopped");
        }
        self.started_at = None;

        let samples = {
            let mut buffer = self.buffer.lock().unwrap();
            std::mem::take(&mut *buffer)
        };

        println!(
            "Captured {} samples ({:.2}s of audio at {}Hz)",
            samples.len(),
            samples.len() as f32 / SAMPLE_RATE as f32,
            SAMPLE_RATE
        );

        Ok(samples)
    }

    /// Discard the buffer and release the stream without processing.
    pub fn cancel(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            println!("🚫 Recording cancelled");
        }
        self.started_at = None;
        self.buffer.lock().unwrap().clear();
    }

    pub fn is_recording(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Append one callback block to the capture buffer.
///
/// Copies the data (the callback slice does not outlive the call),
/// downmixes to mono by averaging channels, and converts to i16.
pub fn append_block(buffer: &mut Vec<i16>, data: &[f32], channels: usize) {
    if channels <= 1 {
        buffer.extend(data.iter().map(|&s| f32_to_i16(s)));
    } else {
        for frame in data.chunks(channels) {
            let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
            buffer.push(f32_to_i16(mono));
        }
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}
