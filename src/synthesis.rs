use serde::Deserialize;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;
use thiserror::Error;

use crate::capture::SAMPLE_RATE;
use crate::chunker::chunk_text;
use crate::config::SynthesisConfig;
use crate::playback::{PlaybackCommand, PlaybackController, ResumeOutcome};
use crate::scratch::TempFileGuard;
use crate::status::StatusMessage;

/// Failures while speaking. Decode problems are reported distinctly from
/// service/network problems; either aborts the remaining chunk sequence.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("voice service error: {0}")]
    Service(String),
    #[error("audio decode error: {0}")]
    Decode(String),
    #[error("playback error: {0}")]
    Playback(String),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        SynthesisError::Service(e.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceInfo>,
}

/// Client for the cloud voice service: per-chunk synthesis requests and
/// the voice catalog listing.
pub struct VoiceService {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
    voice_id: String,
    model: String,
    stability: f32,
    similarity_boost: f32,
}

impl VoiceService {
    pub fn new(config: &SynthesisConfig, voice_id: String) -> anyhow::Result<Self> {
        let api_key = if config.api_key.is_empty() {
            std::env::var("ELEVENLABS_API_KEY")
                .map_err(|_| anyhow::anyhow!("No synthesis API key in config or ELEVENLABS_API_KEY"))?
        } else {
            config.api_key.clone()
        };

        Ok(VoiceService {
            client: reqwest::blocking::Client::new(),
            api_url: config.api_url.clone(),
            api_key,
            voice_id,
            model: config.model.clone(),
            stability: config.stability,
            similarity_boost: config.similarity_boost,
        })
    }

    /// Request compressed audio for one text chunk.
    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/v1/text-to-speech/{}", self.api_url, self.voice_id);

        let body = serde_json::json!({
            "text": text,
            "model_id": self.model,
            "voice_settings": {
                "stability": self.stability,
                "similarity_boost": self.similarity_boost,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SynthesisError::Service(format!(
                "voice service returned {}: {}",
                status, body
            )));
        }

        Ok(response.bytes()?.to_vec())
    }

    /// Fetch the available voice identities for the selection list.
    pub fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let url = format!("{}/v1/voices", self.api_url);

        let response = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SynthesisError::Service(format!(
                "voice listing returned {}: {}",
                status, body
            )));
        }

        let listing: VoicesResponse = response.json()?;
        Ok(listing.voices)
    }
}

/// Decode MP3 bytes to 16kHz mono i16 PCM.
pub fn decode_mp3(data: &[u8]) -> Result<Vec<i16>, SynthesisError> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(data));
    let mut samples: Vec<i16> = Vec::new();
    let mut source_rate = SAMPLE_RATE;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                source_rate = frame.sample_rate as u32;
                if frame.channels <= 1 {
                    samples.extend_from_slice(&frame.data);
                } else {
                    // Downmix by averaging channels
                    for chunk in frame.data.chunks(frame.channels) {
                        let sum: i32 = chunk.iter().map(|&s| i32::from(s)).sum();
                        samples.push((sum / chunk.len() as i32) as i16);
                    }
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(SynthesisError::Decode(format!("MP3 decode failed: {}", e))),
        }
    }

    if samples.is_empty() {
        return Err(SynthesisError::Decode(
            "decoder produced no audio".to_string(),
        ));
    }

    Ok(resample_linear(&samples, source_rate, SAMPLE_RATE))
}

// Simple linear interpolation resampling
pub fn resample_linear(input: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (input.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f64 * ratio;
        let src_idx_floor = src_idx.floor() as usize;
        let src_idx_ceil = (src_idx_floor + 1).min(input.len() - 1);
        let frac = src_idx - src_idx_floor as f64;

        let sample = f64::from(input[src_idx_floor]) * (1.0 - frac)
            + f64::from(input[src_idx_ceil]) * frac;

        output.push(sample.round() as i16);
    }

    output
}

/// Drive the chunk sequence strictly in order: chunk N+1 is not
/// synthesized until chunk N's playback has completed, because `play`
/// returns only once the chunk is done.
pub fn run_chunk_sequence<S, P>(
    chunks: &[String],
    mut synthesize: S,
    mut play: P,
) -> Result<(), SynthesisError>
where
    S: FnMut(&str) -> Result<Vec<i16>, SynthesisError>,
    P: FnMut(Vec<i16>) -> Result<(), SynthesisError>,
{
    for chunk in chunks {
        let samples = synthesize(chunk)?;
        play(samples)?;
    }
    Ok(())
}

/// Chunks input text and plays each synthesized chunk back to back.
pub struct SpeechSynthesisStreamer {
    service: VoiceService,
    max_chunk_chars: usize,
    poll_interval: Duration,
    chunk_path: PathBuf,
}

impl SpeechSynthesisStreamer {
    pub fn new(service: VoiceService, config: &SynthesisConfig, chunk_path: PathBuf) -> Self {
        SpeechSynthesisStreamer {
            service,
            max_chunk_chars: config.max_chunk_chars,
            poll_interval: Duration::from_millis(config.playback_poll_ms),
            chunk_path,
        }
    }

    /// Synthesize and play `text` chunk by chunk, blocking until the last
    /// chunk finishes or the first chunk fails.
    ///
    /// Pause/resume commands are drained while waiting on playback, so a
    /// paused chunk keeps the remaining queue intact until resumed.
    pub fn speak(
        &self,
        text: &str,
        playback: &mut PlaybackController,
        commands: &Receiver<PlaybackCommand>,
        status: &Sender<StatusMessage>,
    ) -> Result<(), SynthesisError> {
        let chunks = chunk_text(text, self.max_chunk_chars);
        if chunks.is_empty() {
            let _ = status.send(StatusMessage::Info("Nothing to speak".to_string()));
            return Ok(());
        }

        let total = chunks.len();
        // Shared between the two closures below; Cell keeps them borrowable
        // at the same time.
        let index = std::cell::Cell::new(0usize);

        run_chunk_sequence(
            &chunks,
            |chunk| {
                index.set(index.get() + 1);
                let _ = status.send(StatusMessage::Info(format!(
                    "Synthesizing chunk {}/{}...",
                    index.get(),
                    total
                )));

                let audio = self.service.synthesize(chunk)?;

                // Decode via the transient file; removed regardless of outcome.
                let guard = TempFileGuard::new(self.chunk_path.clone());
                fs::write(guard.path(), &audio)
                    .map_err(|e| SynthesisError::Decode(e.to_string()))?;
                let data =
                    fs::read(guard.path()).map_err(|e| SynthesisError::Decode(e.to_string()))?;
                drop(guard);

                decode_mp3(&data)
            },
            |samples| {
                let _ = status.send(StatusMessage::Info(format!(
                    "Playing chunk {}/{}...",
                    index.get(),
                    total
                )));

                playback
                    .play(samples)
                    .map_err(|e| SynthesisError::Playback(e.to_string()))?;

                // Bounded-interval polling until this chunk reaches Done;
                // pause keeps us in this loop without burning the queue.
                loop {
                    while let Ok(cmd) = commands.try_recv() {
                        match cmd {
                            PlaybackCommand::Pause => playback.pause(),
                            PlaybackCommand::Resume => {
                                match playback
                                    .resume()
                                    .map_err(|e| SynthesisError::Playback(e.to_string()))?
                                {
                                    ResumeOutcome::NothingToPlay => {
                                        let _ = status.send(StatusMessage::Info(
                                            "Nothing left to play".to_string(),
                                        ));
                                    }
                                    ResumeOutcome::AlreadyPlaying | ResumeOutcome::Resumed => {}
                                }
                            }
                        }
                    }

                    if playback.poll_done() {
                        break;
                    }
                    std::thread::sleep(self.poll_interval);
                }

                Ok(())
            },
        )?;

        let _ = status.send(StatusMessage::Info("Playback finished".to_string()));
        Ok(())
    }
}
