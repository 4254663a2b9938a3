use anyhow::{Context, Result, bail};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::clipboard::{self, ClipboardHistory};
use crate::config::TranscriptionConfig;
use crate::scratch::TempFileGuard;

/// Runs one recording through the cloud transcription service.
///
/// Single-flight by design: the transient WAV lives at a fixed path and is
/// overwritten per call, so callers must not run two transcriptions at once.
pub struct TranscriptionPipeline {
    client: reqwest::blocking::Client,
    config: TranscriptionConfig,
    api_key: String,
    wav_path: PathBuf,
    log_path: PathBuf,
}

impl TranscriptionPipeline {
    pub fn new(
        config: TranscriptionConfig,
        wav_path: PathBuf,
        log_path: PathBuf,
    ) -> Result<Self> {
        let api_key = if config.api_key.is_empty() {
            std::env::var("OPENAI_API_KEY")
                .context("No transcription API key in config or OPENAI_API_KEY")?
        } else {
            config.api_key.clone()
        };

        Ok(TranscriptionPipeline {
            client: reqwest::blocking::Client::new(),
            config,
            api_key,
            wav_path,
            log_path,
        })
    }

    /// Encode, submit, log, and publish one recording.
    ///
    /// The transient WAV is removed on every exit path. Service and
    /// transport errors surface as-is; nothing is retried.
    pub fn transcribe(
        &self,
        samples: &[i16],
        sample_rate: u32,
        history: &Mutex<ClipboardHistory>,
    ) -> Result<String> {
        let guard = TempFileGuard::new(self.wav_path.clone());
        write_wav(guard.path(), samples, sample_rate)?;

        let text = self.request_transcript(guard.path())?;
        let text = text.trim().to_string();

        append_log(&self.log_path, &text)?;

        history.lock().unwrap().push(text.clone());
        clipboard::copy_to_clipboard(&text)?;

        println!("✅ Transcribed and copied: {:.60}", text);
        Ok(text)
    }

    fn request_transcript(&self, wav_path: &Path) -> Result<String> {
        let form = reqwest::blocking::multipart::Form::new()
            .file("file", wav_path)
            .context("Failed to attach recording to request")?
            .text("model", self.config.model.clone())
            .text("response_format", "text")
            .text("language", self.config.language.clone());

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .context("Transcription request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("Transcription service error {}: {}", status, body);
        }

        response.text().context("Failed to read transcript body")
    }
}

/// Write mono 16-bit PCM to a WAV container.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        hound::WavWriter::create(path, spec).context("Failed to create recording WAV")?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .context("Failed to write WAV sample")?;
    }
    writer.finalize().context("Failed to finalize WAV")?;
    Ok(())
}

/// Append one timestamped transcript line to the log (created if absent).
pub fn append_log(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open transcript log")?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "{}: {}\n", timestamp, text).context("Failed to append to transcript log")?;
    Ok(())
}
