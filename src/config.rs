use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HotkeyConfig {
    /// Held to record: press starts, release stops.
    #[serde(default = "default_record_hotkey")]
    pub record: String,
    #[serde(default = "default_cancel_hotkey")]
    pub cancel: String,
    /// Chord that re-copies the second-most-recent transcript.
    #[serde(default = "default_paste_previous_hotkey")]
    pub paste_previous: String,
}

fn default_record_hotkey() -> String {
    "F3".to_string()
}

fn default_cancel_hotkey() -> String {
    "F4".to_string()
}

fn default_paste_previous_hotkey() -> String {
    "Ctrl+Shift+V".to_string()
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        HotkeyConfig {
            record: default_record_hotkey(),
            cancel: default_cancel_hotkey(),
            paste_previous: default_paste_previous_hotkey(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecordingConfig {
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: f32,
    /// Peak amplitude below this (±32767 scale) counts as silence.
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: u16,
}

fn default_min_duration() -> f32 {
    1.0
}

fn default_silence_threshold() -> u16 {
    200
}

impl Default for RecordingConfig {
    fn default() -> Self {
        RecordingConfig {
            min_duration_secs: default_min_duration(),
            silence_threshold: default_silence_threshold(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default = "default_stt_model")]
    pub model: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Falls back to the OPENAI_API_KEY environment variable when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_stt_url")]
    pub api_url: String,
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_language() -> String {
    "de".to_string()
}

fn default_stt_url() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_string()
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        TranscriptionConfig {
            model: default_stt_model(),
            language: default_language(),
            api_key: String::new(),
            api_url: default_stt_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    #[serde(default = "default_tts_model")]
    pub model: String,
    /// Used until a voice is picked via `set-voice`.
    #[serde(default = "default_voice")]
    pub default_voice: String,
    #[serde(default = "default_stability")]
    pub stability: f32,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    /// Interval for polling playback completion between chunks.
    #[serde(default = "default_playback_poll_ms")]
    pub playback_poll_ms: u64,
    /// Falls back to the ELEVENLABS_API_KEY environment variable when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_tts_url")]
    pub api_url: String,
}

fn default_tts_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_voice() -> String {
    "ZthjuvLPty3kTMaNKVKb".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

fn default_max_chunk_chars() -> usize {
    500
}

fn default_playback_poll_ms() -> u64 {
    100
}

fn default_tts_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            model: default_tts_model(),
            default_voice: default_voice(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            max_chunk_chars: default_max_chunk_chars(),
            playback_poll_ms: default_playback_poll_ms(),
            api_key: String::new(),
            api_url: default_tts_url(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".voicetray"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.yaml"))
    }

    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.json"))
    }

    pub fn transcript_log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("transcript_log.txt"))
    }

    /// Fixed path of the transient recording WAV (single-flight).
    pub fn recording_wav_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("recording.wav"))
    }

    /// Fixed path of the transient per-chunk synthesis MP3.
    pub fn synthesis_chunk_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("tts_chunk.mp3"))
    }

    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: Config = serde_yaml::from_str(&contents)
                .context("Failed to parse config file")?;

            // Validate configuration after loading
            config.validate()?;

            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            println!("Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.recording.min_duration_secs <= 0.0 {
            bail!("min_duration_secs must be greater than 0");
        }
        if self.recording.min_duration_secs > 30.0 {
            bail!("min_duration_secs must be <= 30");
        }

        if self.recording.silence_threshold > 32767 {
            bail!("silence_threshold must be <= 32767");
        }

        if self.synthesis.max_chunk_chars == 0 {
            bail!("max_chunk_chars must be greater than 0");
        }
        if self.synthesis.playback_poll_ms == 0 || self.synthesis.playback_poll_ms > 1000 {
            bail!("playback_poll_ms must be between 1 and 1000");
        }
        if !(0.0..=1.0).contains(&self.synthesis.stability) {
            bail!("stability must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.synthesis.similarity_boost) {
            bail!("similarity_boost must be between 0.0 and 1.0");
        }

        if self.transcription.model.is_empty() {
            bail!("transcription model cannot be empty");
        }
        if self.transcription.language.is_empty() {
            bail!("language code cannot be empty");
        }
        if self.synthesis.model.is_empty() {
            bail!("synthesis model cannot be empty");
        }

        if self.hotkeys.record.is_empty() {
            bail!("record hotkey cannot be empty");
        }
        if self.hotkeys.cancel.is_empty() {
            bail!("cancel hotkey cannot be empty");
        }
        if self.hotkeys.paste_previous.is_empty() {
            bail!("paste_previous hotkey cannot be empty");
        }

        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        let config_path = Self::config_path()?;
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs::write(&config_path, yaml)
            .context("Failed to write config file")?;

        Ok(())
    }
}
