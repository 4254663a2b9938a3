use crate::config::RecordingConfig;

/// Outcome of validating a finished recording before transcription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Accept,
    /// Recording shorter than the configured minimum, in seconds.
    TooShort { duration: f32 },
    /// Peak amplitude below the silence threshold (±32767 scale).
    Silent { peak: i32 },
}

/// Rejects recordings that are too short or effectively silent.
///
/// Both checks are cheap and run on the worker thread before any audio
/// is written to disk or sent to the transcription service.
#[derive(Debug, Clone, Copy)]
pub struct RecordingGate {
    min_duration_secs: f32,
    silence_threshold: i32,
}

impl RecordingGate {
    pub fn new(config: &RecordingConfig) -> Self {
        RecordingGate {
            min_duration_secs: config.min_duration_secs,
            silence_threshold: i32::from(config.silence_threshold),
        }
    }

    pub fn validate(&self, samples: &[i16], sample_rate: u32) -> Verdict {
        let duration = samples.len() as f32 / sample_rate as f32;
        if duration < self.min_duration_secs {
            return Verdict::TooShort { duration };
        }

        let peak = samples
            .iter()
            .map(|&s| i32::from(s).abs())
            .max()
            .unwrap_or(0);
        if peak < self.silence_threshold {
            return Verdict::Silent { peak };
        }

        Verdict::Accept
    }
}
