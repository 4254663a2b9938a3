// Config parsing defaults and validation bounds.

use voicetray::config::Config;

#[test]
fn default_config_passes_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn empty_yaml_fills_every_default() {
    let config: Config = serde_yaml::from_str("{}").expect("parse empty config");

    assert_eq!(config.hotkeys.record, "F3");
    assert_eq!(config.hotkeys.cancel, "F4");
    assert_eq!(config.hotkeys.paste_previous, "Ctrl+Shift+V");
    assert_eq!(config.recording.min_duration_secs, 1.0);
    assert_eq!(config.recording.silence_threshold, 200);
    assert_eq!(config.transcription.model, "whisper-1");
    assert_eq!(config.transcription.language, "de");
    assert_eq!(config.synthesis.model, "eleven_multilingual_v2");
    assert_eq!(config.synthesis.max_chunk_chars, 500);
    assert_eq!(config.synthesis.stability, 0.5);
    assert_eq!(config.synthesis.similarity_boost, 0.75);
}

#[test]
fn partial_yaml_overrides_only_named_fields() {
    let yaml = r#"
recording:
  silence_threshold: 500
transcription:
  language: en
"#;
    let config: Config = serde_yaml::from_str(yaml).expect("parse partial config");

    assert_eq!(config.recording.silence_threshold, 500);
    assert_eq!(config.recording.min_duration_secs, 1.0);
    assert_eq!(config.transcription.language, "en");
    assert_eq!(config.transcription.model, "whisper-1");
}

#[test]
fn validation_rejects_out_of_range_values() {
    let mut config = Config::default();
    config.recording.min_duration_secs = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.synthesis.stability = 1.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.synthesis.max_chunk_chars = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.synthesis.playback_poll_ms = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.hotkeys.record = String::new();
    assert!(config.validate().is_err());
}
