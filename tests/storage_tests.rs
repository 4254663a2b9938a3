// Filesystem pieces: WAV encoding, transcript log, temp-file cleanup,
// and the persisted settings store.

use std::fs;

use tempfile::tempdir;
use voicetray::scratch::TempFileGuard;
use voicetray::settings::{SettingsStore, VOICE_KEY};
use voicetray::transcribe::{append_log, write_wav};

#[test]
fn write_wav_produces_mono_16bit_pcm() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("recording.wav");
    let samples: Vec<i16> = vec![0, 1000, -1000, i16::MAX, i16::MIN];

    write_wav(&path, &samples, 16000).expect("write wav");

    let reader = hound::WavReader::open(&path).expect("open wav");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    let read: Vec<i16> = reader
        .into_samples::<i16>()
        .map(|s| s.expect("sample"))
        .collect();
    assert_eq!(read, samples);
}

#[test]
fn append_log_adds_timestamped_entries_with_blank_line() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("transcript_log.txt");

    append_log(&path, "first transcript").expect("first append");
    append_log(&path, "second transcript").expect("second append");

    let content = fs::read_to_string(&path).expect("read log");
    let lines: Vec<&str> = content.lines().collect();

    // Each entry is "YYYY-MM-DD HH:MM:SS: text" followed by a blank line.
    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with(": first transcript"), "{:?}", lines[0]);
    assert_eq!(lines[1], "");
    assert!(lines[2].ends_with(": second transcript"), "{:?}", lines[2]);
    assert_eq!(lines[3], "");

    // Timestamp prefix shape: date, space, time.
    let prefix = &lines[0][..19];
    assert_eq!(prefix.len(), 19);
    assert_eq!(&prefix[4..5], "-");
    assert_eq!(&prefix[10..11], " ");
    assert_eq!(&prefix[13..14], ":");
}

#[test]
fn temp_file_guard_removes_file_on_drop() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("chunk.mp3");

    {
        let guard = TempFileGuard::new(path.clone());
        fs::write(guard.path(), b"transient data").expect("write");
        assert!(path.exists());
    }

    assert!(!path.exists());
}

#[test]
fn temp_file_guard_cleans_up_when_work_fails_midway() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("recording.wav");

    let result: Result<(), &str> = (|| {
        let guard = TempFileGuard::new(path.clone());
        fs::write(guard.path(), b"partial").map_err(|_| "io")?;
        Err("service rejected the request")
    })();

    assert!(result.is_err());
    assert!(!path.exists());
}

#[test]
fn temp_file_guard_tolerates_missing_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("never_created.wav");

    let guard = TempFileGuard::new(path.clone());
    drop(guard); // must not panic
    assert!(!path.exists());
}

#[test]
fn settings_store_round_trips_the_voice_key() {
    let dir = tempdir().expect("tempdir");
    let store = SettingsStore::new(dir.path().join("settings.json"));

    assert_eq!(store.get(VOICE_KEY).expect("get"), None);

    store.set(VOICE_KEY, "EXAVITQu4vr4xnSDxMaL").expect("set");
    assert_eq!(
        store.get(VOICE_KEY).expect("get"),
        Some("EXAVITQu4vr4xnSDxMaL".to_string())
    );
}

#[test]
fn settings_store_preserves_unrelated_keys_on_update() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.json");
    let store = SettingsStore::new(path.clone());

    store.set("other_key", "kept").expect("set other");
    store.set(VOICE_KEY, "voice-a").expect("set voice");
    store.set(VOICE_KEY, "voice-b").expect("overwrite voice");

    assert_eq!(store.get("other_key").expect("get"), Some("kept".to_string()));
    assert_eq!(store.get(VOICE_KEY).expect("get"), Some("voice-b".to_string()));

    // The file is plain JSON, readable by hand.
    let raw = fs::read_to_string(&path).expect("read settings");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(parsed["voice_id"], "voice-b");
}

#[test]
fn settings_store_creates_parent_directories() {
    let dir = tempdir().expect("tempdir");
    let store = SettingsStore::new(dir.path().join("nested/deeper/settings.json"));

    store.set(VOICE_KEY, "abc").expect("set");
    assert_eq!(store.get(VOICE_KEY).expect("get"), Some("abc".to_string()));
}
