// Recording gate: duration and silence checks applied to finished captures.

use voicetray::config::RecordingConfig;
use voicetray::gate::{RecordingGate, Verdict};

const SAMPLE_RATE: u32 = 16000;

fn default_gate() -> RecordingGate {
    RecordingGate::new(&RecordingConfig {
        min_duration_secs: 1.0,
        silence_threshold: 200,
    })
}

/// Build `seconds` worth of 16kHz samples at a constant amplitude.
fn tone(seconds: f32, amplitude: i16) -> Vec<i16> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    vec![amplitude; len]
}

#[test]
fn accepts_loud_recording_above_minimum_duration() {
    let gate = default_gate();
    let samples = tone(2.0, 1000);

    assert_eq!(gate.validate(&samples, SAMPLE_RATE), Verdict::Accept);
}

#[test]
fn rejects_short_recording_before_checking_amplitude() {
    let gate = default_gate();
    // Full-scale but only half a second: duration check must win.
    let samples = tone(0.5, i16::MAX);

    match gate.validate(&samples, SAMPLE_RATE) {
        Verdict::TooShort { duration } => {
            assert!((duration - 0.5).abs() < 0.01, "duration was {}", duration);
        }
        other => panic!("expected TooShort, got {:?}", other),
    }
}

#[test]
fn rejects_silent_recording_and_reports_peak() {
    let gate = default_gate();
    let mut samples = tone(2.0, 0);
    samples[100] = 150;
    samples[200] = -180;

    match gate.validate(&samples, SAMPLE_RATE) {
        Verdict::Silent { peak } => assert_eq!(peak, 180),
        other => panic!("expected Silent, got {:?}", other),
    }
}

#[test]
fn peak_exactly_at_threshold_passes() {
    let gate = default_gate();
    let mut samples = tone(2.0, 0);
    samples[0] = 200;

    assert_eq!(gate.validate(&samples, SAMPLE_RATE), Verdict::Accept);
}

#[test]
fn empty_recording_is_too_short() {
    let gate = default_gate();

    match gate.validate(&[], SAMPLE_RATE) {
        Verdict::TooShort { duration } => assert_eq!(duration, 0.0),
        other => panic!("expected TooShort, got {:?}", other),
    }
}

#[test]
fn negative_peaks_count_toward_amplitude() {
    let gate = default_gate();
    let mut samples = tone(2.0, 0);
    samples[42] = -5000;

    assert_eq!(gate.validate(&samples, SAMPLE_RATE), Verdict::Accept);
}

#[test]
fn validate_does_not_modify_samples() {
    let gate = default_gate();
    let samples = tone(2.0, 1000);
    let before = samples.clone();

    let _ = gate.validate(&samples, SAMPLE_RATE);
    let _ = gate.validate(&samples, SAMPLE_RATE);

    assert_eq!(samples, before);
}
