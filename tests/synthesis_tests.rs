// Sequential chunk pipeline ordering and mp3 sample-rate conversion.

use std::cell::RefCell;

use voicetray::synthesis::{resample_linear, run_chunk_sequence, SynthesisError};

fn chunks(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn every_chunk_is_synthesized_then_played_in_order() {
    let log = RefCell::new(Vec::new());
    let input = chunks(&["first", "second", "third"]);

    run_chunk_sequence(
        &input,
        |text| {
            log.borrow_mut().push(format!("synth:{}", text));
            Ok(vec![1, 2, 3])
        },
        |_samples| {
            let last = log.borrow().last().cloned().unwrap_or_default();
            log.borrow_mut().push(format!("play-after:{}", last));
            Ok(())
        },
    )
    .expect("sequence should succeed");

    // Strictly sequential: chunk N is played before chunk N+1 is requested.
    assert_eq!(
        log.into_inner(),
        vec![
            "synth:first",
            "play-after:synth:first",
            "synth:second",
            "play-after:synth:second",
            "synth:third",
            "play-after:synth:third",
        ]
    );
}

#[test]
fn synthesized_samples_flow_through_to_playback() {
    let played = RefCell::new(Vec::new());

    run_chunk_sequence(
        &chunks(&["a", "bb"]),
        |text| Ok(vec![text.len() as i16; 4]),
        |samples| {
            played.borrow_mut().push(samples);
            Ok(())
        },
    )
    .expect("sequence should succeed");

    assert_eq!(played.into_inner(), vec![vec![1i16; 4], vec![2i16; 4]]);
}

#[test]
fn synthesis_failure_aborts_before_playing_that_chunk() {
    let log = RefCell::new(Vec::new());

    let result = run_chunk_sequence(
        &chunks(&["ok", "boom", "never"]),
        |text| {
            log.borrow_mut().push(format!("synth:{}", text));
            if text == "boom" {
                Err(SynthesisError::Service("quota exceeded".to_string()))
            } else {
                Ok(vec![0; 2])
            }
        },
        |_| {
            log.borrow_mut().push("play".to_string());
            Ok(())
        },
    );

    assert!(matches!(result, Err(SynthesisError::Service(_))));
    // "never" must not be requested after the failure.
    assert_eq!(log.into_inner(), vec!["synth:ok", "play", "synth:boom"]);
}

#[test]
fn playback_failure_stops_the_sequence() {
    let synth_calls = RefCell::new(0);

    let result = run_chunk_sequence(
        &chunks(&["one", "two"]),
        |_| {
            *synth_calls.borrow_mut() += 1;
            Ok(vec![0; 2])
        },
        |_| Err(SynthesisError::Playback("device lost".to_string())),
    );

    assert!(matches!(result, Err(SynthesisError::Playback(_))));
    assert_eq!(*synth_calls.borrow(), 1);
}

#[test]
fn empty_chunk_list_is_a_no_op() {
    let result = run_chunk_sequence(
        &[],
        |_| panic!("synthesize must not be called"),
        |_| panic!("play must not be called"),
    );
    assert!(result.is_ok());
}

#[test]
fn resample_identity_when_rates_match() {
    let input = vec![1, 2, 3, 4];
    assert_eq!(resample_linear(&input, 16000, 16000), input);
}

#[test]
fn resample_halves_sample_count_when_downsampling_by_two() {
    let input: Vec<i16> = (0..1000).collect();
    let output = resample_linear(&input, 32000, 16000);

    assert_eq!(output.len(), 500);
    // Linear interpolation of a ramp stays a ramp at twice the step.
    assert_eq!(output[0], 0);
    assert_eq!(output[10], 20);
}

#[test]
fn resample_upsamples_without_exceeding_input_range() {
    let input = vec![0, 10000, -10000, 0];
    let output = resample_linear(&input, 22050, 16000 * 2);

    assert!(output.len() > input.len());
    for &s in &output {
        assert!(s.abs() <= 10000, "interpolated sample out of range: {}", s);
    }
}

#[test]
fn resample_empty_input_is_empty() {
    assert!(resample_linear(&[], 44100, 16000).is_empty());
}
