// Capture buffer accumulation: downmix, conversion, and block ordering.

use voicetray::capture::append_block;

#[test]
fn mono_blocks_concatenate_in_delivery_order() {
    let mut buffer = Vec::new();

    append_block(&mut buffer, &[0.0, 0.5], 1);
    append_block(&mut buffer, &[-0.5, 1.0], 1);

    assert_eq!(buffer, vec![0, 16383, -16383, 32767]);
}

#[test]
fn stereo_frames_are_averaged_to_mono() {
    let mut buffer = Vec::new();

    append_block(&mut buffer, &[0.5, 0.5, 1.0, 0.0, -0.5, 0.5], 2);

    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer[0], 16383); // 0.5 * 32767
    assert_eq!(buffer[1], 16383); // (1.0 + 0.0) / 2
    assert_eq!(buffer[2], 0); // (-0.5 + 0.5) / 2
}

#[test]
fn samples_beyond_full_scale_are_clamped() {
    let mut buffer = Vec::new();

    append_block(&mut buffer, &[2.0, -2.0], 1);

    assert_eq!(buffer, vec![32767, -32768]);
}

#[test]
fn empty_block_leaves_buffer_unchanged() {
    let mut buffer = vec![42];

    append_block(&mut buffer, &[], 1);
    append_block(&mut buffer, &[], 2);

    assert_eq!(buffer, vec![42]);
}

#[test]
fn interleaved_blocks_preserve_sample_count() {
    let mut buffer = Vec::new();
    let block = vec![0.1f32; 480]; // 240 stereo frames

    for _ in 0..5 {
        append_block(&mut buffer, &block, 2);
    }

    assert_eq!(buffer.len(), 5 * 240);
}
