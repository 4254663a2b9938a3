// Sentence splitting and greedy chunk packing for speech synthesis.

use voicetray::chunker::{chunk_text, split_sentences};

#[test]
fn splits_on_sentence_punctuation_followed_by_whitespace() {
    let sentences = split_sentences("Hello there. How are you? Fine!");
    assert_eq!(sentences, vec!["Hello there.", "How are you?", "Fine!"]);
}

#[test]
fn punctuation_without_following_whitespace_does_not_split() {
    // Decimal points and version numbers stay inside one sentence.
    let sentences = split_sentences("Version 2.5 is out. Install it.");
    assert_eq!(sentences, vec!["Version 2.5 is out.", "Install it."]);
}

#[test]
fn trailing_text_without_punctuation_is_kept() {
    let sentences = split_sentences("First. And then some trailing words");
    assert_eq!(sentences, vec!["First.", "And then some trailing words"]);
}

#[test]
fn empty_and_whitespace_input_yield_no_sentences() {
    assert!(split_sentences("").is_empty());
    assert!(split_sentences("   \n\t  ").is_empty());
}

#[test]
fn chunks_respect_character_limit() {
    let chunks = chunk_text("A. B. C.", 5);

    // "A. B." fits in 5 chars, "C." goes to the next chunk.
    assert_eq!(chunks, vec!["A. B.", "C."]);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 5, "chunk too long: {:?}", chunk);
    }
}

#[test]
fn all_sentences_survive_chunking() {
    let text = "One. Two. Three. Four. Five. Six. Seven. Eight.";
    let chunks = chunk_text(text, 12);

    let rejoined = chunks.join(" ");
    assert_eq!(rejoined, text);
}

#[test]
fn oversized_sentence_becomes_its_own_chunk_unsplit() {
    let long = "This single sentence is far longer than the limit allows.";
    let text = format!("Short. {} Tail.", long);
    let chunks = chunk_text(&text, 20);

    assert_eq!(chunks, vec!["Short.", long, "Tail."]);
}

#[test]
fn empty_text_yields_no_chunks() {
    assert!(chunk_text("", 500).is_empty());
    assert!(chunk_text("   ", 500).is_empty());
}

#[test]
fn single_sentence_below_limit_is_one_chunk() {
    let chunks = chunk_text("Just one sentence here.", 500);
    assert_eq!(chunks, vec!["Just one sentence here."]);
}

#[test]
fn limit_counts_characters_not_bytes() {
    // Four umlaut sentences, each 3 chars but more bytes.
    let chunks = chunk_text("Äh! Öh! Üh! Äh!", 7);
    assert_eq!(chunks, vec!["Äh! Öh!", "Üh! Äh!"]);
}
