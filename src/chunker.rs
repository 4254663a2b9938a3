/// Splits text into sentences on terminal punctuation followed by whitespace.
///
/// The trailing punctuation stays attached to its sentence. Whitespace-only
/// input yields no sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);

        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let sentence = current.trim().to_string();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let sentence = current.trim().to_string();
    if !sentence.is_empty() {
        sentences.push(sentence);
    }

    sentences
}

/// Greedily packs sentences into chunks of at most `max_chars` characters.
///
/// A single sentence longer than `max_chars` is emitted as its own
/// oversized chunk rather than split mid-sentence; the voice service has
/// to deal with it.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if current.is_empty() {
            current = sentence;
        } else if current.chars().count() + sentence.chars().count() + 1 <= max_chars {
            current.push(' ');
            current.push_str(&sentence);
        } else {
            chunks.push(std::mem::take(&mut current));
            current = sentence;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
