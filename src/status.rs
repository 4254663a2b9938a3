/// Message posted by worker threads, drained by the event-loop thread.
///
/// Workers never touch the tray directly; tooltip and console output
/// flow through this channel.
#[derive(Debug)]
pub enum StatusMessage {
    /// Progress text shown as the tray tooltip.
    Info(String),
    /// A transcription finished and was copied to the clipboard.
    Transcript(String),
    /// An operation failed with a user-visible message.
    Error(String),
    /// The speak worker finished (or aborted) its chunk sequence.
    SpeakFinished,
}
