// Library exports for testing
pub mod capture;
pub mod chunker;
pub mod clipboard;
pub mod config;
pub mod gate;
pub mod playback;
pub mod scratch;
pub mod settings;
pub mod status;
pub mod synthesis;
pub mod transcribe;
