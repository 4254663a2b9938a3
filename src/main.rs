mod capture;
mod chunker;
mod clipboard;
mod config;
mod gate;
mod hotkey;
mod playback;
mod scratch;
mod settings;
mod status;
mod synthesis;
mod transcribe;
mod tray;

use anyhow::Result;
use capture::{AudioCapture, SAMPLE_RATE};
use clap::{Parser, Subcommand};
use clipboard::ClipboardHistory;
use config::Config;
use gate::{RecordingGate, Verdict};
use hotkey::{HotkeyEvent, HotkeyManager};
use playback::{PlaybackCommand, PlaybackController};
use settings::{SettingsStore, VOICE_KEY};
use status::StatusMessage;
use synthesis::{SpeechSynthesisStreamer, VoiceService};
use transcribe::TranscriptionPipeline;
use tray::{TrayApp, TrayMenuEvent};
use tao::event_loop::{ControlFlow, EventLoop};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Parser)]
#[command(name = "voicetray")]
#[command(about = "System tray speech tool: hotkey dictation to clipboard and text-to-speech", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the voices available from the synthesis service
    ListVoices,
    /// Persist the voice used for speech synthesis
    SetVoice {
        /// Voice identifier from `list-voices`
        voice_id: String,
    },
    /// Speak text through the synthesis pipeline without the tray
    Speak {
        /// Text to synthesize and play
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ListVoices) => list_voices_command(),
        Some(Commands::SetVoice { voice_id }) => set_voice_command(&voice_id),
        Some(Commands::Speak { text }) => speak_command(&text),
        None => run_app(),
    }
}

/// Voice selection: settings store first, config default otherwise.
fn selected_voice(config: &Config, store: &SettingsStore) -> Result<String> {
    Ok(store
        .get(VOICE_KEY)?
        .unwrap_or_else(|| config.synthesis.default_voice.clone()))
}

fn list_voices_command() -> Result<()> {
    let config = Config::load_or_create()?;
    let store = SettingsStore::new(Config::settings_path()?);
    let selected = selected_voice(&config, &store)?;

    let service = VoiceService::new(&config.synthesis, selected.clone())?;
    let voices = service.list_voices()?;

    println!("Available voices:");
    for voice in &voices {
        let marker = if voice.voice_id == selected { "→" } else { " " };
        println!("  {} {} - {}", marker, voice.voice_id, voice.name);
    }
    println!();
    println!("Select one with: voicetray set-voice <voice-id>");

    Ok(())
}

fn set_voice_command(voice_id: &str) -> Result<()> {
    let store = SettingsStore::new(Config::settings_path()?);
    store.set(VOICE_KEY, voice_id)?;
    println!("✓ Voice set to {}", voice_id);
    Ok(())
}

fn speak_command(text: &str) -> Result<()> {
    let config = Config::load_or_create()?;
    let store = SettingsStore::new(Config::settings_path()?);
    let voice = selected_voice(&config, &store)?;

    let service = VoiceService::new(&config.synthesis, voice)?;
    let streamer =
        SpeechSynthesisStreamer::new(service, &config.synthesis, Config::synthesis_chunk_path()?);
    let mut playback = PlaybackController::new()?;

    // No pause/resume source in CLI mode; the command channel stays empty.
    let (_command_tx, command_rx) = channel::<PlaybackCommand>();
    let (status_tx, status_rx) = channel::<StatusMessage>();

    thread::spawn(move || {
        for message in status_rx {
            match message {
                StatusMessage::Info(text) => println!("{}", text),
                StatusMessage::Error(text) => eprintln!("❌ {}", text),
                _ => {}
            }
        }
    });

    streamer.speak(text, &mut playback, &command_rx, &status_tx)?;
    Ok(())
}

fn run_app() -> Result<()> {
    println!("Voicetray - System Tray Speech Tool");

    let config = Config::load_or_create()?;
    println!("Configuration loaded successfully");

    let store = SettingsStore::new(Config::settings_path()?);
    let voice = selected_voice(&config, &store)?;

    let gate = RecordingGate::new(&config.recording);
    let pipeline = Arc::new(TranscriptionPipeline::new(
        config.transcription.clone(),
        Config::recording_wav_path()?,
        Config::transcript_log_path()?,
    )?);
    let history = Arc::new(Mutex::new(ClipboardHistory::new()));

    let mut audio_capture = AudioCapture::new()?;

    let event_loop = EventLoop::new();

    let mut tray_app = TrayApp::new()?;
    println!("System tray initialized");

    let hotkey_manager = HotkeyManager::new(&config.hotkeys)?;

    // Workers post here; only the event loop touches the tray.
    let (status_tx, status_rx) = channel::<StatusMessage>();

    let transcribing = Arc::new(AtomicBool::new(false));
    let speaking = Arc::new(AtomicBool::new(false));
    // Command sender into the currently running speak worker, if any.
    let mut speak_commands: Option<Sender<PlaybackCommand>> = None;

    let synthesis_config = config.synthesis.clone();
    let chunk_path = Config::synthesis_chunk_path()?;

    // Blink timer for recording indicator (blink every 500ms)
    let mut last_blink = std::time::Instant::now();
    let blink_interval = std::time::Duration::from_millis(500);

    event_loop.run(move |_event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(
            std::time::Instant::now() + std::time::Duration::from_millis(50),
        );

        if audio_capture.is_recording() && last_blink.elapsed() >= blink_interval {
            tray_app.blink_recording_indicator();
            last_blink = std::time::Instant::now();
        }

        // Drain worker status messages (non-blocking)
        while let Ok(message) = status_rx.try_recv() {
            match message {
                StatusMessage::Info(text) => {
                    println!("{}", text);
                    tray_app.set_status(&text);
                }
                StatusMessage::Transcript(text) => {
                    tray_app.set_status(&format!("Copied: {:.60}", text));
                }
                StatusMessage::Error(text) => {
                    eprintln!("❌ {}", text);
                    tray_app.set_status(&text);
                }
                StatusMessage::SpeakFinished => {
                    speaking.store(false, Ordering::SeqCst);
                    speak_commands = None;
                }
            }
        }

        if let Some(event) = hotkey_manager.poll_event() {
            match event {
                HotkeyEvent::RecordPressed => {
                    start_recording(&mut audio_capture, &mut tray_app);
                }
                HotkeyEvent::RecordReleased => {
                    stop_and_process(
                        &mut audio_capture,
                        &mut tray_app,
                        gate,
                        &pipeline,
                        &history,
                        &status_tx,
                        &transcribing,
                    );
                }
                HotkeyEvent::CancelPressed => {
                    cancel_recording(&mut audio_capture, &mut tray_app);
                }
                HotkeyEvent::PastePrevious => {
                    paste_previous(&history, &mut tray_app);
                }
            }
        }

        if let Some(event) = tray_app.poll_event() {
            match event {
                TrayMenuEvent::StartRecording => {
                    start_recording(&mut audio_capture, &mut tray_app);
                }
                TrayMenuEvent::StopRecording => {
                    stop_and_process(
                        &mut audio_capture,
                        &mut tray_app,
                        gate,
                        &pipeline,
                        &history,
                        &status_tx,
                        &transcribing,
                    );
                }
                TrayMenuEvent::CancelRecording => {
                    cancel_recording(&mut audio_capture, &mut tray_app);
                }
                TrayMenuEvent::SpeakClipboard => match clipboard::read_clipboard() {
                    Ok(text) => {
                        speak_commands = start_speak(
                            text,
                            &synthesis_config,
                            &voice,
                            &chunk_path,
                            &status_tx,
                            &speaking,
                        )
                        .or(speak_commands.take());
                    }
                    Err(e) => eprintln!("✗ {:#}", e),
                },
                TrayMenuEvent::PausePlayback => {
                    if let Some(commands) = &speak_commands {
                        let _ = commands.send(PlaybackCommand::Pause);
                    }
                }
                TrayMenuEvent::ResumePlayback => {
                    if let Some(commands) = &speak_commands {
                        let _ = commands.send(PlaybackCommand::Resume);
                    }
                }
                TrayMenuEvent::Settings => {
                    if let Ok(config_path) = Config::config_path() {
                        println!("Settings file: {}", config_path.display());
                    }
                }
                TrayMenuEvent::Quit => {
                    println!("Quitting application...");
                    *control_flow = ControlFlow::Exit;
                }
            }
        }
    });
}

fn start_recording(audio_capture: &mut AudioCapture, tray_app: &mut TrayApp) {
    if audio_capture.is_recording() {
        return; // Recording is exclusive; double-start is a no-op
    }
    match audio_capture.start() {
        Ok(()) => {
            tray_app.set_recording(true);
            tray_app.set_status("Recording...");
        }
        Err(e) => {
            eprintln!("✗ Failed to start recording: {:#}", e);
            tray_app.set_status("Microphone unavailable");
        }
    }
}

fn cancel_recording(audio_capture: &mut AudioCapture, tray_app: &mut TrayApp) {
    if audio_capture.is_recording() {
        audio_capture.cancel();
        tray_app.set_recording(false);
        tray_app.set_status("Recording cancelled");
    }
}

/// Stop the capture and hand the buffer to a transcription worker.
fn stop_and_process(
    audio_capture: &mut AudioCapture,
    tray_app: &mut TrayApp,
    gate: RecordingGate,
    pipeline: &Arc<TranscriptionPipeline>,
    history: &Arc<Mutex<ClipboardHistory>>,
    status_tx: &Sender<StatusMessage>,
    transcribing: &Arc<AtomicBool>,
) {
    if !audio_capture.is_recording() {
        return;
    }

    let samples = match audio_capture.stop() {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("✗ Failed to stop recording: {:#}", e);
            tray_app.set_recording(false);
            return;
        }
    };
    tray_app.set_recording(false);

    // The transient WAV is single-flight; refuse overlapping runs.
    if transcribing.swap(true, Ordering::SeqCst) {
        let _ = status_tx.send(StatusMessage::Error(
            "A transcription is still in progress".to_string(),
        ));
        return;
    }

    tray_app.set_status("Processing...");

    let pipeline = Arc::clone(pipeline);
    let history = Arc::clone(history);
    let status_tx = status_tx.clone();
    let transcribing = Arc::clone(transcribing);

    thread::spawn(move || {
        match gate.validate(&samples, SAMPLE_RATE) {
            Verdict::Accept => match pipeline.transcribe(&samples, SAMPLE_RATE, &history) {
                Ok(text) => {
                    let _ = status_tx.send(StatusMessage::Transcript(text));
                }
                Err(e) => {
                    let _ = status_tx.send(StatusMessage::Error(format!(
                        "Transcription failed: {:#}",
                        e
                    )));
                }
            },
            Verdict::TooShort { duration } => {
                let _ = status_tx.send(StatusMessage::Error(format!(
                    "Recording too short ({:.1}s)",
                    duration
                )));
            }
            Verdict::Silent { peak } => {
                let _ = status_tx.send(StatusMessage::Error(format!(
                    "Recording is silent (peak amplitude {})",
                    peak
                )));
            }
        }
        transcribing.store(false, Ordering::SeqCst);
    });
}

/// Re-copy the second-most-recent transcript to the clipboard.
fn paste_previous(history: &Arc<Mutex<ClipboardHistory>>, tray_app: &mut TrayApp) {
    let previous = history.lock().unwrap().previous().map(str::to_string);
    match previous {
        Some(text) => match clipboard::copy_to_clipboard(&text) {
            Ok(()) => {
                println!("✅ Previous transcript copied: {:.60}", text);
                tray_app.set_status("Previous transcript copied");
            }
            Err(e) => eprintln!("✗ Failed to copy previous transcript: {:#}", e),
        },
        None => {
            println!("No previous transcript in history");
            tray_app.set_status("No previous transcript");
        }
    }
}

/// Spawn a speak worker for one text; returns the command sender feeding
/// pause/resume into it, or None when the request was rejected.
fn start_speak(
    text: String,
    synthesis_config: &config::SynthesisConfig,
    voice: &str,
    chunk_path: &std::path::Path,
    status_tx: &Sender<StatusMessage>,
    speaking: &Arc<AtomicBool>,
) -> Option<Sender<PlaybackCommand>> {
    if text.trim().is_empty() {
        let _ = status_tx.send(StatusMessage::Info("Clipboard is empty".to_string()));
        return None;
    }

    // One speak request at a time; overlapping requests are rejected.
    if speaking.swap(true, Ordering::SeqCst) {
        let _ = status_tx.send(StatusMessage::Error(
            "Speech playback already in progress".to_string(),
        ));
        return None;
    }

    let (command_tx, command_rx) = channel::<PlaybackCommand>();
    let synthesis_config = synthesis_config.clone();
    let voice = voice.to_string();
    let chunk_path = chunk_path.to_path_buf();
    let status_tx = status_tx.clone();

    thread::spawn(move || {
        // The output stream is created on this thread and stays here.
        let result = (|| -> Result<()> {
            let service = VoiceService::new(&synthesis_config, voice)?;
            let streamer = SpeechSynthesisStreamer::new(service, &synthesis_config, chunk_path);
            let mut playback = PlaybackController::new()?;
            streamer.speak(&text, &mut playback, &command_rx, &status_tx)?;
            Ok(())
        })();

        if let Err(e) = result {
            let _ = status_tx.send(StatusMessage::Error(format!("{:#}", e)));
        }
        let _ = status_tx.send(StatusMessage::SpeakFinished);
    });

    Some(command_tx)
}
