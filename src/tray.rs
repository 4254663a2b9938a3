use anyhow::{Context, Result};
use tray_icon::{
    menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder,
};
use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuEvent {
    StartRecording,
    StopRecording,
    CancelRecording,
    SpeakClipboard,
    PausePlayback,
    ResumePlayback,
    Settings,
    Quit,
}

pub struct TrayApp {
    tray_icon: TrayIcon,
    start_item: MenuItem,
    stop_item: MenuItem,
    cancel_item: MenuItem,
    speak_item: MenuItem,
    pause_item: MenuItem,
    resume_item: MenuItem,
    settings_item: MenuItem,
    base_icon: tray_icon::Icon,
    recording_icon: tray_icon::Icon,
    is_recording_visible: bool,
}

impl TrayApp {
    pub fn new() -> Result<Self> {
        let size = 32u32;
        let base_icon = Self::create_mic_icon(size, false)?;
        let recording_icon = Self::create_mic_icon(size, true)?;

        let menu = Menu::new();

        let start_item = MenuItem::new("Start Recording", true, None);
        let stop_item = MenuItem::new("Stop Recording", false, None);
        let cancel_item = MenuItem::new("Cancel Recording", false, None);
        let speak_item = MenuItem::new("Speak Clipboard", true, None);
        let pause_item = MenuItem::new("Pause Playback", true, None);
        let resume_item = MenuItem::new("Resume Playback", true, None);
        let settings_item = MenuItem::new("Settings", true, None);

        menu.append(&start_item)?;
        menu.append(&stop_item)?;
        menu.append(&cancel_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&speak_item)?;
        menu.append(&pause_item)?;
        menu.append(&resume_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&settings_item)?;
        menu.append(&PredefinedMenuItem::separator())?;
        menu.append(&PredefinedMenuItem::quit(Some("Quit")))?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("Voicetray ready")
            .with_icon(base_icon.clone())
            .build()
            .context("Failed to create tray icon")?;

        Ok(TrayApp {
            tray_icon,
            start_item,
            stop_item,
            cancel_item,
            speak_item,
            pause_item,
            resume_item,
            settings_item,
            base_icon,
            recording_icon,
            is_recording_visible: false,
        })
    }

    /// Microphone glyph; the recording variant carries a red dot.
    fn create_mic_icon(size: u32, recording: bool) -> Result<tray_icon::Icon> {
        let mut img = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));

        // White to match other menu bar icons
        let white = Rgba([255, 255, 255, 255]);

        // Capsule body
        Self::draw_circle(&mut img, 16, 8, 4, white);
        Self::draw_rect(&mut img, 12, 8, 9, 10, white);
        Self::draw_circle(&mut img, 16, 18, 4, white);

        // Stem and base
        Self::draw_rect(&mut img, 15, 22, 3, 4, white);
        Self::draw_rect(&mut img, 10, 26, 13, 2, white);

        if recording {
            let red = Rgba([255, 59, 48, 255]);
            Self::draw_circle(&mut img, 26, 6, 4, red);
        }

        tray_icon::Icon::from_rgba(img.into_raw(), size, size)
            .context("Failed to create tray icon image")
    }

    fn draw_circle(img: &mut RgbaImage, cx: u32, cy: u32, radius: u32, color: Rgba<u8>) {
        let width = img.width();
        let height = img.height();
        let r_sq = (radius * radius) as i32;

        for dy in -(radius as i32)..=(radius as i32) {
            for dx in -(radius as i32)..=(radius as i32) {
                if dx * dx + dy * dy <= r_sq {
                    let px = (cx as i32 + dx) as u32;
                    let py = (cy as i32 + dy) as u32;
                    if px < width && py < height {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }
    }

    fn draw_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        let width = img.width();
        let height = img.height();

        for py in y..(y + h).min(height) {
            for px in x..(x + w).min(width) {
                img.put_pixel(px, py, color);
            }
        }
    }

    pub fn set_recording(&mut self, is_recording: bool) {
        self.start_item.set_enabled(!is_recording);
        self.stop_item.set_enabled(is_recording);
        self.cancel_item.set_enabled(is_recording);

        // If stopping, reset to base icon
        if !is_recording {
            let _ = self.tray_icon.set_icon(Some(self.base_icon.clone()));
            self.is_recording_visible = false;
        }
    }

    /// Show status text as the tray tooltip.
    pub fn set_status(&mut self, text: &str) {
        let _ = self.tray_icon.set_tooltip(Some(text));
    }

    /// Toggle the recording indicator (call this periodically for blinking effect)
    pub fn blink_recording_indicator(&mut self) {
        self.is_recording_visible = !self.is_recording_visible;
        let icon = if self.is_recording_visible {
            &self.recording_icon
        } else {
            &self.base_icon
        };
        let _ = self.tray_icon.set_icon(Some(icon.clone()));
    }

    pub fn poll_event(&self) -> Option<TrayMenuEvent> {
        if let Ok(event) = MenuEvent::receiver().try_recv() {
            let id = event.id();

            if id == self.start_item.id() {
                return Some(TrayMenuEvent::StartRecording);
            } else if id == self.stop_item.id() {
                return Some(TrayMenuEvent::StopRecording);
            } else if id == self.cancel_item.id() {
                return Some(TrayMenuEvent::CancelRecording);
            } else if id == self.speak_item.id() {
                return Some(TrayMenuEvent::SpeakClipboard);
            } else if id == self.pause_item.id() {
                return Some(TrayMenuEvent::PausePlayback);
            } else if id == self.resume_item.id() {
                return Some(TrayMenuEvent::ResumePlayback);
            } else if id == self.settings_item.id() {
                return Some(TrayMenuEvent::Settings);
            } else if id.0 == "quit" {
                return Some(TrayMenuEvent::Quit);
            }
        }
        None
    }
}
