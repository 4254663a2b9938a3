use anyhow::{Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use crate::config::HotkeyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Record key went down: start capturing.
    RecordPressed,
    /// Record key came up: stop and process.
    RecordReleased,
    CancelPressed,
    /// Chord for re-copying the second-most-recent transcript.
    PastePrevious,
}

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    record_hotkey: HotKey,
    cancel_hotkey: HotKey,
    paste_previous_hotkey: HotKey,
}

impl HotkeyManager {
    pub fn new(config: &HotkeyConfig) -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .context("Failed to create global hotkey manager")?;

        let record_hotkey = Self::parse_hotkey(&config.record)
            .context("Failed to parse record hotkey")?;
        manager.register(record_hotkey)
            .context("Failed to register record hotkey")?;

        let cancel_hotkey = Self::parse_hotkey(&config.cancel)
            .context("Failed to parse cancel hotkey")?;
        manager.register(cancel_hotkey)
            .context("Failed to register cancel hotkey")?;

        let paste_previous_hotkey = Self::parse_hotkey(&config.paste_previous)
            .context("Failed to parse paste-previous hotkey")?;
        manager.register(paste_previous_hotkey)
            .context("Failed to register paste-previous hotkey")?;

        println!("Registered global hotkeys:");
        println!("  Record (hold): {}", config.record);
        println!("  Cancel: {}", config.cancel);
        println!("  Paste previous: {}", config.paste_previous);

        Ok(HotkeyManager {
            manager,
            record_hotkey,
            cancel_hotkey,
            paste_previous_hotkey,
        })
    }

    fn parse_hotkey(hotkey_str: &str) -> Result<HotKey> {
        let parts: Vec<&str> = hotkey_str.split('+').map(|s| s.trim()).collect();

        if parts.is_empty() {
            anyhow::bail!("Hotkey string is empty");
        }

        let mut modifiers = Modifiers::empty();
        let mut key_code = None;

        for part in parts {
            match part.to_lowercase().as_str() {
                "cmd" | "command" | "super" => modifiers |= Modifiers::SUPER,
                "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
                "alt" | "option" => modifiers |= Modifiers::ALT,
                "shift" => modifiers |= Modifiers::SHIFT,
                key => {
                    key_code = Some(Self::parse_key_code(key)?);
                }
            }
        }

        let code = key_code.context("No key code found in hotkey string")?;
        Ok(HotKey::new(Some(modifiers), code))
    }

    fn parse_key_code(key: &str) -> Result<Code> {
        let upper = key.to_uppercase();
        let name = match upper.as_str() {
            s if s.len() == 1 && s.chars().all(|c| c.is_ascii_uppercase()) => format!("Key{}", s),
            s if s.len() == 1 && s.chars().all(|c| c.is_ascii_digit()) => format!("Digit{}", s),
            "SPACE" => "Space".to_string(),
            "ENTER" | "RETURN" => "Enter".to_string(),
            "TAB" => "Tab".to_string(),
            "BACKSPACE" => "Backspace".to_string(),
            "ESCAPE" | "ESC" => "Escape".to_string(),
            // F1..F12 and anything already in Code spelling pass through
            s => s.to_string(),
        };

        name.parse::<Code>()
            .map_err(|_| anyhow::anyhow!("Unknown key code: {}", key))
    }

    pub fn poll_event(&self) -> Option<HotkeyEvent> {
        let event = GlobalHotKeyEvent::receiver().try_recv().ok()?;

        if event.id == self.record_hotkey.id() {
            return Some(match event.state {
                HotKeyState::Pressed => HotkeyEvent::RecordPressed,
                HotKeyState::Released => HotkeyEvent::RecordReleased,
            });
        }
        if event.id == self.cancel_hotkey.id() && event.state == HotKeyState::Pressed {
            return Some(HotkeyEvent::CancelPressed);
        }
        if event.id == self.paste_previous_hotkey.id() && event.state == HotKeyState::Pressed {
            return Some(HotkeyEvent::PastePrevious);
        }
        None
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        let _ = self.manager.unregister(self.record_hotkey);
        let _ = self.manager.unregister(self.cancel_hotkey);
        let _ = self.manager.unregister(self.paste_previous_hotkey);
    }
}
