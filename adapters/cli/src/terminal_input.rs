//! Live keyboard input through crossterm: key mapping for interactive play
//! and the pause control used while replaying frames.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use keyplay_core::{Key, NamedKey};
use keyplay_system_playback::{Pacer, PauseHandle};
use tracing::{info, warn};

/// Meaning of a terminal key press during interactive play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Key forwarded to the world.
    Key(Key),
    /// Ctrl-C: leave the session without forwarding anything.
    Exit,
}

/// Meaning of a terminal key press while a replay draws frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReplayControl {
    TogglePause,
    Stop,
}

/// Maps a crossterm key event to session input. Releases and unbound
/// control chords yield `None`.
pub(crate) fn input_for_event(event: KeyEvent) -> Option<Input> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') => Some(Input::Exit),
            _ => None,
        };
    }

    let named = match event.code {
        KeyCode::Up => NamedKey::ArrowUp,
        KeyCode::Down => NamedKey::ArrowDown,
        KeyCode::Right => NamedKey::ArrowRight,
        KeyCode::Left => NamedKey::ArrowLeft,
        KeyCode::Tab => NamedKey::Tab,
        KeyCode::Enter => NamedKey::Enter,
        KeyCode::Esc => NamedKey::Escape,
        KeyCode::Backspace => NamedKey::Backspace,
        KeyCode::Home => NamedKey::Home,
        KeyCode::End => NamedKey::End,
        KeyCode::Delete => NamedKey::Delete,
        KeyCode::Char(' ') => NamedKey::Space,
        KeyCode::Char(character) => return Some(Input::Key(Key::Char(character))),
        _ => NamedKey::Unidentified,
    };
    Some(Input::Key(Key::Named(named)))
}

/// `p` or space toggles the pause; `Esc`, `q` and Ctrl-C stop the replay.
pub(crate) fn replay_control(event: KeyEvent) -> Option<ReplayControl> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ReplayControl::Stop)
        }
        KeyCode::Char('p' | 'P' | ' ') => Some(ReplayControl::TogglePause),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(ReplayControl::Stop),
        _ => None,
    }
}

/// Blocks until the next key press that means something to a session.
pub(crate) fn next_input() -> Result<Input> {
    loop {
        if let TermEvent::Key(key) = event::read().context("failed to read terminal event")? {
            if let Some(input) = input_for_event(key) {
                return Ok(input);
            }
        }
    }
}

/// Keeps the terminal in raw mode until dropped.
#[derive(Debug)]
pub(crate) struct RawMode;

impl RawMode {
    pub(crate) fn enable() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(error) = disable_raw_mode() {
            warn!(%error, "failed to restore terminal mode");
        }
    }
}

/// Pacer that listens for [`ReplayControl`] keys while it waits.
///
/// A pause holds the suspension open until the replay is resumed or stopped.
/// Stopping leaves the handle paused so the next step is refused.
#[derive(Debug)]
pub(crate) struct KeyboardPacer {
    pause: PauseHandle,
    stopped: bool,
}

impl KeyboardPacer {
    pub(crate) const fn new(pause: PauseHandle) -> Self {
        Self {
            pause,
            stopped: false,
        }
    }

    fn handle(&mut self, control: ReplayControl) {
        match control {
            ReplayControl::TogglePause => {
                let paused = self.pause.toggle();
                info!(paused, "replay pause toggled");
            }
            ReplayControl::Stop => {
                self.stopped = true;
                self.pause.pause();
                info!("replay stopped from the keyboard");
            }
        }
    }

    fn wait_for_control(&mut self, timeout: Option<Duration>) -> Result<bool> {
        if let Some(timeout) = timeout {
            if !event::poll(timeout).context("failed to poll terminal")? {
                return Ok(false);
            }
        }
        if let TermEvent::Key(key) = event::read().context("failed to read terminal event")? {
            if let Some(control) = replay_control(key) {
                self.handle(control);
            }
        }
        Ok(true)
    }
}

impl Pacer for KeyboardPacer {
    fn suspend(&mut self, delay: Duration) {
        let deadline = Instant::now() + delay;
        while !self.stopped {
            let timeout = if self.pause.is_paused() {
                None
            } else {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return;
                }
                Some(remaining)
            };
            match self.wait_for_control(timeout) {
                Ok(true) => {}
                Ok(false) => return,
                Err(error) => {
                    warn!(%error, "keyboard unavailable; finishing the delay unattended");
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_editing_keys_map_to_named_keys() {
        let cases = [
            (KeyCode::Up, NamedKey::ArrowUp),
            (KeyCode::Down, NamedKey::ArrowDown),
            (KeyCode::Left, NamedKey::ArrowLeft),
            (KeyCode::Right, NamedKey::ArrowRight),
            (KeyCode::Enter, NamedKey::Enter),
            (KeyCode::Esc, NamedKey::Escape),
            (KeyCode::Char(' '), NamedKey::Space),
            (KeyCode::Delete, NamedKey::Delete),
            (KeyCode::F(5), NamedKey::Unidentified),
        ];
        for (code, named) in cases {
            assert_eq!(
                input_for_event(press(code)),
                Some(Input::Key(Key::Named(named))),
                "{code:?}"
            );
        }
    }

    #[test]
    fn characters_stay_live_so_q_quits() {
        let Some(Input::Key(key)) = input_for_event(press(KeyCode::Char('q'))) else {
            panic!("q should map to a key");
        };
        assert_eq!(key, Key::Char('q'));
        assert!(key.is_quit());
        assert_eq!(
            input_for_event(press(KeyCode::Char('7'))),
            Some(Input::Key(Key::Char('7')))
        );
    }

    #[test]
    fn control_c_exits_and_releases_are_ignored() {
        let interrupt = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(input_for_event(interrupt), Some(Input::Exit));
        assert_eq!(
            input_for_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );

        let release = KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(input_for_event(release), None);
        assert_eq!(replay_control(release), None);
    }

    #[test]
    fn replay_keys_toggle_pause_or_stop() {
        assert_eq!(
            replay_control(press(KeyCode::Char('p'))),
            Some(ReplayControl::TogglePause)
        );
        assert_eq!(
            replay_control(press(KeyCode::Char(' '))),
            Some(ReplayControl::TogglePause)
        );
        assert_eq!(replay_control(press(KeyCode::Esc)), Some(ReplayControl::Stop));
        assert_eq!(
            replay_control(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ReplayControl::Stop)
        );
        assert_eq!(replay_control(press(KeyCode::Up)), None);
    }

    #[test]
    fn pause_toggles_reach_the_shared_handle() {
        let handle = PauseHandle::default();
        let mut pacer = KeyboardPacer::new(handle.clone());

        pacer.handle(ReplayControl::TogglePause);
        assert!(handle.is_paused());
        pacer.handle(ReplayControl::TogglePause);
        assert!(!handle.is_paused());

        pacer.handle(ReplayControl::Stop);
        assert!(handle.is_paused());
        pacer.suspend(Duration::from_secs(60));
    }
}
