//! Key mapping from terminal events to DOM-style key codes.

use bridge_tetris_bridge::HostEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Key code the root element's handlers understand, if any.
///
/// Vim (`hjkl`) and WASD aliases map onto the arrow codes.
pub fn key_code(key: KeyEvent) -> Option<&'static str> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h' | 'H' | 'a' | 'A') => Some("ArrowLeft"),
        KeyCode::Right | KeyCode::Char('l' | 'L' | 'd' | 'D') => Some("ArrowRight"),
        KeyCode::Down | KeyCode::Char('j' | 'J' | 's' | 'S') => Some("ArrowDown"),

        // Rotation
        KeyCode::Up | KeyCode::Char('k' | 'K' | 'w' | 'W') => Some("ArrowUp"),
        KeyCode::Char('z' | 'Z') => Some("KeyZ"),

        // Actions
        KeyCode::Char(' ') => Some("Space"),
        KeyCode::Char('p' | 'P') => Some("KeyP"),
        KeyCode::Char('r' | 'R') => Some("KeyR"),

        _ => None,
    }
}

/// Translate a terminal key event into a host event.
///
/// Auto-repeat is reported as another key down, the way a browser does.
pub fn to_host_event(key: KeyEvent) -> Option<HostEvent> {
    let code = key_code(key)?;
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => Some(HostEvent::key_down(code)),
        KeyEventKind::Release => Some(HostEvent::key_up(code)),
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
