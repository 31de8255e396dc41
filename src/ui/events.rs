// ============================================================================
// Gestion des événements
// ============================================================================
// Événements clavier et ticks de la boucle principale
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Prédicats purs : une fonction is_*_event par raccourci, testable sans
//    terminal
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Délai d'attente d'une touche avant de produire un Tick
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (compte à rebours, rafraîchissement automatique)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant au plus POLL_TIMEOUT)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - Pas d'événement : Ok(Event::Tick)
    /// - Sur certains OS on reçoit Press ET Release : seul Press compte
    pub fn next(&self) -> Result<Event> {
        if !event::poll(POLL_TIMEOUT)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : touche -> action
// ============================================================================

/// KeyCode de l'événement, None pour un Tick
fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (two-step)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q' | 'Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k' | 'K')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j' | 'J')))
}

/// 'l' ou ']' : fenêtre suivante
pub fn is_next_window_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('l' | ']')))
}

/// 'h' ou '[' : fenêtre précédente
pub fn is_previous_window_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('h' | '[')))
}

/// 't' : éditer la liste de tickers
pub fn is_edit_tickers_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('t' | 'T')))
}

/// 'n' : saisir la clé de news
pub fn is_api_key_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('n' | 'N')))
}

/// '+' (ou '=' sans shift) : intervalle plus long
pub fn is_slower_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('+' | '=')))
}

/// '-' : intervalle plus court
pub fn is_faster_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('-')))
}

/// 'r' : passe immédiate
pub fn is_force_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r' | 'R')))
}

/// 'u' : doublons gardés / supprimés
pub fn is_dedupe_toggle_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('u' | 'U')))
}

/// Caractère imprimable, pour le buffer de saisie
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) if !c.is_control() => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_window_keys() {
        assert!(is_next_window_event(&key(KeyCode::Char('l'))));
        assert!(is_next_window_event(&key(KeyCode::Char(']'))));
        assert!(is_previous_window_event(&key(KeyCode::Char('h'))));
        assert!(is_previous_window_event(&key(KeyCode::Char('['))));
        assert!(!is_next_window_event(&key(KeyCode::Char('h'))));
    }

    #[test]
    fn test_navigation_keys() {
        assert!(is_up_event(&key(KeyCode::Up)));
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Down)));
        assert!(is_down_event(&key(KeyCode::Char('j'))));
    }

    #[test]
    fn test_refresh_keys() {
        assert!(is_slower_refresh_event(&key(KeyCode::Char('+'))));
        assert!(is_faster_refresh_event(&key(KeyCode::Char('-'))));
        assert!(is_force_refresh_event(&key(KeyCode::Char('r'))));
    }

    #[test]
    fn test_get_char() {
        assert_eq!(get_char_from_event(&key(KeyCode::Char(','))), Some(','));
        assert_eq!(get_char_from_event(&key(KeyCode::Enter)), None);
        assert_eq!(get_char_from_event(&Event::Tick), None);
    }
}
