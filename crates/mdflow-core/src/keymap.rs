use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;

/// Exact match on key code and all three modifiers.
pub fn key_event_matches(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    pattern.code == event.code && pattern.modifiers == event.modifiers
}

pub fn key_char(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c))
}

pub fn key_ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(KeyModifiers::CTRL)
}

pub fn any_matches(patterns: &[KeyEvent], event: &KeyEvent) -> bool {
    patterns.iter().any(|p| key_event_matches(p, event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_requires_exact_modifiers() {
        assert!(key_event_matches(&key_char('d'), &key_char('d')));
        assert!(!key_event_matches(&key_char('d'), &key_ctrl('d')));
        assert!(any_matches(&[key_char('x'), key_ctrl('d')], &key_ctrl('d')));
    }
}
