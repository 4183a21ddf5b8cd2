use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseEventKind;
use crate::keymap;
use crate::viewport::ViewportState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAction {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// Keys (and wheel step sizes) that move a viewport.
#[derive(Clone, Debug)]
pub struct ScrollBindings {
    pub line_step: i32,
    pub horiz_step: i32,
    /// Rows moved per mouse wheel notch.
    pub wheel_step: i32,
    pub up: Vec<KeyEvent>,
    pub down: Vec<KeyEvent>,
    pub left: Vec<KeyEvent>,
    pub right: Vec<KeyEvent>,
    pub page_up: Vec<KeyEvent>,
    pub page_down: Vec<KeyEvent>,
    pub top: Vec<KeyEvent>,
    pub bottom: Vec<KeyEvent>,
}

impl Default for ScrollBindings {
    fn default() -> Self {
        Self {
            line_step: 1,
            horiz_step: 4,
            wheel_step: 3,
            up: vec![KeyEvent::new(KeyCode::Up), keymap::key_char('k')],
            down: vec![KeyEvent::new(KeyCode::Down), keymap::key_char('j')],
            left: vec![KeyEvent::new(KeyCode::Left), keymap::key_char('h')],
            right: vec![KeyEvent::new(KeyCode::Right), keymap::key_char('l')],
            page_up: vec![KeyEvent::new(KeyCode::PageUp), keymap::key_ctrl('u')],
            page_down: vec![
                KeyEvent::new(KeyCode::PageDown),
                keymap::key_ctrl('d'),
                keymap::key_char(' '),
            ],
            top: vec![KeyEvent::new(KeyCode::Home), keymap::key_char('g')],
            bottom: vec![KeyEvent::new(KeyCode::End), keymap::key_char('G')],
        }
    }
}

impl ScrollBindings {
    pub fn action_for(&self, key: &KeyEvent) -> Option<ScrollAction> {
        let table = [
            (&self.up, ScrollAction::Up),
            (&self.down, ScrollAction::Down),
            (&self.left, ScrollAction::Left),
            (&self.right, ScrollAction::Right),
            (&self.page_up, ScrollAction::PageUp),
            (&self.page_down, ScrollAction::PageDown),
            (&self.top, ScrollAction::Top),
            (&self.bottom, ScrollAction::Bottom),
        ];
        table
            .into_iter()
            .find(|(keys, _)| keymap::any_matches(keys, key))
            .map(|(_, action)| action)
    }

    pub fn apply(&self, state: &mut ViewportState, action: ScrollAction) {
        match action {
            ScrollAction::Up => state.scroll_y_by(-self.line_step),
            ScrollAction::Down => state.scroll_y_by(self.line_step),
            ScrollAction::Left => state.scroll_x_by(-self.horiz_step),
            ScrollAction::Right => state.scroll_x_by(self.horiz_step),
            ScrollAction::PageUp => state.page_up(),
            ScrollAction::PageDown => state.page_down(),
            ScrollAction::Top => state.to_top(),
            ScrollAction::Bottom => state.to_bottom(),
        }
    }

    pub fn apply_wheel(&self, state: &mut ViewportState, kind: MouseEventKind) {
        match kind {
            MouseEventKind::ScrollUp => state.scroll_y_by(-self.wheel_step),
            MouseEventKind::ScrollDown => state.scroll_y_by(self.wheel_step),
            MouseEventKind::ScrollLeft => state.scroll_x_by(-self.horiz_step),
            MouseEventKind::ScrollRight => state.scroll_x_by(self.horiz_step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ViewportState {
        let mut s = ViewportState::default();
        s.set_viewport(10, 4);
        s.set_content(30, 40);
        s
    }

    #[test]
    fn default_bindings_cover_vim_and_arrows() {
        let b = ScrollBindings::default();
        assert_eq!(b.action_for(&keymap::key_char('j')), Some(ScrollAction::Down));
        assert_eq!(
            b.action_for(&KeyEvent::new(KeyCode::Up)),
            Some(ScrollAction::Up)
        );
        assert_eq!(b.action_for(&keymap::key_ctrl('d')), Some(ScrollAction::PageDown));
        assert_eq!(b.action_for(&keymap::key_char('q')), None);
    }

    #[test]
    fn wheel_uses_wheel_step() {
        let b = ScrollBindings::default();
        let mut s = state();
        b.apply_wheel(&mut s, MouseEventKind::ScrollDown);
        assert_eq!(s.y, 3);
        b.apply_wheel(&mut s, MouseEventKind::ScrollUp);
        b.apply_wheel(&mut s, MouseEventKind::ScrollUp);
        assert_eq!(s.y, 0);
    }

    #[test]
    fn page_down_keeps_one_row_of_context() {
        let b = ScrollBindings::default();
        let mut s = state();
        b.apply(&mut s, ScrollAction::PageDown);
        assert_eq!(s.y, 3);
        b.apply(&mut s, ScrollAction::Bottom);
        assert_eq!(s.y, 36);
    }
}
