/// Keyboard, mouse and resize events from the terminal.
///
/// Keys are tracked as "held" so walking and jumping can be level-triggered,
/// and as "pressed this drain" for one-shot actions (build, cycle, quit).
///
/// Terminals with keyboard enhancement report key releases; `honor_release`
/// turns those on. Without it, a key counts as held until no Press/Repeat
/// has arrived for `HOLD_TIMEOUT`, which relies on the terminal's autorepeat.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};

use crate::domain::entity::FrameInput;

// Letter keys also match their uppercase form, so Shift or Caps Lock
// doesn't stop the player.
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char(' '), KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_CYCLE: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
pub const KEYS_BUILD: &[KeyCode] = &[KeyCode::Char('b'), KeyCode::Char('B')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

/// Longer than the usual autorepeat interval, shorter than a deliberate pause.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Most recent Press/Repeat per key.
    last_seen: HashMap<KeyCode, Instant>,
    /// Keys that went from up to down during the last drain.
    pressed_now: Vec<KeyCode>,
    ctrl_c: bool,
    mouse: Vec<MouseEvent>,
    resized: Option<(u16, u16)>,
    /// Trust Release events. Set only when keyboard enhancement is active.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_seen: HashMap::with_capacity(16),
            pressed_now: Vec::with_capacity(8),
            ctrl_c: false,
            mouse: Vec::with_capacity(8),
            resized: None,
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking.
    /// Call once per loop iteration.
    pub fn drain_events(&mut self) {
        self.pressed_now.clear();
        self.mouse.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.apply_key(key, Instant::now()),
                Ok(Event::Mouse(m)) => self.mouse.push(m),
                Ok(Event::Resize(w, h)) => self.resized = Some((w, h)),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }

        if !self.honor_release {
            let now = Instant::now();
            self.last_seen.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    fn apply_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }

        if key.kind == KeyEventKind::Release {
            if self.honor_release {
                self.last_seen.remove(&key.code);
            }
            return;
        }

        if !self.is_held_at(key.code, now) {
            self.pressed_now.push(key.code);
        }
        self.last_seen.insert(key.code, now);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|&c| self.is_held(c))
    }

    /// Went down during the last drain.
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed_now.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|&c| self.was_pressed(c))
    }

    /// Movement and jump keys currently held.
    pub fn held_input(&self) -> FrameInput {
        FrameInput {
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
            jump: self.any_held(KEYS_JUMP),
        }
    }

    /// Movement and jump keys that went down during the last drain. The
    /// loop ORs these into the next frame's input, so a tap released
    /// before the frame runs still counts once.
    pub fn pressed_input(&self) -> FrameInput {
        FrameInput {
            left: self.any_pressed(KEYS_LEFT),
            right: self.any_pressed(KEYS_RIGHT),
            jump: self.any_pressed(KEYS_JUMP),
        }
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    pub fn mouse_events(&self) -> &[MouseEvent] {
        &self.mouse
    }

    /// Latest terminal size, if it changed since the last call.
    pub fn take_resize(&mut self) -> Option<(u16, u16)> {
        self.resized.take()
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        match self.last_seen.get(&code) {
            Some(t) => self.honor_release || now.duration_since(*t) < HOLD_TIMEOUT,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, kind)
    }

    #[test]
    fn first_press_is_fresh_repeat_is_not() {
        let mut kb = InputState::new();
        let now = Instant::now();
        kb.apply_key(key('b', KeyEventKind::Press), now);
        assert!(kb.was_pressed(KeyCode::Char('b')));

        kb.pressed_now.clear();
        kb.apply_key(key('b', KeyEventKind::Repeat), now);
        assert!(!kb.was_pressed(KeyCode::Char('b')));
        assert!(kb.is_held(KeyCode::Char('b')));
    }

    #[test]
    fn release_honored_only_with_enhancement() {
        let now = Instant::now();

        let mut kb = InputState::new();
        kb.apply_key(key('a', KeyEventKind::Press), now);
        kb.apply_key(key('a', KeyEventKind::Release), now);
        assert!(kb.is_held(KeyCode::Char('a')));

        let mut kb = InputState::new();
        kb.honor_release = true;
        kb.apply_key(key('a', KeyEventKind::Press), now);
        assert!(kb.any_held(&[KeyCode::Left, KeyCode::Char('a')]));
        kb.apply_key(key('a', KeyEventKind::Release), now);
        assert!(!kb.is_held(KeyCode::Char('a')));
    }

    #[test]
    fn held_key_expires_without_release_support() {
        let mut kb = InputState::new();
        let now = Instant::now();
        let Some(long_ago) = now.checked_sub(HOLD_TIMEOUT * 2) else { return };
        kb.apply_key(key('d', KeyEventKind::Press), long_ago);
        assert!(!kb.is_held_at(KeyCode::Char('d'), now));
    }

    #[test]
    fn short_tap_survives_until_the_next_frame() {
        let mut kb = InputState::new();
        kb.honor_release = true;
        let now = Instant::now();
        let mut tapped = FrameInput::default();

        // pressed and released within one drain
        kb.apply_key(KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Press), now);
        kb.apply_key(KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release), now);
        tapped = tapped.or(kb.pressed_input());
        assert!(!kb.held_input().jump);

        // next drain, before the frame runs: nothing new
        kb.pressed_now.clear();
        tapped = tapped.or(kb.pressed_input());

        let frame = std::mem::take(&mut tapped).or(kb.held_input());
        assert_eq!(frame, FrameInput { jump: true, ..FrameInput::default() });
        assert_eq!(tapped, FrameInput::default());
    }

    #[test]
    fn held_input_maps_key_sets() {
        let mut kb = InputState::new();
        kb.honor_release = true;
        let now = Instant::now();
        kb.apply_key(key('A', KeyEventKind::Press), now);
        kb.apply_key(key(' ', KeyEventKind::Press), now);
        assert_eq!(kb.held_input(), FrameInput { left: true, right: false, jump: true });
        assert_eq!(kb.pressed_input(), kb.held_input());

        kb.apply_key(key('A', KeyEventKind::Release), now);
        kb.apply_key(KeyEvent::new_with_kind(KeyCode::Right, KeyModifiers::NONE, KeyEventKind::Press), now);
        assert_eq!(kb.held_input(), FrameInput { left: false, right: true, jump: true });
    }

    #[test]
    fn ctrl_c_is_not_a_key_press() {
        let mut kb = InputState::new();
        kb.apply_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(kb.ctrl_c_pressed());
        assert!(!kb.was_pressed(KeyCode::Char('c')));
    }
}
