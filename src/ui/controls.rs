/// On-screen virtual controls, driven by terminal mouse events.
///
/// The bottom terminal row holds a strip of buttons:
///
///   [ ◀ ] [ ▶ ] [ ▲ ]   [BUILD] [BLOCK]
///
/// Hold buttons (◀ ▶ ▲) set their flag on mouse-down over the button and
/// clear it on mouse-up over the same button. A release somewhere else
/// leaves the flag set until the button itself is released.
/// BUILD and BLOCK fire once per mouse-down.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::domain::entity::FrameInput;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Control {
    Left,
    Right,
    Jump,
    Build,
    Cycle,
}

/// One-shot actions produced by clicking a control.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlAction {
    Build,
    Cycle,
}

#[derive(Clone, Debug)]
pub struct Button {
    pub control: Control,
    pub label: &'static str,
    pub col: usize,
    pub width: usize,
}

impl Button {
    fn contains(&self, col: usize) -> bool {
        col >= self.col && col < self.col + self.width
    }
}

const LAYOUT: &[(Control, &str)] = &[
    (Control::Left, " ◀ "),
    (Control::Right, " ▶ "),
    (Control::Jump, " ▲ "),
    (Control::Build, "BUILD"),
    (Control::Cycle, "BLOCK"),
];

const GAP: usize = 1;
const GROUP_GAP: usize = 3; // between movement and building buttons

pub struct VirtualControls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    buttons: Vec<Button>,
    row: usize,
}

impl VirtualControls {
    pub fn new() -> Self {
        VirtualControls {
            left: false,
            right: false,
            jump: false,
            buttons: vec![],
            row: 0,
        }
    }

    /// Lay the buttons out on the last row of a `term_w × term_h` terminal.
    /// Buttons that don't fit are dropped.
    pub fn layout(&mut self, term_w: usize, term_h: usize) {
        self.row = term_h.saturating_sub(1);
        self.buttons.clear();
        let mut col = 1;
        for &(control, label) in LAYOUT {
            if control == Control::Build {
                col += GROUP_GAP - GAP;
            }
            // brackets around the label
            let width = label.chars().count() + 2;
            if col + width > term_w {
                break;
            }
            self.buttons.push(Button { control, label, col, width });
            col += width + GAP;
        }
    }

    /// Hold-button state as frame input.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput { left: self.left, right: self.right, jump: self.jump }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Is this control currently shown as pressed?
    pub fn is_active(&self, control: Control) -> bool {
        match control {
            Control::Left => self.left,
            Control::Right => self.right,
            Control::Jump => self.jump,
            Control::Build | Control::Cycle => false,
        }
    }

    /// Which control (if any) sits at terminal cell (col, row)?
    pub fn hit(&self, col: usize, row: usize) -> Option<Control> {
        if row != self.row {
            return None;
        }
        self.buttons.iter().find(|b| b.contains(col)).map(|b| b.control)
    }

    /// Apply a mouse event. Returns a one-shot action for clicks on
    /// BUILD / BLOCK.
    pub fn handle_mouse(&mut self, ev: &MouseEvent) -> Option<ControlAction> {
        let target = self.hit(ev.column as usize, ev.row as usize)?;
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => match target {
                Control::Left => { self.left = true; None }
                Control::Right => { self.right = true; None }
                Control::Jump => { self.jump = true; None }
                Control::Build => Some(ControlAction::Build),
                Control::Cycle => Some(ControlAction::Cycle),
            },
            MouseEventKind::Up(MouseButton::Left) => {
                match target {
                    Control::Left => self.left = false,
                    Control::Right => self.right = false,
                    Control::Jump => self.jump = false,
                    Control::Build | Control::Cycle => {}
                }
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    fn col_of(vc: &VirtualControls, control: Control) -> u16 {
        vc.buttons().iter().find(|b| b.control == control).unwrap().col as u16
    }

    fn laid_out() -> VirtualControls {
        let mut vc = VirtualControls::new();
        vc.layout(80, 24);
        vc
    }

    #[test]
    fn layout_places_all_buttons_on_last_row() {
        let vc = laid_out();
        assert_eq!(vc.row(), 23);
        assert_eq!(vc.buttons().len(), 5);
        // no overlaps, left to right
        for pair in vc.buttons().windows(2) {
            assert!(pair[0].col + pair[0].width < pair[1].col);
        }
    }

    #[test]
    fn narrow_terminal_drops_buttons() {
        let mut vc = VirtualControls::new();
        vc.layout(12, 5);
        assert!(vc.buttons().len() < 5);
        assert!(vc.buttons().iter().all(|b| b.col + b.width <= 12));
    }

    #[test]
    fn hold_buttons_set_on_down_clear_on_up() {
        let mut vc = laid_out();
        let c = col_of(&vc, Control::Jump);
        assert_eq!(vc.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), c, 23)), None);
        assert!(vc.jump);
        assert!(vc.is_active(Control::Jump));
        assert_eq!(vc.frame_input(), FrameInput { jump: true, ..FrameInput::default() });
        vc.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), c, 23));
        assert!(!vc.jump);
        assert_eq!(vc.frame_input(), FrameInput::default());
    }

    #[test]
    fn release_elsewhere_keeps_flag() {
        let mut vc = laid_out();
        let c = col_of(&vc, Control::Left);
        vc.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), c, 23));
        vc.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), c, 3));
        assert!(vc.left);
    }

    #[test]
    fn build_and_cycle_are_one_shot() {
        let mut vc = laid_out();
        let b = col_of(&vc, Control::Build) + 2;
        let k = col_of(&vc, Control::Cycle);
        assert_eq!(
            vc.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), b, 23)),
            Some(ControlAction::Build),
        );
        assert_eq!(
            vc.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), k, 23)),
            Some(ControlAction::Cycle),
        );
        assert!(!vc.left && !vc.right && !vc.jump);
    }

    #[test]
    fn clicks_off_the_strip_do_nothing() {
        let mut vc = laid_out();
        assert_eq!(vc.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 0, 23)), None);
        assert_eq!(vc.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 5, 10)), None);
        assert!(!vc.left && !vc.right && !vc.jump);
    }
}
