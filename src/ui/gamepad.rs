/// Optional gamepad input via gilrs.
///
/// Walking uses the D-pad or the left stick. The action buttons come from
/// the `[gamepad]` section of config.toml; defaults:
///
///   jump   A        (held, like the keyboard jump key)
///   build  X or B
///   cycle  Y
///   quit   Select
///
/// Button state lives in two bitsets: `held` and `pressed` (went down since
/// the last `update`).

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::FrameInput;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
    DPadLeft,
    DPadRight,
}

impl Btn {
    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Config names. Face buttons also accept compass names.
    fn from_name(s: &str) -> Option<Btn> {
        let btn = match s.trim().to_ascii_uppercase().as_str() {
            "A" | "SOUTH" => Btn::A,
            "B" | "EAST" => Btn::B,
            "X" | "WEST" => Btn::X,
            "Y" | "NORTH" => Btn::Y,
            "L1" | "LB" => Btn::L1,
            "R1" | "RB" => Btn::R1,
            "START" => Btn::Start,
            "SELECT" | "BACK" => Btn::Select,
            _ => return None,
        };
        Some(btn)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        let btn = match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            Button::DPadLeft => Btn::DPadLeft,
            Button::DPadRight => Btn::DPadRight,
            _ => return None,
        };
        Some(btn)
    }
}

/// Union of the bits of `btns`.
fn mask(btns: &[Btn]) -> u16 {
    btns.iter().fold(0, |m, b| m | b.bit())
}

/// Which buttons trigger which action, as bitmasks.
#[derive(Debug, PartialEq)]
struct ActionMap {
    jump: u16,
    build: u16,
    cycle: u16,
    quit: u16,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump: Btn::A.bit(),
            build: mask(&[Btn::X, Btn::B]),
            cycle: Btn::Y.bit(),
            quit: Btn::Select.bit(),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    held: u16,
    pressed: u16,
    stick_x: f32,
    actions: ActionMap,
}

impl GamepadState {
    pub fn new() -> Self {
        let mut gp = GamepadState::detached();
        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                log::debug!("gamepad backend ready, {} pad(s) connected", g.gamepads().count());
                gp.gilrs = Some(g);
            }
            Err(e) => log::debug!("gamepad support unavailable: {e}"),
        }
        gp
    }

    /// No backend attached; every query reports "not pressed".
    fn detached() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            held: 0,
            pressed: 0,
            stick_x: 0.0,
            actions: ActionMap::default(),
        }
    }

    /// Apply the `[gamepad]` config. An action whose list has no
    /// recognizable button names keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse(names: &[String], slot: &mut u16) {
            let btns: Vec<Btn> = names
                .iter()
                .filter_map(|n| {
                    let b = Btn::from_name(n);
                    if b.is_none() {
                        log::warn!("unknown gamepad button {n:?}");
                    }
                    b
                })
                .collect();
            if !btns.is_empty() {
                *slot = mask(&btns);
            }
        }
        parse(&cfg.jump, &mut self.actions.jump);
        parse(&cfg.build, &mut self.actions.build);
        parse(&cfg.cycle, &mut self.actions.cycle);
        parse(&cfg.quit, &mut self.actions.quit);
    }

    /// Poll the backend. Call once per loop iteration.
    pub fn update(&mut self) {
        self.pressed = 0;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let events: Vec<EventType> = std::iter::from_fn(|| gilrs.next_event())
            .map(|ev| ev.event)
            .collect();

        for event in events {
            match event {
                EventType::ButtonPressed(b, _) => {
                    if let Some(btn) = Btn::from_gilrs(b) {
                        self.held |= btn.bit();
                        self.pressed |= btn.bit();
                    }
                }
                EventType::ButtonReleased(b, _) => {
                    if let Some(btn) = Btn::from_gilrs(b) {
                        self.held &= !btn.bit();
                    }
                }
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.stick_x = value;
                }
                EventType::Connected => log::info!("gamepad connected"),
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    // ── Queries ──

    pub fn left_held(&self) -> bool {
        self.held & Btn::DPadLeft.bit() != 0 || self.stick_x < -STICK_DEADZONE
    }

    pub fn right_held(&self) -> bool {
        self.held & Btn::DPadRight.bit() != 0 || self.stick_x > STICK_DEADZONE
    }

    pub fn jump_held(&self) -> bool {
        self.held & self.actions.jump != 0
    }

    /// Walk and jump state as frame input.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            left: self.left_held(),
            right: self.right_held(),
            jump: self.jump_held(),
        }
    }

    pub fn build_pressed(&self) -> bool {
        self.pressed & self.actions.build != 0
    }

    pub fn cycle_pressed(&self) -> bool {
        self.pressed & self.actions.cycle != 0
    }

    pub fn quit_pressed(&self) -> bool {
        self.pressed & self.actions.quit != 0
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.held = 0;
        self.pressed = 0;
        self.stick_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn names_are_case_insensitive_with_aliases() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name(" rb "), Some(Btn::R1));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Z"), None);
        assert_eq!(Btn::from_name("DPadLeft"), None);
    }

    #[test]
    fn config_overrides_only_recognized_lists() {
        let mut gp = GamepadState::detached();
        gp.load_button_config(&GamepadConfig {
            jump: names(&["R1", "L1"]),
            build: names(&["bogus"]),
            cycle: vec![],
            quit: names(&["Start", "nope"]),
        });
        let defaults = ActionMap::default();
        assert_eq!(gp.actions.jump, mask(&[Btn::R1, Btn::L1]));
        assert_eq!(gp.actions.build, defaults.build);
        assert_eq!(gp.actions.cycle, defaults.cycle);
        assert_eq!(gp.actions.quit, Btn::Start.bit());
    }

    #[test]
    fn held_survives_update_pressed_does_not() {
        let mut gp = GamepadState::detached();
        gp.held = mask(&[Btn::A, Btn::X]);
        gp.pressed = gp.held;
        assert!(gp.jump_held());
        assert!(gp.build_pressed());
        assert!(!gp.cycle_pressed());

        gp.update();
        assert!(gp.jump_held());
        assert!(!gp.build_pressed());
    }

    #[test]
    fn dpad_and_stick_walk() {
        let mut gp = GamepadState::detached();
        gp.held = Btn::DPadLeft.bit();
        gp.stick_x = 0.9;
        assert!(gp.left_held() && gp.right_held());

        gp.release_all();
        assert!(!gp.left_held() && !gp.right_held());

        gp.stick_x = -0.1;
        assert!(!gp.left_held());
    }

    #[test]
    fn frame_input_uses_mapped_jump_button() {
        let mut gp = GamepadState::detached();
        gp.load_button_config(&GamepadConfig {
            jump: names(&["R1"]),
            build: vec![],
            cycle: vec![],
            quit: vec![],
        });
        gp.held = mask(&[Btn::A, Btn::DPadRight]);
        assert_eq!(gp.frame_input(), FrameInput { left: false, right: true, jump: false });

        gp.held |= Btn::R1.bit();
        assert!(gp.frame_input().jump);
    }
}
