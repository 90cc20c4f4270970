// input.rs：拖拽 / 滚轮换算，以及鼠标、触摸两种指针适配器

use crate::config::RotationConfig;
use crate::state::DragAnchor;

/// 触摸设备上灵敏度打折
pub const TOUCH_SENSITIVITY_SCALE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

pub fn effective_sensitivity(base: f64, kind: PointerKind) -> f64 {
    match kind {
        PointerKind::Mouse => base,
        PointerKind::Touch => base * TOUCH_SENSITIVITY_SCALE,
    }
}

/// Everything a drag move needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragParams {
    pub revolution: f64,
    pub reversed: bool,
    pub stitched: bool,
    pub loops: bool,
}

impl DragParams {
    pub fn from_config(config: &RotationConfig) -> Self {
        Self {
            revolution: config.revolution_distance(),
            reversed: config.reversed,
            stitched: config.is_stitched(),
            loops: config.loops,
        }
    }
}

/// Candidate fraction for a pointer at `pointer_x` during the session that
/// started at `anchor`.
///
/// Sensitivity does not enter the distance; a full `revolution` of travel
/// always spins exactly once.
pub fn drag_shift(anchor: &DragAnchor, pointer_x: f64, params: &DragParams) -> f64 {
    let polarity = if params.reversed { -1.0 } else { 1.0 };
    let polarity = polarity * if params.stitched { -1.0 } else { 1.0 };
    let distance = pointer_x - anchor.origin_x;
    let shift = anchor.start_fraction + polarity / params.revolution * distance;

    if params.loops {
        shift - shift.floor()
    } else {
        shift
    }
}

/// 滚轮步长：sqrt 压缩后向上取整，保留符号
pub fn wheel_magnitude(delta: f64) -> i32 {
    if !delta.is_finite() || delta == 0.0 {
        return 0;
    }
    let magnitude = delta.abs().sqrt().ceil() as i32;
    if delta < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// A pointer drag lifecycle, independent of the device that produced it.
pub trait PointerSession {
    fn begin(&mut self, x: f64, kind: PointerKind);
    fn move_to(&mut self, x: f64);
    fn end(&mut self);
}

/// Turns a button + cursor event stream into a pointer session.
#[derive(Debug, Default)]
pub struct MouseAdapter {
    pressed: bool,
    last_x: Option<f64>,
}

impl MouseAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn button(&mut self, pressed: bool, session: &mut dyn PointerSession) {
        match (pressed, self.pressed) {
            (true, false) => {
                // 还没收到过光标位置时无法确定锚点
                if let Some(x) = self.last_x {
                    self.pressed = true;
                    session.begin(x, PointerKind::Mouse);
                }
            }
            (false, true) => {
                self.pressed = false;
                session.end();
            }
            _ => {}
        }
    }

    pub fn cursor_moved(&mut self, x: f64, session: &mut dyn PointerSession) {
        self.last_x = Some(x);
        if self.pressed {
            session.move_to(x);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// Follows the first finger down and ignores the rest until it lifts.
#[derive(Debug, Default)]
pub struct TouchAdapter {
    finger: Option<u64>,
}

impl TouchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f64, session: &mut dyn PointerSession) {
        match phase {
            TouchPhase::Started => {
                if self.finger.is_none() {
                    self.finger = Some(id);
                    session.begin(x, PointerKind::Touch);
                }
            }
            TouchPhase::Moved => {
                if self.finger == Some(id) {
                    session.move_to(x);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.finger == Some(id) {
                    self.finger = None;
                    session.end();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl PointerSession for Recorder {
        fn begin(&mut self, x: f64, kind: PointerKind) {
            self.calls.push(format!("begin {} {:?}", x, kind));
        }
        fn move_to(&mut self, x: f64) {
            self.calls.push(format!("move {}", x));
        }
        fn end(&mut self) {
            self.calls.push("end".to_string());
        }
    }

    fn anchor(origin_x: f64, start_fraction: f64) -> DragAnchor {
        DragAnchor {
            origin_x,
            start_fraction,
            kind: PointerKind::Mouse,
        }
    }

    fn params(reversed: bool, stitched: bool, loops: bool) -> DragParams {
        DragParams {
            revolution: 200.0,
            reversed,
            stitched,
            loops,
        }
    }

    #[test]
    fn test_drag_shift_polarity() {
        let a = anchor(50.0, 0.25);
        assert!((drag_shift(&a, 100.0, &params(false, false, true)) - 0.5).abs() < 1e-12);
        assert!((drag_shift(&a, 100.0, &params(true, false, true)) - 0.0).abs() < 1e-12);
        assert!((drag_shift(&a, 100.0, &params(false, true, true)) - 0.0).abs() < 1e-12);
        // 两个反向相互抵消
        assert!((drag_shift(&a, 100.0, &params(true, true, true)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_drag_shift_wraps_only_when_looping() {
        let a = anchor(0.0, 0.9);
        let looped = drag_shift(&a, 40.0, &params(false, false, true));
        assert!((looped - 0.1).abs() < 1e-9);

        let clamped = drag_shift(&a, 40.0, &params(false, false, false));
        assert!((clamped - 1.1).abs() < 1e-9);

        let back = drag_shift(&a, -200.0, &params(false, false, true));
        assert!((back - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_drag_shift_is_deterministic() {
        let a = anchor(12.0, 0.33);
        let p = params(false, false, true);
        assert_eq!(drag_shift(&a, 87.0, &p), drag_shift(&a, 87.0, &p));
    }

    #[test]
    fn test_wheel_magnitude() {
        assert_eq!(wheel_magnitude(0.0), 0);
        assert_eq!(wheel_magnitude(1.0), 1);
        assert_eq!(wheel_magnitude(4.0), 2);
        assert_eq!(wheel_magnitude(5.0), 3);
        assert_eq!(wheel_magnitude(-9.0), -3);
        assert_eq!(wheel_magnitude(-0.25), -1);
        assert_eq!(wheel_magnitude(f64::NAN), 0);
    }

    #[test]
    fn test_touch_sensitivity() {
        assert_eq!(effective_sensitivity(20.0, PointerKind::Mouse), 20.0);
        assert!((effective_sensitivity(20.0, PointerKind::Touch) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_mouse_adapter() {
        let mut mouse = MouseAdapter::new();
        let mut rec = Recorder::default();

        // 按下前没有光标位置，忽略
        mouse.button(true, &mut rec);
        assert!(!mouse.is_pressed());

        mouse.cursor_moved(10.0, &mut rec);
        mouse.button(true, &mut rec);
        mouse.cursor_moved(15.0, &mut rec);
        mouse.button(false, &mut rec);
        mouse.cursor_moved(30.0, &mut rec);
        mouse.button(false, &mut rec);

        assert_eq!(rec.calls, vec!["begin 10 Mouse", "move 15", "end"]);
    }

    #[test]
    fn test_touch_adapter_tracks_first_finger() {
        let mut touch = TouchAdapter::new();
        let mut rec = Recorder::default();

        touch.touch(1, TouchPhase::Started, 5.0, &mut rec);
        touch.touch(2, TouchPhase::Started, 50.0, &mut rec);
        touch.touch(2, TouchPhase::Moved, 60.0, &mut rec);
        touch.touch(1, TouchPhase::Moved, 8.0, &mut rec);
        touch.touch(2, TouchPhase::Ended, 60.0, &mut rec);
        touch.touch(1, TouchPhase::Cancelled, 8.0, &mut rec);

        assert_eq!(rec.calls, vec!["begin 5 Touch", "move 8", "end"]);
    }
}
