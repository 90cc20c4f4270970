// state.rs：每个转盘实例独占的可变状态

use crate::config::RotationConfig;
use crate::input::PointerKind;

/// 拖拽会话的锚点；只在按下到松开之间存在
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    pub origin_x: f64,
    pub start_fraction: f64,
    pub kind: PointerKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceState {
    /// Canonical rotational position, always within [0,1].
    pub fraction: f64,
    /// Unrounded frame number; projection rounds it.
    pub frame: f64,
    pub reversed: bool,
    /// Negative while counting down to autoplay, 0 once idle.
    pub idle_ticks: i64,
    pub drag_anchor: Option<DragAnchor>,
    pub last_fraction: f64,
}

impl InstanceState {
    pub fn new(config: &RotationConfig) -> Self {
        let fraction = config.initial_fraction;
        Self {
            fraction,
            frame: fraction * config.effective_frame_count() as f64 + 1.0,
            reversed: config.reversed,
            idle_ticks: config.initial_idle(),
            drag_anchor: None,
            last_fraction: fraction,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// 任意交互都把空闲计数打回哨兵值
    pub fn mark_active(&mut self, config: &RotationConfig) {
        self.idle_ticks = config.idle_sentinel();
    }

    /// Display value of a named field, for the monitor readout.
    pub fn monitor(&self, field: &str) -> Option<String> {
        let value = match field {
            "fraction" => format!("{:.4}", self.fraction),
            "frame" => format!("{:.2}", self.frame),
            "reversed" => self.reversed.to_string(),
            "idle" => self.idle_ticks.to_string(),
            "clicked" => self.is_dragging().to_string(),
            "last_fraction" => format!("{:.4}", self.last_fraction),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReelOptions, Viewport};

    #[test]
    fn test_new_state_from_config() {
        let options = ReelOptions {
            frame: 19,
            frequency: -0.25,
            ..Default::default()
        };
        let config = RotationConfig::resolve(&options, Viewport::new(100, 100));
        let state = InstanceState::new(&config);

        assert!((state.fraction - 0.5).abs() < 1e-12);
        assert_eq!(state.last_fraction, state.fraction);
        assert!((state.frame - 18.5).abs() < 1e-9);
        assert!(state.reversed);
        assert_eq!(state.idle_ticks, -25);
        assert!(!state.is_dragging());
    }

    #[test]
    fn test_monitor_fields() {
        let config = RotationConfig::resolve(&ReelOptions::default(), Viewport::new(100, 100));
        let mut state = InstanceState::new(&config);
        state.mark_active(&config);

        assert_eq!(state.monitor("fraction").as_deref(), Some("0.0000"));
        assert_eq!(state.monitor("idle").as_deref(), Some("-25"));
        assert_eq!(state.monitor("clicked").as_deref(), Some("false"));
        assert_eq!(state.monitor("last_fraction").as_deref(), Some("0.0000"));
        assert_eq!(state.monitor("nope"), None);
    }
}
