// reel.rs：单个转盘的控制器
//
// 每种状态迁移一个方法（按下/拖动/松开/滚轮/tick/直接设定），所有位置写入都经过
// normalizer，写完立刻重新投影并通知监听者。

use crate::autoplay::Autoplay;
use crate::config::RotationConfig;
use crate::input::{self, DragParams, PointerKind, PointerSession};
use crate::normalizer::normalize;
use crate::projector::{self, Projection};
use crate::state::{DragAnchor, InstanceState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReelId(pub u64);

impl std::fmt::Display for ReelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "reel#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReelEvent {
    FractionChange(f64),
    FrameChange(u32),
}

/// Result of a wheel event. The wheel never turns the reel; it only counts as
/// interaction and swallows the scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelOutcome {
    pub magnitude: i32,
    pub consumed: bool,
}

pub struct Reel {
    id: ReelId,
    config: RotationConfig,
    state: InstanceState,
    listeners: Vec<Box<dyn FnMut(&ReelEvent)>>,
}

impl Reel {
    pub fn new(id: ReelId, config: RotationConfig) -> Self {
        let state = InstanceState::new(&config);
        log::debug!(
            "{} setup: {} frames, {} steps, {:?}, fraction {:.4}",
            id,
            config.frames,
            config.steps,
            config.mode,
            state.fraction
        );
        Self {
            id,
            config,
            state,
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> ReelId {
        self.id
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn state(&self) -> &InstanceState {
        &self.state
    }

    /// Subscribe to change notifications. The listener immediately receives
    /// the current frame, the way a freshly started reel draws itself once.
    pub fn on_change(&mut self, mut listener: impl FnMut(&ReelEvent) + 'static) {
        listener(&ReelEvent::FrameChange(self.frame()));
        self.listeners.push(Box::new(listener));
    }

    pub fn fraction(&self) -> f64 {
        self.state.fraction
    }

    pub fn frame(&self) -> u32 {
        projector::frame_for_fraction(&self.config, self.state.fraction)
    }

    pub fn projection(&self) -> Projection {
        projector::project(&self.config, self.state.fraction, self.state.reversed)
    }

    pub fn sensitivity(&self, kind: PointerKind) -> f64 {
        input::effective_sensitivity(self.config.sensitivity, kind)
    }

    pub fn down(&mut self, x: f64, kind: PointerKind) {
        self.state.drag_anchor = Some(DragAnchor {
            origin_x: x,
            start_fraction: self.state.fraction,
            kind,
        });
        self.state.last_fraction = self.state.fraction;
        self.state.mark_active(&self.config);
        log::trace!(
            "{} down at {} ({:?}, sensitivity {})",
            self.id,
            x,
            kind,
            self.sensitivity(kind)
        );
    }

    /// Returns false when no drag session is open.
    pub fn drag(&mut self, x: f64) -> bool {
        let Some(anchor) = self.state.drag_anchor else {
            return false;
        };
        let shift = input::drag_shift(&anchor, x, &DragParams::from_config(&self.config));
        self.update(shift);
        self.state.mark_active(&self.config);
        true
    }

    pub fn up(&mut self) {
        if self.state.drag_anchor.take().is_some() {
            log::trace!("{} up at fraction {:.4}", self.id, self.state.fraction);
        }
    }

    pub fn wheel(&mut self, delta: f64) -> WheelOutcome {
        let magnitude = input::wheel_magnitude(delta);
        self.state.mark_active(&self.config);
        log::trace!("{} wheel {} (step {})", self.id, delta, magnitude);
        WheelOutcome {
            magnitude,
            consumed: true,
        }
    }

    pub fn tick(&mut self) {
        if let Some(candidate) = Autoplay::on_tick(&mut self.state, &self.config) {
            self.update(candidate);
        }
    }

    pub fn set_fraction(&mut self, fraction: f64) {
        self.update(fraction);
    }

    pub fn set_frame(&mut self, frame: u32) {
        let count = self.config.effective_frame_count();
        let candidate = if count == 0 {
            0.0
        } else {
            (frame.max(1) - 1) as f64 / count as f64
        };
        self.update(candidate);
    }

    /// 回到初始状态（初始位置、方向和自动播放延迟）
    pub fn reset(&mut self) {
        self.state = InstanceState::new(&self.config);
        let fraction = self.state.fraction;
        let frame = self.frame();
        self.emit(ReelEvent::FractionChange(fraction));
        self.emit(ReelEvent::FrameChange(frame));
    }

    fn update(&mut self, candidate: f64) {
        let normalized = normalize(&mut self.state, &self.config, candidate);
        if normalized.over_edge {
            log::trace!("{} over edge, fraction {}", self.id, normalized.fraction);
        }
        let frame = self.frame();
        self.emit(ReelEvent::FractionChange(normalized.fraction));
        self.emit(ReelEvent::FrameChange(frame));
    }

    fn emit(&mut self, event: ReelEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl PointerSession for Reel {
    fn begin(&mut self, x: f64, kind: PointerKind) {
        self.down(x, kind);
    }

    fn move_to(&mut self, x: f64) {
        self.drag(x);
    }

    fn end(&mut self) {
        self.up();
    }
}

impl Drop for Reel {
    fn drop(&mut self) {
        log::debug!("{} teardown", self.id);
    }
}
