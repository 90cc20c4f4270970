// normalizer.rs：把任意候选位置规整到 [0,1]
//
// 到达端点后若仍继续越界（连续两次夹到同一端），循环模式会反射到另一端，
// 非循环模式则停在端点。方向由未夹取的增量推断。

use crate::config::RotationConfig;
use crate::state::InstanceState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub fraction: f64,
    pub reversed: bool,
    pub over_edge: bool,
}

pub fn normalize(state: &mut InstanceState, config: &RotationConfig, candidate: f64) -> Normalized {
    let last = state.last_fraction;
    let candidate = if candidate.is_nan() { last } else { candidate };

    let delta = candidate - last;
    let clamped = candidate.clamp(0.0, 1.0);
    let over_edge = (clamped == 1.0 && last == 1.0) || (clamped == 0.0 && last == 0.0);

    let fraction = if config.loops && over_edge {
        (clamped - 1.0).abs()
    } else {
        clamped
    };

    state.fraction = fraction;
    state.last_fraction = fraction;
    if delta != 0.0 {
        state.reversed = delta < 0.0;
    }
    state.frame = fraction * config.effective_frame_count() as f64 + 1.0;

    Normalized {
        fraction,
        reversed: state.reversed,
        over_edge,
    }
}
