// autoplay.rs：空闲一段时间后自动旋转

use crate::config::RotationConfig;
use crate::state::InstanceState;

/// Flip the configured frequency so autoplay keeps spinning the way the
/// user last turned the reel.
pub fn effective_frequency(frequency: f64, reversed: bool) -> f64 {
    if (reversed && frequency > 0.0) || (!reversed && frequency < 0.0) {
        -frequency
    } else {
        frequency
    }
}

pub struct Autoplay;

impl Autoplay {
    /// Advance the idle counter by one tick and return the next candidate
    /// fraction once the reel has been idle long enough.
    pub fn on_tick(state: &mut InstanceState, config: &RotationConfig) -> Option<f64> {
        if state.is_dragging() {
            return None;
        }
        if state.idle_ticks < 0 {
            state.idle_ticks += 1;
        }
        if state.idle_ticks != 0 {
            return None;
        }

        let step = effective_frequency(config.frequency, state.reversed) / config.tempo;
        Some(state.fraction + step)
    }
}
