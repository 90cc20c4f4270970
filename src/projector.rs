// projector.rs：位置 -> 帧号 -> 像素偏移
//
// 平铺模式下精灵图在固定视口下平移，偏移为负；逆向旋转时整体再向上挪过
// 一张正向帧区域。全景条模式只在 X 方向滑动。

use crate::config::{ProjectionMode, RotationConfig};
use glam::IVec2;

/// What the renderer consumes after every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub offset: IVec2,
    pub indicator_x: f64,
    pub frame: u32,
}

/// 1-based frame number for a canonical fraction.
pub fn frame_for_fraction(config: &RotationConfig, fraction: f64) -> u32 {
    let fraction = fraction.clamp(0.0, 1.0);
    (fraction * config.effective_frame_count() as f64).round() as u32 + 1
}

pub fn project(config: &RotationConfig, fraction: f64, reversed: bool) -> Projection {
    let frame = frame_for_fraction(config, fraction);
    let offset = match config.mode {
        ProjectionMode::Grid { footage, horizontal } => {
            grid_offset(config, frame, footage, horizontal, reversed)
        }
        ProjectionMode::LinearStrip { length } => strip_offset(config, frame, length),
    };

    let track = config.viewport.width as f64 - config.indicator as f64;
    Projection {
        offset,
        indicator_x: fraction.clamp(0.0, 1.0) * track,
        frame,
    }
}

fn grid_offset(
    config: &RotationConfig,
    frame: u32,
    footage: u32,
    horizontal: bool,
    reversed: bool,
) -> IVec2 {
    let frame = frame as i32;
    let footage = footage.max(1) as i32;
    let spacing = config.spacing as i32;

    let mut major = frame / footage;
    let mut minor = frame - major * footage - 1;
    // 一行的最后一帧落在下一行的 -1 位置，借位回来
    if minor == -1 {
        major -= 1;
        minor = footage - 1;
    }

    let (width, height) = (config.viewport.width as i32, config.viewport.height as i32);
    let (major_size, minor_size) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };

    let major_px = -major * (spacing + major_size);
    let minor_px = -minor * (spacing + minor_size);

    let mut offset = if horizontal {
        IVec2::new(minor_px, major_px)
    } else {
        IVec2::new(major_px, minor_px)
    };

    // 逆向帧组总是排在正向帧组下方
    if reversed {
        let rows = (config.frames as i32 + footage - 1) / footage;
        offset.y -= rows * major_size + (rows - 1) * spacing;
    }
    offset
}

fn strip_offset(config: &RotationConfig, frame: u32, length: f64) -> IVec2 {
    let travel = if config.loops {
        length
    } else {
        length - config.viewport.width as f64
    };
    let step = travel / config.steps.max(1) as f64;
    let x = ((frame - 1) as f64 * step).round() as i32;
    IVec2::new(-x, 0)
}
