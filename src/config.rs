// config.rs：转盘选项与解析后的不可变配置

use crate::error::ReelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TEMPO: f64 = 25.0;
pub const DEFAULT_SENSITIVITY: f64 = 20.0;

/// User-facing option bag. Every field is optional in JSON; missing fields
/// take the stock turntable defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelOptions {
    pub animate: bool,
    /// 初始化到自动播放之间的延迟（秒）
    pub delay: f64,
    pub footage: i64,
    pub frequency: f64,
    pub frame: i64,
    pub frames: i64,
    pub horizontal: bool,
    pub indicator: u32,
    pub hint: String,
    pub loops: bool,
    pub monitor: Option<String>,
    pub reversed: Option<bool>,
    pub revolution: Option<f64>,
    pub sensitivity: f64,
    pub spacing: i64,
    pub step: Option<i64>,
    pub steps: Option<i64>,
    pub stitched: Option<f64>,
    pub suffix: String,
    pub tempo: f64,
    pub timeout: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for ReelOptions {
    fn default() -> Self {
        Self {
            animate: true,
            delay: 1.0,
            footage: 6,
            frequency: 0.25,
            frame: 1,
            frames: 36,
            horizontal: true,
            indicator: 0,
            hint: String::new(),
            loops: true,
            monitor: None,
            reversed: None,
            revolution: None,
            sensitivity: DEFAULT_SENSITIVITY,
            spacing: 0,
            step: None,
            steps: None,
            stitched: None,
            suffix: "-reel".to_string(),
            tempo: DEFAULT_TEMPO,
            timeout: 1.0,
            width: None,
            height: None,
        }
    }
}

impl ReelOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ReelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ReelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReelError::ReadOptions {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    fn stitched_length(&self) -> Option<f64> {
        self.stitched.filter(|l| l.is_finite() && *l > 0.0)
    }
}

/// 两种互斥的投影方式：平铺精灵图 / 拼接全景条
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Grid { footage: u32, horizontal: bool },
    LinearStrip { length: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Work out the size of one frame from the loaded sheet.
    ///
    /// Explicit `width`/`height` options win. Otherwise a grid sheet is split
    /// into `footage` frames per line and `ceil(frames / footage)` lines, and a
    /// stitched strip is shown through a square window as tall as the strip.
    pub fn infer(options: &ReelOptions, texture_w: u32, texture_h: u32) -> Self {
        let (auto_w, auto_h) = if options.stitched_length().is_some() {
            (texture_h.min(texture_w), texture_h)
        } else {
            let frames = options.frames.max(1) as u32;
            let footage = options.footage.max(1) as u32;
            let spacing = options.spacing.max(0) as u32;
            let lines = frames.div_ceil(footage);

            // 主方向放 footage 帧，交叉方向放 lines 行
            let split = |total: u32, count: u32| {
                total.saturating_sub((count - 1) * spacing) / count
            };
            if options.horizontal {
                (split(texture_w, footage), split(texture_h, lines))
            } else {
                (split(texture_w, lines), split(texture_h, footage))
            }
        };

        Self::new(
            options.width.unwrap_or(auto_w),
            options.height.unwrap_or(auto_h),
        )
    }
}

/// Immutable per-reel configuration, resolved once at setup.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationConfig {
    pub frames: u32,
    pub steps: u32,
    pub mode: ProjectionMode,
    pub loops: bool,
    pub reversed: bool,
    pub spacing: u32,
    pub sensitivity: f64,
    pub revolution: Option<f64>,
    pub tempo: f64,
    pub timeout: f64,
    pub frequency: f64,
    pub animate: bool,
    pub delay: f64,
    pub initial_fraction: f64,
    pub indicator: u32,
    pub viewport: Viewport,
}

impl RotationConfig {
    pub fn resolve(options: &ReelOptions, viewport: Viewport) -> Self {
        let frames = clamp_count(options.frames);
        let steps = options.steps.map(clamp_count).unwrap_or(frames);
        let resolution = frames.max(steps);

        let mode = match options.stitched_length() {
            Some(length) => ProjectionMode::LinearStrip { length },
            None => ProjectionMode::Grid {
                footage: clamp_count(options.footage),
                horizontal: options.horizontal,
            },
        };

        let tempo = positive_or(options.tempo, DEFAULT_TEMPO, "tempo");
        let sensitivity = positive_or(options.sensitivity, DEFAULT_SENSITIVITY, "sensitivity");

        let start = options.step.unwrap_or(options.frame);
        let initial_fraction = ((start - 1) as f64 / resolution as f64).clamp(0.0, 1.0);

        Self {
            frames,
            steps,
            mode,
            loops: options.loops,
            reversed: options.reversed.unwrap_or(options.frequency < 0.0),
            spacing: options.spacing.max(0) as u32,
            sensitivity,
            revolution: options.revolution.filter(|r| r.is_finite() && *r > 0.0),
            tempo,
            timeout: non_negative(options.timeout),
            frequency: if options.frequency.is_finite() { options.frequency } else { 0.0 },
            animate: options.animate,
            delay: non_negative(options.delay),
            initial_fraction,
            indicator: options.indicator,
            viewport,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.frames.max(self.steps)
    }

    pub fn is_stitched(&self) -> bool {
        matches!(self.mode, ProjectionMode::LinearStrip { .. })
    }

    /// Divisor used to turn a fraction into a frame number.
    ///
    /// Grid sheets map [0,1] onto frames 1..=frames, strips onto 1..=frames+1
    /// so the last strip position lines up with the wrap point.
    pub fn effective_frame_count(&self) -> u32 {
        match self.mode {
            ProjectionMode::Grid { .. } => self.frames - 1,
            ProjectionMode::LinearStrip { .. } => self.frames,
        }
    }

    /// 拖满一整圈所需的像素距离
    pub fn revolution_distance(&self) -> f64 {
        let derived = match self.mode {
            ProjectionMode::LinearStrip { length } => length / 2.0,
            ProjectionMode::Grid { .. } => self.viewport.width as f64 * 2.0,
        };
        self.revolution.unwrap_or(derived).max(1.0)
    }

    pub fn idle_sentinel(&self) -> i64 {
        -(self.timeout * self.tempo).round() as i64
    }

    pub fn initial_idle(&self) -> i64 {
        if self.animate {
            -(self.delay * self.tempo).round() as i64
        } else {
            0
        }
    }
}

fn clamp_count(value: i64) -> u32 {
    value.clamp(1, u32::MAX as i64) as u32
}

fn positive_or(value: f64, fallback: f64, name: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("reel option `{}` = {} is not positive, using {}", name, value, fallback);
        fallback
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
