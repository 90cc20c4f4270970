// lib.rs：转盘（turntable）核心状态机
//
// 把拖拽距离、滚轮、时钟 tick 换算成 [0,1] 的旋转位置，再投影成帧号与像素偏移。
// 不依赖窗口/GPU，界面层（main.rs / renderer.rs）只负责喂输入、取输出。

pub mod autoplay;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod normalizer;
pub mod projector;
pub mod reel;
pub mod sprite;
pub mod state;

pub use clock::Clock;
pub use config::{ProjectionMode, ReelOptions, RotationConfig, Viewport};
pub use error::ReelError;
pub use input::{MouseAdapter, PointerKind, PointerSession, TouchAdapter, TouchPhase};
pub use projector::Projection;
pub use reel::{Reel, ReelEvent, ReelId};
pub use state::InstanceState;
