//! 2D 人偶动画运行时
//!
//! - `animation`: 曲线段、参数轨道、动作目录与播放状态机
//! - `physics`: 摆动链模拟、参数绑定与物理配置
//! - `driver`: 每帧调度，合并动作姿态与物理输出到参数表

pub mod animation;
pub mod config;
pub mod driver;
pub mod physics;

use std::collections::HashMap;

pub use animation::{
    CurveSegment, Motion, MotionCatalog, ParameterTrack, PlaybackController, PlaybackFrame,
};
pub use driver::{FrameDriver, FrameInput, FrameOutput};
pub use physics::{LinkChain, LinkVertex, ParamBinding, PhysicsBinding, PhysicsRig};

/// 参数表（参数 ID -> 当前值）
pub type ParameterMap = HashMap<String, f32>;

/// 参数取值范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParameterRange {
    pub fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// 范围跨度
    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// 引擎错误
#[derive(Debug, thiserror::Error)]
pub enum PuppetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("motion '{motion}', parameter '{parameter}': {reason}")]
    MotionParse {
        motion: String,
        parameter: String,
        reason: String,
    },

    #[error("physics parse error: {0}")]
    PhysicsParse(String),

    #[error("invalid link chain: {0}")]
    InvalidChain(String),

    #[error("segment [{start}, {end}] is out of order after a segment ending at {previous_end}")]
    UnorderedSegment {
        start: f32,
        end: f32,
        previous_end: f32,
    },

    #[error("time {time} outside segment domain [{start}, {end}]")]
    OutOfDomain { time: f32, start: f32, end: f32 },

    #[error("unknown motion: {0}")]
    UnknownMotion(String),
}

pub type Result<T> = std::result::Result<T, PuppetError>;
