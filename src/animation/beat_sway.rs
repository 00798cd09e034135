//! 节拍摆动
//!
//! 根据外部检测到的节拍周期生成循环的头部/身体摆动。
//! 一个循环为 `beats_per_cycle` 拍，相位 t ∈ [0, 1)：
//! 水平摆动由镜像拼接的 Sigmoid 构成，垂直点头为 cos(4πt)。

use crate::ParameterMap;

/// 默认每个循环的拍数
pub const DEFAULT_BEATS_PER_CYCLE: u32 = 4;
/// 快节奏阈值（秒），节拍周期小于此值时整个头部参与摆动
pub const FAST_BEAT_PERIOD: f32 = 0.8;
/// Sigmoid 陡峭度
const SWING_STEEPNESS: f32 = 30.0;

/// 镜像拼接 Sigmoid：前半段从 -1 升到 1，后半段回落到 -1
pub fn swing_sigmoid(t: f32) -> f32 {
    let k = SWING_STEEPNESS;
    if t < 0.5 {
        2.0 * (1.0 / (1.0 + (-k * (t - 0.25)).exp()) - 0.5)
    } else {
        2.0 * (1.0 - 1.0 / (1.0 + (-k * (t - 0.75)).exp()) - 0.5)
    }
}

/// 节拍摆动状态
#[derive(Debug, Clone, Default)]
pub struct BeatSway {
    /// 当前循环内已经过的时间（秒）
    clock: f32,
}

impl BeatSway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进并生成摆动姿态
    ///
    /// 周期或拍数无效时返回 None 并重置相位。
    pub fn tick(
        &mut self,
        delta_time: f32,
        beat_period: f32,
        beats_per_cycle: u32,
    ) -> Option<ParameterMap> {
        if !(beat_period > 0.0) || beats_per_cycle == 0 {
            self.reset();
            return None;
        }

        let cycle = beat_period * beats_per_cycle as f32;
        self.clock = (self.clock + delta_time.max(0.0)) % cycle;
        Some(Self::pose(self.clock / cycle, beat_period))
    }

    /// 相位 t 处的摆动姿态
    pub fn pose(t: f32, beat_period: f32) -> ParameterMap {
        let angle_x = swing_sigmoid(t);
        let angle_y = (4.0 * std::f32::consts::PI * t).cos();

        let mut pose = ParameterMap::new();
        if beat_period < FAST_BEAT_PERIOD {
            pose.insert("ParamAngleY".to_string(), -20.0 * angle_y);
            pose.insert("ParamAngleX".to_string(), 20.0 * angle_x);
            pose.insert("ParamAngleZ".to_string(), -20.0 * angle_x);
            pose.insert("ParamBodyAngleX".to_string(), -6.0 * angle_x);
        } else {
            pose.insert("ParamAngleZ".to_string(), 10.0 * angle_x);
            pose.insert("ParamBodyAngleZ".to_string(), 6.0 * angle_x);
        }
        pose
    }

    /// 相位归零
    pub fn reset(&mut self) {
        self.clock = 0.0;
    }

    /// 当前循环内时间
    pub fn clock(&self) -> f32 {
        self.clock
    }
}
