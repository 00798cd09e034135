//! 动画运行时配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 运行时配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    // ========== 重力 ==========
    /// 摆动链的基础重力方向，默认 [0, -1]（单位向量，向下）
    pub gravity: [f32; 2],

    // ========== 摆动链 ==========
    /// 空气阻力，默认 1.0
    /// 重力方向变化时，链节跟随旋转的角度会除以此值
    pub air_resistance: f32,
    /// 移动阈值（死区），默认 0.01
    /// 节点水平坐标绝对值小于此值时归零，抑制静止时的抖动
    pub movement_threshold: f32,
    /// 延迟参数的参考帧率，默认 30.0
    pub reference_fps: f32,

    // ========== 惯性效果 ==========
    /// 拖拽惯性对重力方向的影响比例，默认 0.9
    pub inertia_gravity_mix: f32,
    /// 惯性计算使用的质量，默认 1.0
    pub inertia_mass: f32,

    // ========== 参数映射 ==========
    /// 物理输出换算跨度，默认 20.0
    /// 输出 = 链位移 * (max - min) / parameter_span
    pub parameter_span: f32,

    // ========== 帧调度 ==========
    /// 刷新率，默认 60.0
    pub refresh_rate: f32,
    /// 动作结束后回到默认姿态前的等待时长（秒），默认 0.1
    pub return_to_default_seconds: f32,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            // ====== 重力 ======
            gravity: [0.0, -1.0],

            // ====== 摆动链 ======
            air_resistance: 1.0,
            movement_threshold: 0.01,
            // 延迟参数按 30fps 标定，其他帧率下换算保持视觉一致
            reference_fps: 30.0,

            // ====== 惯性效果 ======
            inertia_gravity_mix: 0.9,
            inertia_mass: 1.0,

            // ====== 参数映射 ======
            parameter_span: 20.0,

            // ====== 帧调度 ======
            refresh_rate: 60.0,
            return_to_default_seconds: 0.1,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

impl AnimationConfig {
    /// 每帧时间步长（秒）
    pub fn frame_delta(&self) -> f32 {
        if self.refresh_rate > 0.0 {
            1.0 / self.refresh_rate
        } else {
            0.0
        }
    }
}

/// 全局配置实例
static ANIMATION_CONFIG: Lazy<RwLock<AnimationConfig>> =
    Lazy::new(|| RwLock::new(AnimationConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> AnimationConfig {
    ANIMATION_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: AnimationConfig) {
    *ANIMATION_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *ANIMATION_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = AnimationConfig::default();
}
