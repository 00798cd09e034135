//! 摆动链模拟
//!
//! 根节点固定的质点链，相邻节点之间是刚性长度约束。
//! 受重力、外力（风）和根节点位移驱动，用于头发、衣物等次级运动。
//!
//! 每一步按索引顺序更新：节点 i 依赖节点 i-1 本步刚更新的位置。

use glam::Vec2;

use crate::config::get_config;
use crate::{PuppetError, Result};

/// 方向向量的最小有效长度
const MIN_DIRECTION_LENGTH: f32 = 1e-6;

/// 节点物理常量（构造后不变）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkVertex {
    /// 与上一节点的距离（链节长度）
    pub radius: f32,
    /// 延迟（按参考帧率标定）
    pub delay: f32,
    /// 重力加速度缩放
    pub acceleration: f32,
    /// 速度保留比例
    pub mobility: f32,
}

impl LinkVertex {
    pub fn new(radius: f32, delay: f32, acceleration: f32, mobility: f32) -> Self {
        Self {
            radius,
            delay,
            acceleration,
            mobility,
        }
    }
}

/// 摆动链
#[derive(Debug, Clone)]
pub struct LinkChain {
    vertices: Vec<LinkVertex>,

    // --- 每节点动态状态 ---
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    last_positions: Vec<Vec2>,
    last_gravities: Vec<Vec2>,

    /// 静止时的重力方向
    rest_gravity: Vec2,
    /// 当前基础重力方向（受惯性影响）
    gravity: Vec2,
    air_resistance: f32,
    movement_threshold: f32,
    reference_fps: f32,
}

impl LinkChain {
    /// 创建摆动链，节点 0 为根节点
    pub fn new(vertices: Vec<LinkVertex>) -> Result<Self> {
        if vertices.is_empty() {
            return Err(PuppetError::InvalidChain(
                "chain needs at least a root vertex".to_string(),
            ));
        }

        let config = get_config();
        let rest_gravity = Vec2::from(config.gravity)
            .try_normalize()
            .unwrap_or(Vec2::NEG_Y);
        let count = vertices.len();

        Ok(Self {
            vertices,
            positions: vec![Vec2::ZERO; count],
            velocities: vec![Vec2::ZERO; count],
            last_positions: vec![Vec2::ZERO; count],
            last_gravities: vec![rest_gravity; count],
            rest_gravity,
            gravity: rest_gravity,
            air_resistance: config.air_resistance,
            movement_threshold: config.movement_threshold,
            reference_fps: config.reference_fps,
        })
    }

    /// 从按列给出的常量创建，所有列长度必须一致
    pub fn from_columns(
        radius: &[f32],
        delay: &[f32],
        acceleration: &[f32],
        mobility: &[f32],
    ) -> Result<Self> {
        let count = radius.len();
        if delay.len() != count || acceleration.len() != count || mobility.len() != count {
            return Err(PuppetError::InvalidChain(format!(
                "column lengths differ: radius={}, delay={}, acceleration={}, mobility={}",
                radius.len(),
                delay.len(),
                acceleration.len(),
                mobility.len()
            )));
        }

        let vertices = (0..count)
            .map(|i| LinkVertex::new(radius[i], delay[i], acceleration[i], mobility[i]))
            .collect();
        Self::new(vertices)
    }

    /// 设置空气阻力与死区阈值
    pub fn with_environment(mut self, air_resistance: f32, movement_threshold: f32) -> Self {
        self.air_resistance = air_resistance;
        self.movement_threshold = movement_threshold;
        self
    }

    /// 推进一步
    ///
    /// # 参数
    /// - `delta_time`: 时间步长（秒）
    /// - `root`: 根节点位移
    /// - `root_angle`: 整体旋转角度（度）
    /// - `external_force`: 外力（风）
    pub fn step(&mut self, delta_time: f32, root: Vec2, root_angle: f32, external_force: Vec2) {
        self.positions[0] = root;

        let mut current_gravity = Vec2::from_angle(root_angle.to_radians()).rotate(self.gravity);
        // 旋转抵消重力时长度可能为零，此时不归一化
        if current_gravity.length() > MIN_DIRECTION_LENGTH {
            current_gravity = current_gravity.normalize();
        }

        for i in 1..self.vertices.len() {
            let vertex = self.vertices[i];
            let prev = self.positions[i - 1];

            self.last_positions[i] = self.positions[i];

            let force = current_gravity * vertex.acceleration + external_force;
            let effective_delay = vertex.delay * delta_time * self.reference_fps;

            // 重力方向变化时，链节按变化角度（除以空气阻力）跟随旋转
            let last_gravity = self.last_gravities[i];
            let angle_diff = last_gravity
                .perp_dot(current_gravity)
                .atan2(last_gravity.dot(current_gravity));
            let radian = if self.air_resistance > 0.0 {
                angle_diff / self.air_resistance
            } else {
                angle_diff
            };
            let direction = self.positions[i] - prev;
            let rotated_direction = Vec2::from_angle(radian).rotate(direction);

            let candidate = prev
                + rotated_direction
                + self.velocities[i] * effective_delay
                + force * effective_delay * effective_delay;

            // 刚性长度约束
            let unit = (candidate - prev)
                .try_normalize()
                .or_else(|| current_gravity.try_normalize())
                .unwrap_or(Vec2::NEG_Y);
            let mut constrained = prev + unit * vertex.radius;

            // 死区只检查水平分量
            if constrained.x.abs() < self.movement_threshold {
                constrained.x = 0.0;
            }
            self.positions[i] = constrained;

            self.velocities[i] = if effective_delay != 0.0 {
                (constrained - self.last_positions[i]) * (vertex.mobility / effective_delay)
            } else {
                Vec2::ZERO
            };

            self.last_gravities[i] = current_gravity;
        }
    }

    /// 以拖拽速度设置惯性重力
    ///
    /// gravity = normalize(rest + normalize(v) * mix)
    pub fn set_inertial_force(&mut self, velocity: Vec2) {
        let mix = get_config().inertia_gravity_mix;
        let direction = velocity.try_normalize().unwrap_or(velocity);
        self.gravity = (self.rest_gravity + direction * mix)
            .try_normalize()
            .unwrap_or(self.rest_gravity);
    }

    /// 所有节点位置（索引 0 为根节点）
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// 所有节点速度
    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    pub fn vertices(&self) -> &[LinkVertex] {
        &self.vertices
    }

    /// 当前基础重力方向
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// 末节点相对根节点的水平位移
    pub fn horizontal_sway(&self) -> f32 {
        match (self.positions.first(), self.positions.last()) {
            (Some(first), Some(last)) => last.x - first.x,
            _ => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// 重置所有动态状态
    pub fn reset(&mut self) {
        self.positions.fill(Vec2::ZERO);
        self.velocities.fill(Vec2::ZERO);
        self.last_positions.fill(Vec2::ZERO);
        self.gravity = self.rest_gravity;
        self.last_gravities.fill(self.rest_gravity);
    }
}
