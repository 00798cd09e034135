//! 帧调度
//!
//! 每帧根据播放控制器的状态选择动作姿态或物理输出，合并到参数表。
//! 空闲且提供了节拍周期时，先叠加节拍摆动再推进物理。
//! 呼吸、眨眼等由外部自动行为占用的参数在合并时跳过。

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;

use crate::animation::{BeatSway, MotionCatalog, PlaybackController, DEFAULT_BEATS_PER_CYCLE};
use crate::config::get_config;
use crate::physics::PhysicsRig;
use crate::{ParameterMap, ParameterRange, PuppetError, Result};

/// 每帧输入
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// 时间步长（秒）
    pub delta_time: f32,
    /// 拖拽速度（用于惯性）
    pub drag_velocity: Vec2,
    /// 根节点旋转角度（度），作用于所有摆动链
    pub root_angle: f32,
    /// 叠加到每个链节的外力
    pub external_force: Vec2,
    /// 外部检测到的节拍周期（秒），None 表示没有音乐
    pub beat_period: Option<f32>,
    /// 每个摆动循环包含的拍数
    pub beats_per_cycle: u32,
    /// 外部占用的参数，本帧不写入也不输出
    pub excluded: &'a [String],
}

impl Default for FrameInput<'_> {
    fn default() -> Self {
        Self {
            delta_time: 0.0,
            drag_velocity: Vec2::ZERO,
            root_angle: 0.0,
            external_force: Vec2::ZERO,
            beat_period: None,
            beats_per_cycle: DEFAULT_BEATS_PER_CYCLE,
            excluded: &[],
        }
    }
}

impl<'a> FrameInput<'a> {
    pub fn new(delta_time: f32) -> Self {
        Self {
            delta_time,
            ..Self::default()
        }
    }

    pub fn with_drag_velocity(mut self, velocity: Vec2) -> Self {
        self.drag_velocity = velocity;
        self
    }

    pub fn with_root_angle(mut self, degrees: f32) -> Self {
        self.root_angle = degrees;
        self
    }

    pub fn with_external_force(mut self, force: Vec2) -> Self {
        self.external_force = force;
        self
    }

    pub fn with_beat_period(mut self, period: f32) -> Self {
        self.beat_period = Some(period);
        self
    }

    pub fn with_beats_per_cycle(mut self, beats: u32) -> Self {
        self.beats_per_cycle = beats;
        self
    }

    pub fn with_excluded(mut self, excluded: &'a [String]) -> Self {
        self.excluded = excluded;
        self
    }

    #[inline]
    fn is_excluded(&self, id: &str) -> bool {
        self.excluded.iter().any(|e| e == id)
    }
}

/// 每帧输出
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// 交给渲染端的参数（不含外部占用的参数）
    pub parameters: ParameterMap,
    /// 本帧是否刚播放完一个动作
    pub motion_finished: bool,
}

/// 帧调度器
#[derive(Debug)]
pub struct FrameDriver {
    params: ParameterMap,
    ranges: HashMap<String, ParameterRange>,
    catalog: Arc<MotionCatalog>,
    playback: PlaybackController,
    rig: PhysicsRig,
    sway: BeatSway,
    /// 动作结束后距离回到默认值剩余的帧数
    reset_countdown: u32,
}

impl FrameDriver {
    /// 创建调度器，参数初始化为各自的默认值
    pub fn new(
        catalog: Arc<MotionCatalog>,
        rig: PhysicsRig,
        ranges: impl IntoIterator<Item = (String, ParameterRange)>,
    ) -> Self {
        let ranges: HashMap<String, ParameterRange> = ranges.into_iter().collect();
        let params = ranges
            .iter()
            .map(|(id, range)| (id.clone(), range.default))
            .collect();

        log::info!(
            "帧调度器创建: {} 个参数, {} 个动作, {} 个物理绑定",
            ranges.len(),
            catalog.len(),
            rig.len()
        );

        Self {
            params,
            ranges,
            catalog,
            playback: PlaybackController::new(),
            rig,
            sway: BeatSway::new(),
            reset_countdown: 0,
        }
    }

    /// 按名称播放动作
    ///
    /// 正在播放时请求被忽略并返回 `Ok(false)`。
    pub fn play(&mut self, name: &str) -> Result<bool> {
        let Some(motion) = self.catalog.find(name) else {
            log::warn!("动作 '{}' 不存在", name);
            return Err(PuppetError::UnknownMotion(name.to_string()));
        };
        let accepted = self.playback.request(motion);
        if accepted {
            self.reset_countdown = 0;
        }
        if get_config().debug_log {
            log::debug!("播放动作 '{}': {}", name, if accepted { "开始" } else { "忽略" });
        }
        Ok(accepted)
    }

    /// 强制停止当前动作
    pub fn stop(&mut self) {
        self.playback.reset();
    }

    /// 推进一帧
    pub fn tick(&mut self, input: &FrameInput) -> FrameOutput {
        let mut motion_finished = false;

        if self.playback.is_playing() {
            let frame = self.playback.tick(input.delta_time);
            self.merge(frame.pose, input);

            if frame.is_final {
                motion_finished = true;
                let config = get_config();
                let frames = (config.return_to_default_seconds * config.refresh_rate).round();
                self.reset_countdown = (frames as u32).max(1);
                if config.debug_log {
                    log::debug!("动作结束，{} 帧后回到默认姿态", self.reset_countdown);
                }
            }
        } else {
            if self.reset_countdown > 0 {
                self.reset_countdown -= 1;
                if self.reset_countdown == 0 {
                    self.restore_defaults(input);
                }
            }

            if let Some(period) = input.beat_period {
                let beats = input.beats_per_cycle;
                if let Some(pose) = self.sway.tick(input.delta_time, period, beats) {
                    self.merge(pose, input);
                }
            } else {
                self.sway.reset();
            }

            let outputs = self.rig.update(
                &self.params,
                &self.ranges,
                input.drag_velocity,
                input.root_angle,
                input.external_force,
                input.delta_time,
            );
            self.merge(outputs, input);
        }

        let parameters = self
            .params
            .iter()
            .filter(|(id, _)| !input.is_excluded(id))
            .map(|(id, value)| (id.clone(), *value))
            .collect();

        FrameOutput {
            parameters,
            motion_finished,
        }
    }

    fn merge(&mut self, values: ParameterMap, input: &FrameInput) {
        for (id, value) in values {
            if !input.is_excluded(&id) {
                self.params.insert(id, value);
            }
        }
    }

    fn restore_defaults(&mut self, input: &FrameInput) {
        for (id, range) in &self.ranges {
            if !input.is_excluded(id) {
                self.params.insert(id.clone(), range.default);
            }
        }
    }

    /// 所有参数恢复默认值
    pub fn reset_to_defaults(&mut self) {
        for (id, range) in &self.ranges {
            self.params.insert(id.clone(), range.default);
        }
    }

    /// 外部直接写入参数（视线跟随等）
    pub fn set_parameter(&mut self, id: &str, value: f32) {
        self.params.insert(id.to_string(), value);
    }

    pub fn parameter(&self, id: &str) -> Option<f32> {
        self.params.get(id).copied()
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.params
    }

    pub fn range(&self, id: &str) -> Option<&ParameterRange> {
        self.ranges.get(id)
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// 是否处于动作结束后的复位等待期
    pub fn resetting(&self) -> bool {
        self.reset_countdown > 0
    }

    pub fn catalog(&self) -> &Arc<MotionCatalog> {
        &self.catalog
    }

    pub fn rig(&self) -> &PhysicsRig {
        &self.rig
    }
}
