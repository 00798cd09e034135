//! 动作播放控制器
//!
//! 同一时刻最多播放一个动作。播放中收到的新请求直接丢弃，
//! 动作结束时先输出恰好位于 duration 的最后一帧，再回到空闲状态。

use std::sync::Arc;

use super::motion::Motion;
use crate::ParameterMap;

/// 播放状态
#[derive(Debug, Clone, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing {
        motion: Arc<Motion>,
        /// 自激活起累计的时间（秒）
        clock: f32,
    },
}

/// 单帧播放结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackFrame {
    pub pose: ParameterMap,
    /// 是否为动作的最后一帧
    pub is_final: bool,
}

/// 播放控制器
#[derive(Debug, Clone, Default)]
pub struct PlaybackController {
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求播放动作，仅空闲时接受
    pub fn request(&mut self, motion: Arc<Motion>) -> bool {
        match self.state {
            PlaybackState::Idle => {
                self.state = PlaybackState::Playing { motion, clock: 0.0 };
                true
            }
            PlaybackState::Playing { .. } => false,
        }
    }

    /// 推进时钟并采样
    ///
    /// 时钟不超过 duration 时按时钟采样；超过时按 duration 采样并结束播放。
    /// 空闲时返回空姿态。
    pub fn tick(&mut self, delta_time: f32) -> PlaybackFrame {
        let PlaybackState::Playing { motion, clock } = &mut self.state else {
            return PlaybackFrame::default();
        };

        *clock += delta_time.max(0.0);
        if *clock <= motion.duration {
            return PlaybackFrame {
                pose: motion.sample_pose(*clock),
                is_final: false,
            };
        }

        let pose = motion.sample_pose(motion.duration);
        self.state = PlaybackState::Idle;
        PlaybackFrame {
            pose,
            is_final: true,
        }
    }

    /// 强制回到空闲状态
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// 正在播放的动作
    pub fn current_motion(&self) -> Option<&Arc<Motion>> {
        match &self.state {
            PlaybackState::Playing { motion, .. } => Some(motion),
            PlaybackState::Idle => None,
        }
    }

    /// 当前播放时间
    pub fn elapsed(&self) -> Option<f32> {
        match &self.state {
            PlaybackState::Playing { clock, .. } => Some(*clock),
            PlaybackState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{CurveSegment, ParameterTrack};

    fn angle_motion(name: &str, duration: f32) -> Arc<Motion> {
        let mut motion = Motion::new(name, "Idle", 0).with_info(duration, 30);
        motion.insert_track(
            "ParamAngleX",
            ParameterTrack::from_segments(vec![CurveSegment::linear(0.0, 0.0, duration, 30.0)]),
        );
        Arc::new(motion)
    }

    #[test]
    fn test_idle_tick_is_empty() {
        let mut controller = PlaybackController::new();
        let frame = controller.tick(0.1);
        assert!(frame.pose.is_empty());
        assert!(!frame.is_final);
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_request_while_playing_is_ignored() {
        let mut controller = PlaybackController::new();
        assert!(controller.request(angle_motion("a", 1.0)));
        controller.tick(0.3);
        assert!(!controller.request(angle_motion("b", 5.0)));
        assert_eq!(controller.current_motion().unwrap().name, "a");
        assert!((controller.elapsed().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_final_frame_sampled_at_duration() {
        let mut controller = PlaybackController::new();
        controller.request(angle_motion("a", 1.0));

        let frame = controller.tick(0.0);
        assert_eq!(frame.pose["ParamAngleX"], 0.0);
        assert!(!frame.is_final);

        let frame = controller.tick(0.5);
        assert!((frame.pose["ParamAngleX"] - 15.0).abs() < 1e-5);
        assert!(!frame.is_final);

        // 累计 1.3 > 1.0，按 duration 采样而不是按 1.3
        let frame = controller.tick(0.8);
        assert!(frame.is_final);
        assert!((frame.pose["ParamAngleX"] - 30.0).abs() < 1e-5);
        assert!(!controller.is_playing());

        assert!(controller.request(angle_motion("b", 1.0)));
    }

    #[test]
    fn test_clock_equal_to_duration_is_not_final() {
        let mut controller = PlaybackController::new();
        controller.request(angle_motion("a", 1.0));
        let frame = controller.tick(1.0);
        assert!(!frame.is_final);
        let frame = controller.tick(0.01);
        assert!(frame.is_final);
    }

    #[test]
    fn test_reset() {
        let mut controller = PlaybackController::new();
        controller.request(angle_motion("a", 1.0));
        controller.reset();
        assert!(!controller.is_playing());
        assert!(controller.elapsed().is_none());
    }
}
