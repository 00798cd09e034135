//! 动作数据
//!
//! 一个动作由若干参数轨道组成，加载后只读

use std::collections::HashMap;

use super::motion_track::ParameterTrack;
use crate::ParameterMap;

/// 动作
#[derive(Debug, Clone, Default)]
pub struct Motion {
    /// 动作名称
    pub name: String,
    /// 所属分组
    pub group: String,
    /// 分组内索引
    pub index: u32,
    /// 时长（秒）
    pub duration: f32,
    /// 帧率（仅元数据，曲线是连续时间）
    pub fps: u32,
    tracks: Vec<(String, ParameterTrack)>,
    name_to_index: HashMap<String, usize>,
}

impl Motion {
    pub fn new(name: impl Into<String>, group: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            index,
            ..Self::default()
        }
    }

    /// 设置时长与帧率
    pub fn with_info(mut self, duration: f32, fps: u32) -> Self {
        self.duration = duration;
        self.fps = fps;
        self
    }

    /// 插入参数轨道，同名轨道会被替换并返回旧轨道
    pub fn insert_track(&mut self, parameter: &str, track: ParameterTrack) -> Option<ParameterTrack> {
        if let Some(&idx) = self.name_to_index.get(parameter) {
            return Some(std::mem::replace(&mut self.tracks[idx].1, track));
        }
        self.name_to_index.insert(parameter.to_string(), self.tracks.len());
        self.tracks.push((parameter.to_string(), track));
        None
    }

    /// 获取参数轨道
    pub fn track(&self, parameter: &str) -> Option<&ParameterTrack> {
        self.name_to_index
            .get(parameter)
            .map(|&idx| &self.tracks[idx].1)
    }

    /// 是否包含参数轨道
    pub fn contains_track(&self, parameter: &str) -> bool {
        self.name_to_index.contains_key(parameter)
    }

    /// 参数轨道名称（按加载顺序）
    pub fn track_names(&self) -> impl Iterator<Item = &String> {
        self.tracks.iter().map(|(name, _)| name)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// 单个参数在指定时间的值，未覆盖返回 None
    pub fn sample(&self, parameter: &str, t: f32) -> Option<f32> {
        self.track(parameter)?.sample(t)
    }

    /// 采样完整姿态
    ///
    /// 只包含在 t 处有曲线段覆盖的参数，未覆盖的参数不出现（而不是置零）。
    /// 调用方负责把 t 限制在 [0, duration] 内。
    pub fn sample_pose(&self, t: f32) -> ParameterMap {
        self.tracks
            .iter()
            .filter_map(|(name, track)| track.sample(t).map(|v| (name.clone(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::CurveSegment;

    fn build_motion() -> Motion {
        let mut motion = Motion::new("wave", "Idle", 0).with_info(2.0, 30);
        motion.insert_track(
            "ParamAngleX",
            ParameterTrack::from_segments(vec![CurveSegment::linear(0.0, 0.0, 2.0, 30.0)]),
        );
        motion.insert_track(
            "ParamArmL",
            ParameterTrack::from_segments(vec![CurveSegment::linear(0.0, 1.0, 1.0, 0.0)]),
        );
        motion
    }

    #[test]
    fn test_sample_pose_omits_uncovered() {
        let motion = build_motion();
        let pose = motion.sample_pose(0.5);
        assert_eq!(pose.len(), 2);
        assert!((pose["ParamAngleX"] - 7.5).abs() < 1e-5);

        let pose = motion.sample_pose(1.5);
        assert_eq!(pose.len(), 1);
        assert!(!pose.contains_key("ParamArmL"));
    }

    #[test]
    fn test_sample_is_pure() {
        let motion = build_motion();
        assert_eq!(motion.sample_pose(1.234), motion.sample_pose(1.234));
    }

    #[test]
    fn test_insert_replaces_existing_track() {
        let mut motion = build_motion();
        let old = motion.insert_track(
            "ParamAngleX",
            ParameterTrack::from_segments(vec![CurveSegment::linear(0.0, 5.0, 2.0, 5.0)]),
        );
        assert!(old.is_some());
        assert_eq!(motion.track_count(), 2);
        assert_eq!(motion.sample("ParamAngleX", 1.0), Some(5.0));
        assert_eq!(motion.sample("ParamMissing", 1.0), None);
    }
}
