//! 动作文件加载器
//!
//! 解析 motion3.json 动作文件并转换为 Motion 数据。
//! 曲线数据为扁平数组: `[t0, v0, (类型, 控制点..., t_i, v_i)*]`，
//! 类型 0 = 直线（后随 2 个值），类型 1 = 三次贝塞尔（后随 6 个值）。

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::{PuppetError, Result};

use super::bezier_curve::CurveSegment;
use super::motion::Motion;
use super::motion_track::ParameterTrack;

/// 直线段类型标记
const SEGMENT_LINEAR: f32 = 0.0;
/// 贝塞尔段类型标记
const SEGMENT_BEZIER: f32 = 1.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MotionJson {
    meta: MotionMetaJson,
    #[serde(default)]
    curves: Vec<CurveJson>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MotionMetaJson {
    duration: f32,
    #[serde(default)]
    fps: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CurveJson {
    #[serde(default)]
    target: Option<String>,
    id: String,
    segments: Vec<f32>,
}

impl CurveJson {
    /// 只保留参数曲线（忽略部件透明度等其他目标）
    fn is_parameter_curve(&self) -> bool {
        match self.target.as_deref() {
            Some(target) => target == "Parameter",
            None => self.id.contains("Param"),
        }
    }
}

/// 解析扁平曲线数据为参数轨道
///
/// 类型标记错误、数据截断或时间倒退都会返回错误，并指明动作和参数。
pub fn parse_segments(motion: &str, parameter: &str, data: &[f32]) -> Result<ParameterTrack> {
    let fail = |reason: String| PuppetError::MotionParse {
        motion: motion.to_string(),
        parameter: parameter.to_string(),
        reason,
    };

    if data.len() < 2 {
        return Err(fail(format!(
            "curve needs a start point, got {} values",
            data.len()
        )));
    }

    let mut track = ParameterTrack::new();
    let mut start = Vec2::new(data[0], data[1]);
    let mut i = 2;

    while i < data.len() {
        let tag = data[i];
        i += 1;

        let segment = if tag == SEGMENT_LINEAR {
            let rest = data
                .get(i..i + 2)
                .ok_or_else(|| fail(format!("linear segment truncated at index {}", i - 1)))?;
            i += 2;
            CurveSegment::linear(start.x, start.y, rest[0], rest[1])
        } else if tag == SEGMENT_BEZIER {
            let rest = data
                .get(i..i + 6)
                .ok_or_else(|| fail(format!("bezier segment truncated at index {}", i - 1)))?;
            i += 6;
            CurveSegment::bezier(
                start.x,
                start.y,
                Vec2::new(rest[0], rest[1]),
                Vec2::new(rest[2], rest[3]),
                rest[4],
                rest[5],
            )
        } else {
            return Err(fail(format!(
                "unsupported segment type {} at index {}",
                tag,
                i - 1
            )));
        };

        start = match segment {
            CurveSegment::Linear(s) => s.p1,
            CurveSegment::Bezier(s) => s.p1,
        };
        track
            .push_segment(segment)
            .map_err(|err| fail(err.to_string()))?;
    }

    Ok(track)
}

/// 动作文件
#[derive(Debug, Clone)]
pub struct MotionFile {
    pub motion: Motion,
}

impl MotionFile {
    /// 从文件路径加载
    pub fn load<P: AsRef<Path>>(path: P, name: &str, group: &str, index: u32) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::load_from_str(&text, name, group, index)
    }

    /// 从字节切片加载
    pub fn load_from_bytes(bytes: &[u8], name: &str, group: &str, index: u32) -> Result<Self> {
        let json: MotionJson = serde_json::from_slice(bytes)?;
        Self::from_json(json, name, group, index)
    }

    /// 从 JSON 文本加载
    pub fn load_from_str(text: &str, name: &str, group: &str, index: u32) -> Result<Self> {
        let json: MotionJson = serde_json::from_str(text)?;
        Self::from_json(json, name, group, index)
    }

    fn from_json(json: MotionJson, name: &str, group: &str, index: u32) -> Result<Self> {
        let fps = json.meta.fps.max(0.0).round() as u32;
        let mut motion = Motion::new(name, group, index).with_info(json.meta.duration, fps);

        for curve in json.curves.iter().filter(|c| c.is_parameter_curve()) {
            let track = parse_segments(name, &curve.id, &curve.segments)?;
            if motion.insert_track(&curve.id, track).is_some() {
                log::warn!("动作 '{}' 中参数 '{}' 的曲线重复，使用后出现的曲线", name, curve.id);
            }
        }

        Ok(Self { motion })
    }

    /// 动作时长
    pub fn duration(&self) -> f32 {
        self.motion.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_segments() {
        let data = [
            0.0, 0.0, // 起点
            0.0, 1.0, 30.0, // 直线
            1.0, 1.3, 30.0, 1.6, 0.0, 2.0, 0.0, // 贝塞尔
        ];
        let track = parse_segments("m", "ParamAngleX", &data).unwrap();
        assert_eq!(track.len(), 2);
        assert!(matches!(track.segments()[0], CurveSegment::Linear(_)));
        assert!(matches!(track.segments()[1], CurveSegment::Bezier(_)));
        assert!((track.sample(0.5).unwrap() - 15.0).abs() < 1e-5);
        assert!((track.sample(2.0).unwrap()).abs() < 1e-4);
    }

    #[test]
    fn test_parse_start_point_only() {
        let track = parse_segments("m", "p", &[0.0, 1.0]).unwrap();
        assert!(track.is_empty());
    }

    #[test]
    fn test_parse_truncated() {
        let err = parse_segments("m", "ParamEyeLOpen", &[0.0, 0.0, 1.0, 0.2, 0.3]).unwrap_err();
        match err {
            PuppetError::MotionParse { motion, parameter, .. } => {
                assert_eq!(motion, "m");
                assert_eq!(parameter, "ParamEyeLOpen");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parse_segments("m", "p", &[0.0]).is_err());
        assert!(parse_segments("m", "p", &[0.0, 0.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_parse_unknown_tag() {
        assert!(parse_segments("m", "p", &[0.0, 0.0, 2.0, 1.0, 1.0]).is_err());
        assert!(parse_segments("m", "p", &[0.0, 0.0, 0.5, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_parse_time_going_backwards() {
        assert!(parse_segments("m", "p", &[1.0, 0.0, 0.0, 0.5, 1.0]).is_err());
    }

    #[test]
    fn test_load_motion_json() {
        let json = r#"{
            "Version": 3,
            "Meta": { "Duration": 1.0, "Fps": 30.0, "Loop": false, "CurveCount": 3 },
            "Curves": [
                { "Target": "Parameter", "Id": "ParamAngleX", "Segments": [0, 0, 0, 1, 30] },
                { "Target": "PartOpacity", "Id": "PartArmA", "Segments": [0, 1, 0, 1, 0] },
                { "Id": "ParamBodyAngleX", "Segments": [0, 5, 0, 1, 5] }
            ]
        }"#;
        let file = MotionFile::load_from_str(json, "tap", "TapBody", 2).unwrap();
        let motion = &file.motion;
        assert_eq!(motion.name, "tap");
        assert_eq!(motion.group, "TapBody");
        assert_eq!(motion.index, 2);
        assert_eq!(motion.fps, 30);
        assert_eq!(file.duration(), 1.0);
        assert_eq!(motion.track_count(), 2);
        assert!(!motion.contains_track("PartArmA"));
        assert_eq!(motion.sample("ParamBodyAngleX", 0.3), Some(5.0));
    }

    #[test]
    fn test_load_rejects_malformed_curve() {
        let json = r#"{
            "Meta": { "Duration": 1.0, "Fps": 30 },
            "Curves": [
                { "Target": "Parameter", "Id": "ParamAngleX", "Segments": [0, 0, 0, 1, 30] },
                { "Target": "Parameter", "Id": "ParamAngleY", "Segments": [0, 0, 1, 0.3] }
            ]
        }"#;
        let err = MotionFile::load_from_bytes(json.as_bytes(), "bad", "Idle", 0).unwrap_err();
        assert!(matches!(err, PuppetError::MotionParse { ref parameter, .. } if parameter == "ParamAngleY"));
    }
}
