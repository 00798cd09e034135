//! 参数轨道
//!
//! 存储单个参数的全部曲线段，并提供按时间查找和求值功能

use crate::{PuppetError, Result};

use super::bezier_curve::{Curve, CurveSegment};

/// 参数轨道
///
/// 曲线段按时间有序且首尾相接（第 i 段的结束时间等于第 i+1 段的开始时间）。
/// 端点处同时被两段覆盖时取前一段。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTrack {
    segments: Vec<CurveSegment>,
}

impl ParameterTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从有序曲线段创建轨道
    ///
    /// 调用方保证顺序，调试构建下检查。
    pub fn from_segments(segments: Vec<CurveSegment>) -> Self {
        debug_assert!(
            Self::is_ordered(&segments),
            "parameter track segments out of order"
        );
        Self { segments }
    }

    /// 追加曲线段
    ///
    /// 曲线段自身倒序，或起始时间早于前一段的结束时间时拒绝追加。
    pub fn push_segment(&mut self, segment: CurveSegment) -> Result<()> {
        let previous_end = self.end_time().unwrap_or(f32::NEG_INFINITY);
        let (start, end) = (segment.start_time(), segment.end_time());
        if end < start || start < previous_end {
            return Err(PuppetError::UnorderedSegment {
                start,
                end,
                previous_end,
            });
        }
        self.segments.push(segment);
        Ok(())
    }

    /// 曲线段是否满足二分查找要求的顺序
    pub fn is_ordered(segments: &[CurveSegment]) -> bool {
        segments.iter().all(|s| s.start_time() <= s.end_time())
            && segments
                .windows(2)
                .all(|w| w[0].end_time() <= w[1].start_time())
    }

    /// 所有曲线段
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// 查找覆盖指定时间的曲线段索引
    ///
    /// 曲线段有序，先二分定位第一个结束时间 >= t 的段，再确认其起始时间，
    /// 与顺序扫描取第一个匹配段的结果一致。
    pub fn find_segment(&self, t: f32) -> Option<usize> {
        let idx = self.segments.partition_point(|s| s.end_time() < t);
        self.segments
            .get(idx)
            .filter(|s| s.covers(t))
            .map(|_| idx)
    }

    /// 求指定时间的值，不在任何曲线段内返回 None
    pub fn sample(&self, t: f32) -> Option<f32> {
        let idx = self.find_segment(t)?;
        self.segments[idx].evaluate(t).ok()
    }

    /// 轨道起始时间
    pub fn start_time(&self) -> Option<f32> {
        self.segments.first().map(|s| s.start_time())
    }

    /// 轨道结束时间
    pub fn end_time(&self) -> Option<f32> {
        self.segments.last().map(|s| s.end_time())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
