//! 曲线段 - 直线与三次贝塞尔
//!
//! 动作曲线由首尾相接的曲线段组成，每段覆盖一个时间区间 [t0, t1]。

use glam::Vec2;

use crate::{PuppetError, Result};

/// 贝塞尔反解的最大二分次数
pub const BEZIER_MAX_ITERATIONS: u32 = 100;
/// 贝塞尔反解的时间残差容差
pub const BEZIER_TOLERANCE: f32 = 1e-6;

/// 曲线 trait
pub trait Curve {
    /// 起始时间
    fn start_time(&self) -> f32;

    /// 结束时间
    fn end_time(&self) -> f32;

    /// 求指定时间的值，时间不在 [start, end] 内返回 OutOfDomain
    fn value(&self, t: f32) -> Result<f32>;

    /// 时间是否落在本段内（含端点）
    fn covers(&self, t: f32) -> bool {
        (self.start_time()..=self.end_time()).contains(&t)
    }
}

fn check_domain(t: f32, start: f32, end: f32) -> Result<()> {
    if (start..=end).contains(&t) {
        Ok(())
    } else {
        Err(PuppetError::OutOfDomain { time: t, start, end })
    }
}

/// 直线段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSegment {
    /// 起点 (时间, 值)
    pub p0: Vec2,
    /// 终点 (时间, 值)
    pub p1: Vec2,
}

impl LinearSegment {
    pub fn new(p0: Vec2, p1: Vec2) -> Self {
        Self { p0, p1 }
    }
}

impl Curve for LinearSegment {
    fn start_time(&self) -> f32 {
        self.p0.x
    }

    fn end_time(&self) -> f32 {
        self.p1.x
    }

    fn value(&self, t: f32) -> Result<f32> {
        check_domain(t, self.p0.x, self.p1.x)?;
        // 零长度段取起点值
        if self.p0.x == self.p1.x {
            return Ok(self.p0.y);
        }
        let ratio = (t - self.p0.x) / (self.p1.x - self.p0.x);
        Ok(self.p0.y + ratio * (self.p1.y - self.p0.y))
    }
}

/// 三次贝塞尔曲线段
///
/// 四个控制点的 x 分量是时间，y 分量是参数值。
/// 源数据只保证 x(k) 大致单调，因此用二分法反解 k 而不是求闭式根。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierCurve {
    /// 起点
    pub p0: Vec2,
    /// 控制点1
    pub c0: Vec2,
    /// 控制点2
    pub c1: Vec2,
    /// 终点
    pub p1: Vec2,
}

impl BezierCurve {
    pub fn new(p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2) -> Self {
        Self { p0, c0, c1, p1 }
    }

    /// 三次贝塞尔公式: B(k) = (1-k)³P₀ + 3(1-k)²kC₀ + 3(1-k)k²C₁ + k³P₁
    #[inline]
    fn point(&self, k: f32) -> Vec2 {
        let ik = 1.0 - k;
        self.p0 * ik.powi(3)
            + self.c0 * 3.0 * ik.powi(2) * k
            + self.c1 * 3.0 * ik * k.powi(2)
            + self.p1 * k.powi(3)
    }

    /// 二分查找使 x(k) == t 的 k
    fn solve_parameter(&self, t: f32) -> f32 {
        let mut low = 0.0_f32;
        let mut high = 1.0_f32;
        for _ in 0..BEZIER_MAX_ITERATIONS {
            let mid = (low + high) * 0.5;
            let current = self.point(mid).x;
            if (current - t).abs() < BEZIER_TOLERANCE {
                break;
            }
            if current < t {
                low = mid;
            } else {
                high = mid;
            }
        }
        (low + high) * 0.5
    }
}

impl Curve for BezierCurve {
    fn start_time(&self) -> f32 {
        self.p0.x
    }

    fn end_time(&self) -> f32 {
        self.p1.x
    }

    fn value(&self, t: f32) -> Result<f32> {
        check_domain(t, self.p0.x, self.p1.x)?;
        let k = self.solve_parameter(t);
        Ok(self.point(k).y)
    }
}

/// 曲线段（构造后不可变）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveSegment {
    Linear(LinearSegment),
    Bezier(BezierCurve),
}

impl CurveSegment {
    /// 直线段 (t0, v0) -> (t1, v1)
    pub fn linear(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        Self::Linear(LinearSegment::new(Vec2::new(t0, v0), Vec2::new(t1, v1)))
    }

    /// 贝塞尔段，c0 / c1 为 (时间, 值) 形式的控制点
    pub fn bezier(t0: f32, v0: f32, c0: Vec2, c1: Vec2, t1: f32, v1: f32) -> Self {
        Self::Bezier(BezierCurve::new(
            Vec2::new(t0, v0),
            c0,
            c1,
            Vec2::new(t1, v1),
        ))
    }

    /// 在本段内求值
    pub fn evaluate(&self, t: f32) -> Result<f32> {
        self.value(t)
    }
}

impl Curve for CurveSegment {
    fn start_time(&self) -> f32 {
        match self {
            Self::Linear(s) => s.start_time(),
            Self::Bezier(s) => s.start_time(),
        }
    }

    fn end_time(&self) -> f32 {
        match self {
            Self::Linear(s) => s.end_time(),
            Self::Bezier(s) => s.end_time(),
        }
    }

    fn value(&self, t: f32) -> Result<f32> {
        match self {
            Self::Linear(s) => s.value(t),
            Self::Bezier(s) => s.value(t),
        }
    }
}
