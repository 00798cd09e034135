//! 动作系统
//!
//! 曲线段 -> 参数轨道 -> 动作 -> 目录 / 播放控制器，以及节拍摆动

mod beat_sway;
mod bezier_curve;
mod catalog;
mod motion;
mod motion_loader;
mod motion_track;
mod playback;

pub use beat_sway::{swing_sigmoid, BeatSway, DEFAULT_BEATS_PER_CYCLE, FAST_BEAT_PERIOD};
pub use bezier_curve::{
    BezierCurve, Curve, CurveSegment, LinearSegment, BEZIER_MAX_ITERATIONS, BEZIER_TOLERANCE,
};
pub use catalog::MotionCatalog;
pub use motion::Motion;
pub use motion_loader::{parse_segments, MotionFile};
pub use motion_track::ParameterTrack;
pub use playback::{PlaybackController, PlaybackFrame, PlaybackState};
