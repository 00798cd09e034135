//! 次级运动物理
//!
//! 流程：加载 physics3.json → 每帧 [施加拖拽惯性 → 输入参数驱动根节点 → 推进摆动链 → 输出参数]

mod binding;
mod link_chain;
mod physics_loader;
mod rig;

pub use binding::{ParamBinding, PhysicsBinding};
pub use link_chain::{LinkChain, LinkVertex};
pub use physics_loader::PhysicsFile;
pub use rig::PhysicsRig;
