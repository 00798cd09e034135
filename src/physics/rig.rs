//! 物理绑定集合
//!
//! 按设置 ID 索引的绑定数组。各条链互不引用，逐个独立推进。

use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;

use crate::config::get_config;
use crate::{ParameterMap, ParameterRange, Result};

use super::binding::PhysicsBinding;
use super::physics_loader::PhysicsFile;

/// 物理绑定集合
#[derive(Debug, Clone, Default)]
pub struct PhysicsRig {
    bindings: Vec<PhysicsBinding>,
    name_to_index: HashMap<String, usize>,
}

impl PhysicsRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 physics3.json 文本构建
    pub fn load_from_str(text: &str) -> Result<Self> {
        Ok(PhysicsFile::load_from_str(text)?.into_rig())
    }

    /// 从文件构建
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(PhysicsFile::load(path)?.into_rig())
    }

    /// 添加绑定，ID 重复时查找返回先加入的绑定
    pub fn add_binding(&mut self, binding: PhysicsBinding) {
        let index = self.bindings.len();
        self.name_to_index.entry(binding.id.clone()).or_insert(index);
        self.bindings.push(binding);
    }

    pub fn find(&self, id: &str) -> Option<&PhysicsBinding> {
        self.name_to_index.get(id).map(|&idx| &self.bindings[idx])
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut PhysicsBinding> {
        let idx = *self.name_to_index.get(id)?;
        self.bindings.get_mut(idx)
    }

    pub fn bindings(&self) -> &[PhysicsBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 推进所有绑定并收集输出
    ///
    /// 每个绑定先施加拖拽惯性再推进链，根节点角度（度）和外力对所有链相同。
    /// 已知范围的输出参数按 `(max - min) / parameter_span` 换算；
    /// 多个绑定写同一参数时后者覆盖前者。
    pub fn update(
        &mut self,
        params: &ParameterMap,
        ranges: &HashMap<String, ParameterRange>,
        drag_velocity: Vec2,
        root_angle: f32,
        external_force: Vec2,
        delta_time: f32,
    ) -> ParameterMap {
        let span = get_config().parameter_span;
        let mut output = ParameterMap::new();

        for binding in &mut self.bindings {
            binding.apply_inertia(drag_velocity, delta_time);
            let deltas = binding.compute_output(params, delta_time, root_angle, external_force);
            for (id, delta) in deltas {
                let value = match ranges.get(&id) {
                    Some(range) if span > 0.0 => delta * range.span() / span,
                    _ => delta,
                };
                output.insert(id, value);
            }
        }

        output
    }

    /// 重置所有链
    pub fn reset(&mut self) {
        for binding in &mut self.bindings {
            binding.chain_mut().reset();
        }
    }
}
