//! 物理参数绑定
//!
//! 输入参数加权求和得到根节点位移，驱动摆动链；
//! 链的水平摆动再按权重和符号分配给输出参数。

use glam::Vec2;

use crate::config::get_config;
use crate::ParameterMap;

use super::link_chain::LinkChain;

/// 单个参数绑定
#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    /// 参数 ID
    pub id: String,
    /// 权重（已归一化，0-1）
    pub weight: f32,
    /// 是否反转符号
    pub reflect: bool,
}

impl ParamBinding {
    pub fn new(id: impl Into<String>, weight: f32, reflect: bool) -> Self {
        Self {
            id: id.into(),
            weight,
            reflect,
        }
    }

    /// 从百分比权重（0-100）创建
    pub fn from_percent(id: impl Into<String>, weight_percent: f32, reflect: bool) -> Self {
        Self::new(id, weight_percent / 100.0, reflect)
    }

    /// 带符号的权重
    #[inline]
    pub fn signed_weight(&self) -> f32 {
        if self.reflect {
            -self.weight
        } else {
            self.weight
        }
    }
}

/// 物理设置：一组输入、一组输出和一条摆动链
#[derive(Debug, Clone)]
pub struct PhysicsBinding {
    pub id: String,
    pub name: String,
    pub inputs: Vec<ParamBinding>,
    pub outputs: Vec<ParamBinding>,
    chain: LinkChain,
}

impl PhysicsBinding {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        inputs: Vec<ParamBinding>,
        outputs: Vec<ParamBinding>,
        chain: LinkChain,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inputs,
            outputs,
            chain,
        }
    }

    pub fn chain(&self) -> &LinkChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut LinkChain {
        &mut self.chain
    }

    /// 输入参数加权求和（缺失参数按 0 处理）
    pub fn input_displacement(&self, params: &ParameterMap) -> f32 {
        self.inputs
            .iter()
            .map(|input| params.get(&input.id).copied().unwrap_or(0.0) * input.signed_weight())
            .sum()
    }

    /// 推进摆动链并计算输出参数
    ///
    /// `root_angle` 为根节点旋转角度（度），`external_force` 为叠加到每个链节的外力。
    pub fn compute_output(
        &mut self,
        params: &ParameterMap,
        delta_time: f32,
        root_angle: f32,
        external_force: Vec2,
    ) -> ParameterMap {
        let displacement = self.input_displacement(params);
        self.chain.step(
            delta_time,
            Vec2::new(displacement, 0.0),
            root_angle,
            external_force,
        );

        let delta = self.chain.horizontal_sway();
        self.outputs
            .iter()
            .map(|output| (output.id.clone(), delta * output.signed_weight()))
            .collect()
    }

    /// 拖拽惯性：F = -m * v / dt，转换为链的惯性重力
    pub fn apply_inertia(&mut self, velocity: Vec2, delta_time: f32) {
        let mass = get_config().inertia_mass;
        let force = if delta_time > 0.0 {
            -mass * velocity / delta_time
        } else {
            Vec2::ZERO
        };
        self.chain.set_inertial_force(force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::LinkVertex;

    const DT: f32 = 1.0 / 60.0;

    fn hair_binding() -> PhysicsBinding {
        let chain = LinkChain::new(vec![
            LinkVertex::new(0.0, 0.1, 1.0, 1.0),
            LinkVertex::new(1.0, 0.1, 1.0, 1.0),
        ])
        .unwrap()
        .with_environment(1.0, 0.01);
        PhysicsBinding::new(
            "PhysicsSetting1",
            "前发",
            vec![
                ParamBinding::from_percent("ParamAngleX", 60.0, false),
                ParamBinding::from_percent("ParamBodyAngleX", 40.0, true),
            ],
            vec![
                ParamBinding::from_percent("ParamHairFront", 100.0, false),
                ParamBinding::from_percent("ParamHairFrontMirror", 50.0, true),
            ],
            chain,
        )
    }

    #[test]
    fn test_input_displacement() {
        let binding = hair_binding();
        let mut params = ParameterMap::new();
        params.insert("ParamAngleX".to_string(), 10.0);
        params.insert("ParamBodyAngleX".to_string(), 5.0);
        assert!((binding.input_displacement(&params) - 4.0).abs() < 1e-5);

        // 缺失参数按 0 处理
        params.remove("ParamBodyAngleX");
        assert!((binding.input_displacement(&params) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_at_rest_outputs_zero() {
        let mut binding = hair_binding();
        let params = ParameterMap::new();
        let mut out = ParameterMap::new();
        for _ in 0..10 {
            out = binding.compute_output(&params, DT, 0.0, Vec2::ZERO);
        }
        assert_eq!(out.len(), 2);
        assert!(out["ParamHairFront"].abs() < 1e-4);
        assert!(out["ParamHairFrontMirror"].abs() < 1e-4);
    }

    #[test]
    fn test_output_weight_and_reflect() {
        let mut binding = hair_binding();
        let mut params = ParameterMap::new();
        for _ in 0..5 {
            binding.compute_output(&params, DT, 0.0, Vec2::ZERO);
        }
        params.insert("ParamAngleX".to_string(), 1.0 / 0.6);
        let out = binding.compute_output(&params, DT, 0.0, Vec2::ZERO);

        let sway = binding.chain().horizontal_sway();
        assert!(sway < 0.0);
        assert!((out["ParamHairFront"] - sway).abs() < 1e-5);
        assert!((out["ParamHairFrontMirror"] + 0.5 * sway).abs() < 1e-5);
    }

    #[test]
    fn test_root_angle_and_external_force_tilt_chain() {
        let params = ParameterMap::new();

        // 根节点旋转 90 度：重力转向 +X，链节随之旋转
        let mut binding = hair_binding();
        for _ in 0..5 {
            binding.compute_output(&params, DT, 0.0, Vec2::ZERO);
        }
        let out = binding.compute_output(&params, DT, 90.0, Vec2::ZERO);
        assert!(out["ParamHairFront"] > 0.9);
        assert!(out["ParamHairFrontMirror"] < -0.45);

        // 向 -X 的外力把链节推向左侧
        let mut binding = hair_binding();
        for _ in 0..5 {
            binding.compute_output(&params, DT, 0.0, Vec2::ZERO);
        }
        let out = binding.compute_output(&params, DT, 0.0, Vec2::new(-100.0, 0.0));
        assert!(out["ParamHairFront"] < -0.1);
    }

    #[test]
    fn test_apply_inertia_opposes_velocity() {
        let mut binding = hair_binding();
        binding.apply_inertia(Vec2::new(120.0, 0.0), DT);
        let g = binding.chain().gravity();
        assert!(g.x < 0.0 && g.y < 0.0);

        binding.apply_inertia(Vec2::new(120.0, 0.0), 0.0);
        assert!((binding.chain().gravity() - Vec2::NEG_Y).length() < 1e-6);
    }
}
