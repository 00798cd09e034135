//! 物理设置加载器
//!
//! 解析 physics3.json，按 PhysicsDictionary 的顺序校验每个设置。
//! 设置数量与 PhysicsSettingCount 不符时报错；
//! 单个设置与字典顺序不一致时警告并跳过，其余设置照常加载。

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{PuppetError, Result};

use super::binding::{ParamBinding, PhysicsBinding};
use super::link_chain::{LinkChain, LinkVertex};
use super::rig::PhysicsRig;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PhysicsJson {
    meta: PhysicsMetaJson,
    #[serde(default)]
    physics_settings: Vec<SettingJson>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PhysicsMetaJson {
    physics_setting_count: usize,
    #[serde(default)]
    physics_dictionary: Vec<DictionaryEntryJson>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DictionaryEntryJson {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SettingJson {
    id: String,
    #[serde(default)]
    input: Vec<InputJson>,
    #[serde(default)]
    output: Vec<OutputJson>,
    #[serde(default)]
    vertices: Vec<VertexJson>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TargetJson {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InputJson {
    source: TargetJson,
    weight: f32,
    #[serde(default)]
    reflect: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OutputJson {
    destination: TargetJson,
    weight: f32,
    #[serde(default)]
    reflect: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VertexJson {
    mobility: f32,
    delay: f32,
    acceleration: f32,
    radius: f32,
}

/// 物理设置文件
#[derive(Debug, Clone)]
pub struct PhysicsFile {
    pub bindings: Vec<PhysicsBinding>,
    /// 因顺序不一致等原因被跳过的设置 ID
    pub skipped: Vec<String>,
}

impl PhysicsFile {
    /// 从文件路径加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::load_from_str(&text)
    }

    /// 从字节切片加载
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Self> {
        let json: PhysicsJson = serde_json::from_slice(bytes)?;
        Self::from_json(json)
    }

    /// 从 JSON 文本加载
    pub fn load_from_str(text: &str) -> Result<Self> {
        let json: PhysicsJson = serde_json::from_str(text)?;
        Self::from_json(json)
    }

    fn from_json(json: PhysicsJson) -> Result<Self> {
        if json.physics_settings.len() != json.meta.physics_setting_count {
            log::error!(
                "PhysicsSettings 长度 ({}) 与 PhysicsSettingCount ({}) 不符",
                json.physics_settings.len(),
                json.meta.physics_setting_count
            );
            return Err(PuppetError::PhysicsParse(format!(
                "PhysicsSettingCount is {} but {} settings are present",
                json.meta.physics_setting_count,
                json.physics_settings.len()
            )));
        }

        let mut bindings = Vec::with_capacity(json.physics_settings.len());
        let mut skipped = Vec::new();

        for (index, setting) in json.physics_settings.into_iter().enumerate() {
            let Some(entry) = json
                .meta
                .physics_dictionary
                .get(index)
                .filter(|entry| entry.id == setting.id)
            else {
                log::warn!(
                    "物理设置 '{}' (第 {} 个) 与 PhysicsDictionary 顺序不一致，已跳过",
                    setting.id,
                    index
                );
                skipped.push(setting.id);
                continue;
            };

            let vertices = setting
                .vertices
                .iter()
                .map(|v| LinkVertex::new(v.radius, v.delay, v.acceleration, v.mobility))
                .collect();
            let chain = match LinkChain::new(vertices) {
                Ok(chain) => chain,
                Err(e) => {
                    log::warn!("物理设置 '{}' 的摆动链无效，已跳过: {}", setting.id, e);
                    skipped.push(setting.id);
                    continue;
                }
            };

            let inputs = setting
                .input
                .iter()
                .map(|i| ParamBinding::from_percent(i.source.id.as_str(), i.weight, i.reflect))
                .collect();
            let outputs = setting
                .output
                .iter()
                .map(|o| ParamBinding::from_percent(o.destination.id.as_str(), o.weight, o.reflect))
                .collect();

            bindings.push(PhysicsBinding::new(
                setting.id,
                entry.name.clone(),
                inputs,
                outputs,
                chain,
            ));
        }

        log::info!(
            "物理设置加载完成: {} 个绑定, {} 个跳过",
            bindings.len(),
            skipped.len()
        );

        Ok(Self { bindings, skipped })
    }

    /// 转换为运行时绑定集合
    pub fn into_rig(self) -> PhysicsRig {
        let mut rig = PhysicsRig::new();
        for binding in self.bindings {
            rig.add_binding(binding);
        }
        rig
    }
}
