//! 动作目录
//!
//! 启动时一次性加载，之后只读共享

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::Result;

use super::motion::Motion;
use super::motion_loader::MotionFile;

/// 动作目录
#[derive(Debug, Clone, Default)]
pub struct MotionCatalog {
    motions: Vec<Arc<Motion>>,
    name_to_index: HashMap<String, usize>,
    group_to_index: HashMap<(String, u32), usize>,
}

impl MotionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加动作，同名或同 (分组, 索引) 的动作保留先加入的那个
    pub fn add_motion(&mut self, motion: Motion) -> Arc<Motion> {
        let motion = Arc::new(motion);
        let index = self.motions.len();
        if self.name_to_index.contains_key(&motion.name) {
            log::warn!("动作 '{}' 重复，按名称查找时使用先加载的动作", motion.name);
        } else {
            self.name_to_index.insert(motion.name.clone(), index);
        }
        self.group_to_index
            .entry((motion.group.clone(), motion.index))
            .or_insert(index);
        self.motions.push(motion.clone());
        motion
    }

    /// 从 JSON 文本加载并添加动作（任一曲线格式错误则整个动作被拒绝）
    pub fn load_from_str(&mut self, text: &str, name: &str, group: &str, index: u32) -> Result<Arc<Motion>> {
        let file = MotionFile::load_from_str(text, name, group, index)?;
        Ok(self.add_motion(file.motion))
    }

    /// 从文件加载并添加动作
    pub fn load<P: AsRef<Path>>(&mut self, path: P, name: &str, group: &str, index: u32) -> Result<Arc<Motion>> {
        let file = MotionFile::load(path, name, group, index)?;
        Ok(self.add_motion(file.motion))
    }

    /// 按名称查找
    pub fn find(&self, name: &str) -> Option<Arc<Motion>> {
        self.name_to_index
            .get(name)
            .map(|&idx| self.motions[idx].clone())
    }

    /// 按 (分组, 索引) 查找
    pub fn find_in_group(&self, group: &str, index: u32) -> Option<Arc<Motion>> {
        self.group_to_index
            .get(&(group.to_string(), index))
            .map(|&idx| self.motions[idx].clone())
    }

    /// 分组内的所有动作
    pub fn group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Arc<Motion>> + 'a {
        self.motions.iter().filter(move |m| m.group == group)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Motion>> {
        self.motions.iter()
    }

    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }
}
