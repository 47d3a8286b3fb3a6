//! 定义提供者
//!
//! 按标识符提供定义的只读来源，在容器构造时整体交给容器。

use std::collections::HashMap;

use crate::definition::Definition;
use crate::errors::ContainerError;

/// 定义提供者接口
pub trait DefinitionProvider: Send + Sync {
    /// 查找定义，不存在时返回 `NotFound`
    fn get(&self, id: &str) -> Result<&Definition, ContainerError>;

    fn has(&self, id: &str) -> bool;

    /// 按声明顺序列出所有标识符
    fn identifiers(&self) -> Vec<&str>;
}

/// 基于有序数组的提供者
#[derive(Debug, Clone, Default)]
pub struct ArrayDefinitionProvider {
    entries: Vec<(String, Definition)>,
    index: HashMap<String, usize>,
}

impl ArrayDefinitionProvider {
    /// 以显式键构造；重复的键原位替换先前的定义
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Definition)>,
        K: Into<String>,
    {
        let mut provider = Self::default();
        for (key, definition) in entries {
            provider.insert(key, definition);
        }
        provider
    }

    /// 以定义自身的标识符为键
    pub fn from_definitions<I, D>(definitions: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Definition>,
    {
        Self::new(definitions.into_iter().map(|d| {
            let definition = d.into();
            (definition.identifier().to_string(), definition)
        }))
    }

    fn insert(&mut self, key: impl Into<String>, definition: Definition) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = definition,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, definition));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }
}

impl DefinitionProvider for ArrayDefinitionProvider {
    fn get(&self, id: &str) -> Result<&Definition, ContainerError> {
        self.index
            .get(id)
            .map(|&position| &self.entries[position].1)
            .ok_or_else(|| ContainerError::not_found(id))
    }

    fn has(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }
}
