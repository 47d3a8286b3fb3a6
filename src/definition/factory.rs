//! 工厂调用定义

use super::{Argument, Reference};

/// 工厂来源
#[derive(Debug, Clone)]
pub enum Factory {
    /// 已解析的实例，在其上调用方法
    Service(Reference),
    /// 注册表中某类型的静态方法
    Static(String),
}

impl From<Reference> for Factory {
    fn from(reference: Reference) -> Self {
        Factory::Service(reference)
    }
}

/// 通过调用工厂方法产生值
#[derive(Debug, Clone)]
pub struct FactoryCallDefinition {
    identifier: String,
    factory: Factory,
    method: String,
    arguments: Vec<Argument>,
}

impl FactoryCallDefinition {
    pub fn new(
        identifier: impl Into<String>,
        factory: impl Into<Factory>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            factory: factory.into(),
            method: method.into(),
            arguments: Vec::new(),
        }
    }

    /// 静态工厂：`type_name::method(args)`
    pub fn new_static(
        identifier: impl Into<String>,
        type_name: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self::new(identifier, Factory::Static(type_name.into()), method)
    }

    pub fn with_argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}
