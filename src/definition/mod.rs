//! 定义模型
//!
//! 声明式地描述如何产生一个值：对象、参数、别名或工厂调用。
//! 定义在交给提供者之前构建完成，之后不再修改。

mod argument;
mod factory;
mod object;

use std::fmt;
use std::sync::Arc;

pub use argument::{Argument, OpaqueArgument, Reference};
pub use factory::{Factory, FactoryCallDefinition};
pub use object::{MethodCall, ObjectDefinition, PropertyAssignment};

use crate::types::Value;

/// 直接返回字面量的参数定义
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    identifier: String,
    value: Value,
}

impl ParameterDefinition {
    pub fn new(identifier: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            identifier: identifier.into(),
            value: value.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// 别名：解析结果与目标标识符是同一个实例
#[derive(Debug, Clone)]
pub struct AliasDefinition {
    identifier: String,
    target: String,
}

impl AliasDefinition {
    pub fn new(identifier: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            target: target.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// 本引擎未实现的定义种类
///
/// 第三方可以提供自己的定义种类；容器遇到它们时报告
/// [`ContainerError::UnsupportedDefinition`](crate::errors::ContainerError::UnsupportedDefinition)。
pub trait DefinitionExtension: Send + Sync + fmt::Debug {
    fn identifier(&self) -> &str;

    fn kind(&self) -> &str;
}

#[derive(Debug, Clone)]
pub enum Definition {
    Object(ObjectDefinition),
    Parameter(ParameterDefinition),
    Alias(AliasDefinition),
    FactoryCall(FactoryCallDefinition),
    Extension(Arc<dyn DefinitionExtension>),
}

impl Definition {
    pub fn identifier(&self) -> &str {
        match self {
            Definition::Object(d) => d.identifier(),
            Definition::Parameter(d) => d.identifier(),
            Definition::Alias(d) => d.identifier(),
            Definition::FactoryCall(d) => d.identifier(),
            Definition::Extension(d) => d.identifier(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Definition::Object(_) => "object",
            Definition::Parameter(_) => "parameter",
            Definition::Alias(_) => "alias",
            Definition::FactoryCall(_) => "factory_call",
            Definition::Extension(d) => d.kind(),
        }
    }

    pub fn extension(definition: impl DefinitionExtension + 'static) -> Self {
        Definition::Extension(Arc::new(definition))
    }
}

impl From<ObjectDefinition> for Definition {
    fn from(d: ObjectDefinition) -> Self {
        Definition::Object(d)
    }
}

impl From<ParameterDefinition> for Definition {
    fn from(d: ParameterDefinition) -> Self {
        Definition::Parameter(d)
    }
}

impl From<AliasDefinition> for Definition {
    fn from(d: AliasDefinition) -> Self {
        Definition::Alias(d)
    }
}

impl From<FactoryCallDefinition> for Definition {
    fn from(d: FactoryCallDefinition) -> Self {
        Definition::FactoryCall(d)
    }
}
