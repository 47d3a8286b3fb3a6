//! 错误类型
//!
//! 容器解析、目标类型调用以及配置加载各自拥有独立的错误枚举。

use thiserror::Error;

/// 容器解析错误
///
/// 需要 `Clone`：同一标识符的并发等待者会收到同一个失败结果。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContainerError {
    /// 标识符不存在于定义提供者中
    #[error("Definition '{id}' not found")]
    NotFound { id: String },

    /// 标识符在解析过程中被重新进入
    #[error("Cyclic reference detected: {}", .chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    /// 引擎无法识别的定义种类
    #[error("Unsupported definition '{id}' of kind '{kind}'")]
    UnsupportedDefinition { id: String, kind: String },

    /// 参数既不是字面量、引用，也不是嵌套定义
    #[error("Invalid argument in definition '{id}': {reason}")]
    InvalidArgument { id: String, reason: String },

    /// 目标类型构造或方法调用失败
    #[error("Failed to instantiate '{id}' ({type_name}): {source}")]
    Instantiation {
        id: String,
        type_name: String,
        #[source]
        source: InvocationError,
    },
}

impl ContainerError {
    pub fn not_found(id: impl Into<String>) -> Self {
        ContainerError::NotFound { id: id.into() }
    }

    pub fn invalid_argument(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ContainerError::InvalidArgument {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn instantiation(
        id: impl Into<String>,
        type_name: impl Into<String>,
        source: InvocationError,
    ) -> Self {
        ContainerError::Instantiation {
            id: id.into(),
            type_name: type_name.into(),
            source,
        }
    }

    /// 错误对应的标识符（循环引用返回链条起点）
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ContainerError::NotFound { id }
            | ContainerError::UnsupportedDefinition { id, .. }
            | ContainerError::InvalidArgument { id, .. }
            | ContainerError::Instantiation { id, .. } => Some(id),
            ContainerError::CyclicReference { chain } => chain.first().map(String::as_str),
        }
    }
}

/// 目标类型上的构造、方法调用或属性赋值错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvocationError {
    #[error("Type '{0}' is not registered")]
    UnknownType(String),

    #[error("Type '{0}' has no registered constructor")]
    NotConstructible(String),

    #[error("Method '{method}' not found on '{type_name}'")]
    MethodNotFound { type_name: String, method: String },

    #[error("Property '{property}' not found on '{type_name}'")]
    PropertyNotFound { type_name: String, property: String },

    #[error("Expected at most {expected} argument(s), got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("Invalid value for '{name}': expected {expected}, got {actual}")]
    InvalidValue {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    Failed(String),
}

impl InvocationError {
    pub fn method_not_found(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        InvocationError::MethodNotFound {
            type_name: type_name.into(),
            method: method.into(),
        }
    }

    pub fn property_not_found(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        InvocationError::PropertyNotFound {
            type_name: type_name.into(),
            property: property.into(),
        }
    }
}

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}
