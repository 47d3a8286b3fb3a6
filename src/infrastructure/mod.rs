//! 基础设施层
//!
//! 定义解析引擎的具体实现：
//! - 定义提供者与类型注册表
//! - 引用解析与实例构建
//! - 带缓存的解析容器
//! - 构建时校验

pub mod container;
pub mod instantiator;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod validation;

pub use container::{Container, ContainerBuilder, ContainerInterface, ContainerStats};
pub use instantiator::InstanceBuilder;
pub use provider::{ArrayDefinitionProvider, DefinitionProvider};
pub use registry::{ObjectFactory, TypeRegistry};
pub use resolver::ReferenceResolver;
pub use validation::Validator;
