//! 定义互操作引擎
//!
//! 把声明式的对象图定义（对象、参数、别名、工厂调用）解析为实例，
//! 并附带一组容器兼容性场景测试。

pub mod config;
pub mod definition;
pub mod errors;
pub mod infrastructure;
pub mod logging;
pub mod types;

pub use config::{EngineConfig, ValidationConfig};
pub use definition::{
    AliasDefinition, Argument, Definition, DefinitionExtension, Factory, FactoryCallDefinition,
    ObjectDefinition, ParameterDefinition, Reference,
};
pub use errors::{ConfigError, ContainerError, InvocationError};
pub use infrastructure::{
    ArrayDefinitionProvider, Container, ContainerBuilder, ContainerInterface, ContainerStats,
    DefinitionProvider, TypeRegistry,
};
pub use types::{Arguments, GenericObject, Instance, Object, Value, ValueMap};
