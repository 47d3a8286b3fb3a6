//! 实例构建
//!
//! 构造函数 → 方法调用 → 属性赋值，均按声明顺序执行。
//! 任一步失败时实例被丢弃，不会发布到缓存。

use super::container::{Container, ResolutionStack};
use super::resolver::ReferenceResolver;
use crate::definition::ObjectDefinition;
use crate::errors::ContainerError;
use crate::types::Instance;

pub struct InstanceBuilder<'c> {
    container: &'c Container,
    resolver: ReferenceResolver<'c>,
}

impl<'c> InstanceBuilder<'c> {
    pub fn new(container: &'c Container) -> Self {
        Self {
            container,
            resolver: ReferenceResolver::new(container),
        }
    }

    /// 按对象定义构建一个新实例（每次调用都是新实例）
    pub fn build(&self, definition: &ObjectDefinition) -> Result<Instance, ContainerError> {
        self.build_with(definition, &mut ResolutionStack::default())
    }

    pub(crate) fn build_with(
        &self,
        definition: &ObjectDefinition,
        stack: &mut ResolutionStack,
    ) -> Result<Instance, ContainerError> {
        let id = definition.identifier();
        let type_name = definition.type_name();

        let args = self
            .resolver
            .resolve_arguments(id, definition.constructor_arguments(), stack)?;
        log::debug!("Constructing '{}' as {} with {} argument(s)", id, type_name, args.len());
        let instance = self
            .container
            .registry()
            .instantiate(type_name, args)
            .map_err(|e| ContainerError::instantiation(id, type_name, e))?;

        for call in definition.method_calls() {
            let args = self.resolver.resolve_arguments(id, &call.arguments, stack)?;
            instance
                .call(&call.method, args)
                .map_err(|e| ContainerError::instantiation(id, type_name, e))?;
        }

        for assignment in definition.property_assignments() {
            let value = self
                .resolver
                .resolve_argument_with(id, &assignment.value, stack)?;
            instance
                .set_property(&assignment.property, value)
                .map_err(|e| ContainerError::instantiation(id, type_name, e))?;
        }

        self.container.record_instance_built();
        Ok(instance)
    }
}
