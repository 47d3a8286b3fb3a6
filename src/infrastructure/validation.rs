//! 定义校验
//!
//! 在容器构建时遍历全部定义（包括嵌套定义与结构化参数），
//! 尽早暴露无法解析的定义。按声明顺序返回第一个错误。

use super::provider::DefinitionProvider;
use super::registry::TypeRegistry;
use super::resolver::opaque_argument_error;
use crate::config::ValidationConfig;
use crate::definition::{Argument, Definition, Factory};
use crate::errors::{ContainerError, InvocationError};

pub struct Validator<'a> {
    provider: &'a dyn DefinitionProvider,
    registry: &'a TypeRegistry,
    config: &'a ValidationConfig,
}

impl<'a> Validator<'a> {
    pub fn new(
        provider: &'a dyn DefinitionProvider,
        registry: &'a TypeRegistry,
        config: &'a ValidationConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    pub fn validate(&self) -> Result<(), ContainerError> {
        let identifiers = self.provider.identifiers();
        for id in &identifiers {
            self.check_definition(self.provider.get(id)?)?;
        }
        log::debug!("Validated {} definition(s)", identifiers.len());
        Ok(())
    }

    fn check_definition(&self, definition: &Definition) -> Result<(), ContainerError> {
        match definition {
            Definition::Object(object) => {
                self.check_type(object.identifier(), object.type_name())?;
                object
                    .arguments()
                    .try_for_each(|argument| self.check_argument(object.identifier(), argument))
            }
            Definition::Parameter(_) => Ok(()),
            Definition::Alias(alias) => self.check_reference(alias.target()),
            Definition::FactoryCall(call) => {
                match call.factory() {
                    Factory::Service(reference) => self.check_reference(reference.target())?,
                    Factory::Static(type_name) => self.check_type(call.identifier(), type_name)?,
                }
                call.arguments()
                    .iter()
                    .try_for_each(|argument| self.check_argument(call.identifier(), argument))
            }
            Definition::Extension(extension) => Err(ContainerError::UnsupportedDefinition {
                id: extension.identifier().to_string(),
                kind: extension.kind().to_string(),
            }),
        }
    }

    fn check_argument(&self, owner: &str, argument: &Argument) -> Result<(), ContainerError> {
        match argument {
            Argument::Value(_) => Ok(()),
            Argument::Reference(reference) => self.check_reference(reference.target()),
            Argument::Definition(definition) => self.check_definition(definition),
            Argument::List(items) => items
                .iter()
                .try_for_each(|item| self.check_argument(owner, item)),
            Argument::Map(entries) => entries
                .iter()
                .try_for_each(|(_, item)| self.check_argument(owner, item)),
            Argument::Opaque(opaque) => Err(opaque_argument_error(owner, opaque)),
        }
    }

    fn check_reference(&self, target: &str) -> Result<(), ContainerError> {
        if self.config.strict_references && !self.provider.has(target) {
            return Err(ContainerError::not_found(target));
        }
        Ok(())
    }

    fn check_type(&self, id: &str, type_name: &str) -> Result<(), ContainerError> {
        if self.config.strict_types && !self.registry.contains(type_name) {
            return Err(ContainerError::instantiation(
                id,
                type_name,
                InvocationError::UnknownType(type_name.to_string()),
            ));
        }
        Ok(())
    }
}
