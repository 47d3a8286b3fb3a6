//! 引用解析
//!
//! 把定义中的参数转换为实际值。引用经由容器解析，
//! 与 `Container::get` 共享缓存和循环检测。

use super::container::{Container, ResolutionStack};
use crate::definition::{Argument, OpaqueArgument, Reference};
use crate::errors::ContainerError;
use crate::types::{Arguments, Value, ValueMap};

pub struct ReferenceResolver<'c> {
    container: &'c Container,
}

impl<'c> ReferenceResolver<'c> {
    pub fn new(container: &'c Container) -> Self {
        Self { container }
    }

    /// 解析引用指向的标识符
    pub fn resolve(&self, reference: &Reference) -> Result<Value, ContainerError> {
        self.resolve_with(reference, &mut ResolutionStack::default())
    }

    /// 解析属于 `owner` 定义的一个参数
    pub fn resolve_argument(&self, owner: &str, argument: &Argument) -> Result<Value, ContainerError> {
        self.resolve_argument_with(owner, argument, &mut ResolutionStack::default())
    }

    pub(crate) fn resolve_with(
        &self,
        reference: &Reference,
        stack: &mut ResolutionStack,
    ) -> Result<Value, ContainerError> {
        self.container.resolve_entry(reference.target(), stack)
    }

    /// 按声明顺序解析参数列表
    pub(crate) fn resolve_arguments(
        &self,
        owner: &str,
        arguments: &[Argument],
        stack: &mut ResolutionStack,
    ) -> Result<Arguments, ContainerError> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.resolve_argument_with(owner, argument, stack)?);
        }
        Ok(Arguments::new(values))
    }

    pub(crate) fn resolve_argument_with(
        &self,
        owner: &str,
        argument: &Argument,
        stack: &mut ResolutionStack,
    ) -> Result<Value, ContainerError> {
        match argument {
            Argument::Value(value) => Ok(value.clone()),
            Argument::Reference(reference) => self.resolve_with(reference, stack),
            // 嵌套定义就地产生，不进入缓存
            Argument::Definition(definition) => self.container.produce(definition, stack),
            Argument::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.resolve_argument_with(owner, item, stack)?);
                }
                Ok(Value::List(values))
            }
            Argument::Map(entries) => {
                let mut map = ValueMap::new();
                for (key, item) in entries {
                    map.insert(key.clone(), self.resolve_argument_with(owner, item, stack)?);
                }
                Ok(Value::Map(map))
            }
            Argument::Opaque(opaque) => Err(opaque_argument_error(owner, opaque)),
        }
    }
}

pub(crate) fn opaque_argument_error(owner: &str, opaque: &OpaqueArgument) -> ContainerError {
    ContainerError::invalid_argument(
        owner,
        format!(
            "cannot convert a value of type `{}`; expected a literal, a reference or a definition",
            opaque.type_name()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ObjectDefinition, ParameterDefinition};
    use crate::infrastructure::provider::ArrayDefinitionProvider;
    use crate::types::GenericObject;

    fn container() -> Container {
        Container::new(ArrayDefinitionProvider::from_definitions([
            crate::definition::Definition::from(ParameterDefinition::new("port", 8080)),
            ObjectDefinition::new("bag", GenericObject::TYPE_NAME).into(),
        ]))
    }

    #[test]
    fn test_structured_argument_resolves_nested_references() {
        let container = container();
        let resolver = ReferenceResolver::new(&container);
        let argument = Argument::map([
            ("port", Argument::reference("port")),
            ("hosts", Argument::list(["a", "b"])),
        ]);

        let value = resolver.resolve_argument("owner", &argument).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("port"), Some(&Value::Int(8080)));
        assert_eq!(
            map.get("hosts"),
            Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["port", "hosts"]);
    }

    #[test]
    fn test_reference_goes_through_cache() {
        let container = container();
        let resolver = ReferenceResolver::new(&container);
        let first = resolver.resolve(&Reference::new("bag")).unwrap();
        let second = container.get("bag").unwrap();
        assert!(first.same_instance(&second));
    }

    #[test]
    fn test_nested_definition_is_not_cached() {
        let container = container();
        let resolver = ReferenceResolver::new(&container);
        let inline = Argument::from(ObjectDefinition::new("bag", GenericObject::TYPE_NAME));

        let first = resolver.resolve_argument("owner", &inline).unwrap();
        let second = resolver.resolve_argument("owner", &inline).unwrap();
        assert!(!first.same_instance(&second));
        assert!(!container.is_resolved("bag"));
    }

    #[test]
    fn test_opaque_argument_is_rejected() {
        let container = container();
        let resolver = ReferenceResolver::new(&container);
        let err = resolver
            .resolve_argument("owner", &Argument::opaque(std::time::Duration::ZERO))
            .unwrap_err();
        match err {
            ContainerError::InvalidArgument { id, reason } => {
                assert_eq!(id, "owner");
                assert!(reason.contains("Duration"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
