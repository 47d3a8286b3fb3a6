//! 对象定义

use super::Argument;

/// 方法调用：方法名与有序参数
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Vec<Argument>,
}

/// 属性赋值
#[derive(Debug, Clone)]
pub struct PropertyAssignment {
    pub property: String,
    pub value: Argument,
}

/// 描述如何构造一个对象实例
///
/// 先以构造参数实例化目标类型，再按声明顺序执行方法调用，
/// 最后按声明顺序执行属性赋值。
#[derive(Debug, Clone)]
pub struct ObjectDefinition {
    identifier: String,
    type_name: String,
    constructor_arguments: Vec<Argument>,
    method_calls: Vec<MethodCall>,
    property_assignments: Vec<PropertyAssignment>,
}

impl ObjectDefinition {
    pub fn new(identifier: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            type_name: type_name.into(),
            constructor_arguments: Vec::new(),
            method_calls: Vec::new(),
            property_assignments: Vec::new(),
        }
    }

    pub fn with_constructor_argument(mut self, argument: impl Into<Argument>) -> Self {
        self.constructor_arguments.push(argument.into());
        self
    }

    pub fn with_method_call<I, A>(mut self, method: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.method_calls.push(MethodCall {
            method: method.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_property_assignment(
        mut self,
        property: impl Into<String>,
        value: impl Into<Argument>,
    ) -> Self {
        self.property_assignments.push(PropertyAssignment {
            property: property.into(),
            value: value.into(),
        });
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn constructor_arguments(&self) -> &[Argument] {
        &self.constructor_arguments
    }

    pub fn method_calls(&self) -> &[MethodCall] {
        &self.method_calls
    }

    pub fn property_assignments(&self) -> &[PropertyAssignment] {
        &self.property_assignments
    }

    /// 所有参数，按构造参数、方法参数、属性值的顺序
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.constructor_arguments
            .iter()
            .chain(self.method_calls.iter().flat_map(|c| c.arguments.iter()))
            .chain(self.property_assignments.iter().map(|p| &p.value))
    }
}
