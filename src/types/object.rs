//! 目标类型能力接口
//!
//! 引擎只通过名称与目标类型交互：构造、调用方法、设置属性。
//! 具体类型实现 [`Object`]，并在 [`TypeRegistry`](crate::infrastructure::TypeRegistry)
//! 中以类型名注册构造函数。

use std::fmt;
use std::sync::Arc;

use downcast_rs::{impl_downcast, DowncastSync};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::value::{Value, ValueMap};
use crate::errors::InvocationError;

/// 可由容器构造和操作的对象
pub trait Object: DowncastSync + fmt::Debug {
    /// 按名称调用方法
    fn call(&mut self, method: &str, _args: Arguments) -> Result<Value, InvocationError> {
        Err(InvocationError::method_not_found(
            std::any::type_name::<Self>(),
            method,
        ))
    }

    /// 按名称设置公开属性
    fn set_property(&mut self, name: &str, _value: Value) -> Result<(), InvocationError> {
        Err(InvocationError::property_not_found(
            std::any::type_name::<Self>(),
            name,
        ))
    }

    /// 读取公开属性
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }
}
impl_downcast!(sync Object);

/// 已解析的位置参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// 可选参数，缺省为 `Null`
    pub fn optional(&self, index: usize) -> Value {
        self.0.get(index).cloned().unwrap_or_default()
    }

    /// 必需参数
    pub fn required(&self, index: usize) -> Result<Value, InvocationError> {
        self.0
            .get(index)
            .cloned()
            .ok_or_else(|| InvocationError::Failed(format!("missing required argument #{}", index)))
    }

    /// 参数个数上限检查
    pub fn expect_at_most(&self, expected: usize) -> Result<(), InvocationError> {
        if self.0.len() > expected {
            return Err(InvocationError::Arity {
                expected,
                actual: self.0.len(),
            });
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

struct InstanceInner {
    type_name: String,
    object: RwLock<Box<dyn Object>>,
}

/// 共享实例句柄
///
/// 相等性是身份相等：只有指向同一次构造结果的句柄才相等。
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    pub fn new(type_name: impl Into<String>, object: Box<dyn Object>) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                type_name: type_name.into(),
                object: RwLock::new(object),
            }),
        }
    }

    pub fn from_object<T: Object>(type_name: impl Into<String>, object: T) -> Self {
        Self::new(type_name, Box::new(object))
    }

    /// 注册时使用的类型名
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn is<T: Object>(&self) -> bool {
        let guard = self.inner.object.read();
        let object: &dyn Object = &**guard;
        object.is::<T>()
    }

    /// 以具体类型只读访问实例
    pub fn with<T: Object, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.inner.object.read();
        let object: &dyn Object = &**guard;
        object.downcast_ref::<T>().map(f)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Box<dyn Object>> {
        self.inner.object.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Box<dyn Object>> {
        self.inner.object.write()
    }

    pub fn call(&self, method: &str, args: Arguments) -> Result<Value, InvocationError> {
        self.write().call(method, args)
    }

    pub fn set_property(&self, name: &str, value: Value) -> Result<(), InvocationError> {
        self.write().set_property(name, value)
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.read().property(name)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Instance::ptr_eq(self, other)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.inner.type_name)
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

/// 通用属性包对象，任意属性都可赋值和读取
#[derive(Debug, Default, Clone)]
pub struct GenericObject {
    properties: ValueMap,
}

impl GenericObject {
    /// 内置注册名
    pub const TYPE_NAME: &'static str = "stdClass";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn properties(&self) -> &ValueMap {
        &self.properties
    }
}

impl Object for GenericObject {
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), InvocationError> {
        self.properties.insert(name, value);
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        count: i64,
    }

    impl Object for Counter {
        fn call(&mut self, method: &str, args: Arguments) -> Result<Value, InvocationError> {
            match method {
                "increment" => {
                    self.count += args.optional(0).as_i64().unwrap_or(1);
                    Ok(Value::Int(self.count))
                }
                _ => Err(InvocationError::method_not_found("Counter", method)),
            }
        }
    }

    #[test]
    fn test_instance_identity() {
        let a = Instance::from_object("Counter", Counter { count: 0 });
        let b = a.clone();
        let c = Instance::from_object("Counter", Counter { count: 0 });

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(Value::Object(a.clone()).same_instance(&Value::Object(b)));
    }

    #[test]
    fn test_call_and_downcast() {
        let instance = Instance::from_object("Counter", Counter { count: 1 });
        let result = instance
            .call("increment", Arguments::new(vec![Value::Int(41)]))
            .unwrap();

        assert_eq!(result, Value::Int(42));
        assert!(instance.is::<Counter>());
        assert_eq!(instance.with(|c: &Counter| c.count), Some(42));
        assert_eq!(instance.with(|_: &GenericObject| ()), None);
    }

    #[test]
    fn test_default_capabilities_fail() {
        let instance = Instance::from_object("Counter", Counter { count: 0 });
        assert!(matches!(
            instance.call("missing", Arguments::default()),
            Err(InvocationError::MethodNotFound { .. })
        ));
        assert!(matches!(
            instance.set_property("count", Value::Int(1)),
            Err(InvocationError::PropertyNotFound { .. })
        ));
        assert_eq!(instance.property("count"), None);
    }

    #[test]
    fn test_generic_object_properties() {
        let instance = Instance::from_object(GenericObject::TYPE_NAME, GenericObject::new());
        instance.set_property("hello", "world".into()).unwrap();
        assert_eq!(instance.property("hello"), Some(Value::from("world")));
        assert_eq!(instance.type_name(), "stdClass");
    }

    #[test]
    fn test_arguments_helpers() {
        let args = Arguments::new(vec![Value::Int(1)]);
        assert_eq!(args.optional(3), Value::Null);
        assert!(args.required(1).is_err());
        assert!(args.expect_at_most(1).is_ok());
        assert_eq!(
            args.expect_at_most(0),
            Err(InvocationError::Arity {
                expected: 0,
                actual: 1
            })
        );
    }
}
