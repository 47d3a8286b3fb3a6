//! 类型注册表
//!
//! 以类型名为键的构造函数表，取代运行时反射：
//! - 构造函数：`Fn(Arguments) -> Result<T, InvocationError>`
//! - 静态方法：`Fn(Arguments) -> Result<Value, InvocationError>`

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::InvocationError;
use crate::types::{Arguments, GenericObject, Instance, Object, Value};

/// 类型擦除的构造函数
pub trait ObjectFactory: Send + Sync {
    fn construct(&self, args: Arguments) -> Result<Box<dyn Object>, InvocationError>;
}

/// 函数式构造函数
struct FnObjectFactory<F, T> {
    factory_fn: F,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<F, T> ObjectFactory for FnObjectFactory<F, T>
where
    F: Fn(Arguments) -> Result<T, InvocationError> + Send + Sync + 'static,
    T: Object,
{
    fn construct(&self, args: Arguments) -> Result<Box<dyn Object>, InvocationError> {
        let object = (self.factory_fn)(args)?;
        Ok(Box::new(object))
    }
}

type StaticMethod = Arc<dyn Fn(Arguments) -> Result<Value, InvocationError> + Send + Sync>;

#[derive(Clone, Default)]
struct TypeDescriptor {
    constructor: Option<Arc<dyn ObjectFactory>>,
    static_methods: HashMap<String, StaticMethod>,
}

/// 类型注册表
#[derive(Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// 包含内置 `stdClass` 属性包的注册表
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(GenericObject::TYPE_NAME, |args: Arguments| {
            args.expect_at_most(0)?;
            Ok(GenericObject::new())
        });
        registry
    }

    fn descriptor_mut(&mut self, type_name: &str) -> &mut TypeDescriptor {
        let entry = self
            .types
            .entry(type_name.to_string())
            .or_insert_with(|| Arc::new(TypeDescriptor::default()));
        Arc::make_mut(entry)
    }

    /// 注册构造函数，重复注册会覆盖
    pub fn register<T, F>(&mut self, type_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(Arguments) -> Result<T, InvocationError> + Send + Sync + 'static,
        T: Object,
    {
        let type_name = type_name.into();
        self.descriptor_mut(&type_name).constructor = Some(Arc::new(FnObjectFactory {
            factory_fn: factory,
            _phantom: std::marker::PhantomData,
        }));
        self
    }

    /// 注册静态方法
    pub fn register_static<F>(
        &mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(Arguments) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        self.descriptor_mut(&type_name)
            .static_methods
            .insert(method.into(), Arc::new(f));
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// 构造实例
    pub fn instantiate(&self, type_name: &str, args: Arguments) -> Result<Instance, InvocationError> {
        let descriptor = self
            .types
            .get(type_name)
            .ok_or_else(|| InvocationError::UnknownType(type_name.to_string()))?;
        let constructor = descriptor
            .constructor
            .as_ref()
            .ok_or_else(|| InvocationError::NotConstructible(type_name.to_string()))?;
        let object = constructor.construct(args)?;
        Ok(Instance::new(type_name, object))
    }

    /// 调用静态方法
    pub fn call_static(
        &self,
        type_name: &str,
        method: &str,
        args: Arguments,
    ) -> Result<Value, InvocationError> {
        let descriptor = self
            .types
            .get(type_name)
            .ok_or_else(|| InvocationError::UnknownType(type_name.to_string()))?;
        let f = descriptor
            .static_methods
            .get(method)
            .ok_or_else(|| InvocationError::method_not_found(type_name, method))?;
        f(args)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
