//! 引用与参数

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::{Definition, ObjectDefinition};
use crate::types::{Value, ValueMap};

/// 按标识符指向另一个定义，使用前总会被解析
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    target: String,
}

impl Reference {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.target)
    }
}

/// 引擎无法转换的宿主值
#[derive(Clone)]
pub struct OpaqueArgument {
    type_name: &'static str,
    _value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueArgument {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            _value: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for OpaqueArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueArgument").field(&self.type_name).finish()
    }
}

/// 构造参数、方法参数或属性值
///
/// `List` 与 `Map` 是结构化字面量，其中的条目可以是引用或嵌套定义，
/// 解析时递归处理。
#[derive(Debug, Clone)]
pub enum Argument {
    Value(Value),
    Reference(Reference),
    Definition(Box<Definition>),
    List(Vec<Argument>),
    Map(Vec<(String, Argument)>),
    Opaque(OpaqueArgument),
}

impl Argument {
    pub fn reference(target: impl Into<String>) -> Self {
        Argument::Reference(Reference::new(target))
    }

    pub fn list<I, A>(items: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        Argument::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<String>,
        A: Into<Argument>,
    {
        Argument::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Argument::Opaque(OpaqueArgument::new(value))
    }

    /// 参数中直接出现的引用（不进入嵌套定义）
    pub fn references(&self) -> Vec<&Reference> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a Reference>) {
        match self {
            Argument::Reference(reference) => found.push(reference),
            Argument::List(items) => items.iter().for_each(|a| a.collect_references(found)),
            Argument::Map(entries) => entries
                .iter()
                .for_each(|(_, a)| a.collect_references(found)),
            Argument::Value(_) | Argument::Definition(_) | Argument::Opaque(_) => {}
        }
    }
}

impl From<Value> for Argument {
    fn from(v: Value) -> Self {
        Argument::Value(v)
    }
}

impl From<Reference> for Argument {
    fn from(v: Reference) -> Self {
        Argument::Reference(v)
    }
}

impl From<Definition> for Argument {
    fn from(v: Definition) -> Self {
        Argument::Definition(Box::new(v))
    }
}

impl From<ObjectDefinition> for Argument {
    fn from(v: ObjectDefinition) -> Self {
        Argument::Definition(Box::new(Definition::Object(v)))
    }
}

impl From<ValueMap> for Argument {
    fn from(v: ValueMap) -> Self {
        Argument::Value(Value::Map(v))
    }
}

macro_rules! literal_argument {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Argument {
                fn from(v: $ty) -> Self {
                    Argument::Value(Value::from(v))
                }
            }
        )*
    };
}

literal_argument!(bool, i32, i64, u32, f64, &str, String);
