//! 值与对象类型

pub mod object;
pub mod value;

pub use object::{Arguments, GenericObject, Instance, Object};
pub use value::{Value, ValueMap};
