//! 兼容性测试共用的目标类型

#![allow(dead_code)]

use definition_interop::{Arguments, InvocationError, Object, TypeRegistry, Value};

pub const TEST_TYPE: &str = "Fixtures\\Test";
pub const TEST_FACTORY_TYPE: &str = "Fixtures\\TestFactory";

/// 两个构造参数，公开属性 `cArg1` / `cArg2`
#[derive(Debug, Default)]
pub struct Test {
    pub c_arg1: Value,
    pub c_arg2: Value,
}

impl Test {
    fn from_args(args: Arguments) -> Result<Self, InvocationError> {
        args.expect_at_most(2)?;
        Ok(Self {
            c_arg1: args.optional(0),
            c_arg2: args.optional(1),
        })
    }
}

impl Object for Test {
    fn call(&mut self, method: &str, args: Arguments) -> Result<Value, InvocationError> {
        match method {
            "setArg1" => {
                self.c_arg1 = args.required(0)?;
                Ok(Value::Null)
            }
            _ => Err(InvocationError::method_not_found(TEST_TYPE, method)),
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), InvocationError> {
        match name {
            "cArg1" => self.c_arg1 = value,
            "cArg2" => self.c_arg2 = value,
            _ => return Err(InvocationError::property_not_found(TEST_TYPE, name)),
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "cArg1" => Some(self.c_arg1.clone()),
            "cArg2" => Some(self.c_arg2.clone()),
            _ => None,
        }
    }
}

/// `getTest()` 返回以工厂构造参数为 `cArg1` 的新 `Test`
#[derive(Debug)]
pub struct TestFactory {
    arg: Value,
}

impl Object for TestFactory {
    fn call(&mut self, method: &str, args: Arguments) -> Result<Value, InvocationError> {
        match method {
            "getTest" => {
                args.expect_at_most(0)?;
                let test = Test {
                    c_arg1: self.arg.clone(),
                    c_arg2: Value::Null,
                };
                Ok(definition_interop::Instance::from_object(TEST_TYPE, test).into())
            }
            _ => Err(InvocationError::method_not_found(TEST_FACTORY_TYPE, method)),
        }
    }
}

/// 注册了测试类型的注册表
pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(TEST_TYPE, Test::from_args)
        .register(TEST_FACTORY_TYPE, |args: Arguments| {
            args.expect_at_most(1)?;
            Ok(TestFactory {
                arg: args.optional(0),
            })
        });
    registry
}

pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
