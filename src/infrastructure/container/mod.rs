//! 定义解析容器
//!
//! 按标识符解析定义并缓存结果：
//! - 对象、参数、别名、工厂调用四种定义
//! - 每个标识符只解析一次（并发调用者共享同一次解析）
//! - 循环引用检测
//! - 解析失败不缓存，之后可以重试

mod slot;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::definition::{Definition, Factory, FactoryCallDefinition};
use crate::errors::{ContainerError, InvocationError};
use crate::logging::OperationTimer;
use crate::types::{Arguments, Object, Value};

use super::instantiator::InstanceBuilder;
use super::provider::{ArrayDefinitionProvider, DefinitionProvider};
use super::registry::TypeRegistry;
use super::resolver::ReferenceResolver;
use super::validation::Validator;
use slot::{Claim, SlotTable};

/// 外部调用方使用的最小容器接口
pub trait ContainerInterface: Send + Sync {
    /// 解析标识符
    fn get(&self, id: &str) -> Result<Value, ContainerError>;

    /// 标识符是否有定义（不触发解析）
    fn has(&self, id: &str) -> bool;
}

/// 当前解析链上的标识符
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    ids: Vec<String>,
}

impl ResolutionStack {
    fn push(&mut self, id: &str) {
        self.ids.push(id.to_string());
    }

    fn pop(&mut self) {
        self.ids.pop();
    }

    /// 若 `id` 已在链上，返回从它开始并回到它的链条
    fn cycle(&self, id: &str) -> Option<Vec<String>> {
        let start = self.ids.iter().position(|entry| entry == id)?;
        let mut chain = self.ids[start..].to_vec();
        chain.push(id.to_string());
        Some(chain)
    }
}

/// 内部统计信息（原子计数器）
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    instances_built: AtomicUsize,
    cycles_detected: AtomicUsize,
    failures: AtomicUsize,
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub instances_built: usize,
    pub cycles_detected: usize,
    pub failures: usize,
}

impl ContainerStats {
    /// 获取总解析次数
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total() as f64
        }
    }
}

struct ContainerInner {
    provider: Box<dyn DefinitionProvider>,
    registry: TypeRegistry,
    config: EngineConfig,
    slots: SlotTable,
    stats: InnerStats,
}

/// 定义解析容器
///
/// 克隆开销很小，克隆体共享同一份缓存。
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// 使用默认类型注册表创建容器，不做提前校验
    pub fn new(provider: impl DefinitionProvider + 'static) -> Self {
        ContainerBuilder::new().provider(provider).build_lazy()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 解析标识符
    ///
    /// 同一标识符（直接或经由别名）总是返回同一个值；对象值是同一个实例。
    pub fn get(&self, id: &str) -> Result<Value, ContainerError> {
        let mut stack = ResolutionStack::default();
        let result = self.resolve_entry(id, &mut stack);
        if let Err(e) = &result {
            self.inner.stats.failures.fetch_add(1, Ordering::Relaxed);
            log::debug!("Resolution of '{}' failed: {}", id, e);
        }
        result
    }

    pub fn has(&self, id: &str) -> bool {
        self.inner.provider.has(id)
    }

    /// 标识符是否已解析并缓存
    pub fn is_resolved(&self, id: &str) -> bool {
        self.inner.slots.is_resolved(id)
    }

    /// 已缓存的标识符数量
    pub fn resolved_count(&self) -> usize {
        self.inner.slots.resolved_count()
    }

    /// 按当前配置校验全部定义
    pub fn validate(&self) -> Result<(), ContainerError> {
        Validator::new(
            self.inner.provider.as_ref(),
            &self.inner.registry,
            &self.inner.config.validation,
        )
        .validate()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// 获取容器统计信息
    pub fn get_stats(&self) -> ContainerStats {
        let stats = &self.inner.stats;
        ContainerStats {
            total_resolutions: stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: stats.cache_misses.load(Ordering::Relaxed),
            instances_built: stats.instances_built.load(Ordering::Relaxed),
            cycles_detected: stats.cycles_detected.load(Ordering::Relaxed),
            failures: stats.failures.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_instance_built(&self) {
        self.inner
            .stats
            .instances_built
            .fetch_add(1, Ordering::Relaxed);
    }

    /// 解析一个提供者条目：缓存命中、等待其他线程，或由当前调用者解析
    pub(crate) fn resolve_entry(
        &self,
        id: &str,
        stack: &mut ResolutionStack,
    ) -> Result<Value, ContainerError> {
        let stats = &self.inner.stats;
        stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        if let Some(chain) = stack.cycle(id) {
            return Err(self.cycle_detected(chain));
        }
        let definition = self.inner.provider.get(id)?;

        match self.inner.slots.claim(id) {
            Claim::Resolved(value) => {
                stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                log::trace!("Cache hit for '{}'", id);
                Ok(value)
            }
            Claim::Wait(flight) => {
                stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                log::debug!("Waiting for in-flight resolution of '{}'", id);
                // 共享的失败已由拥有者记录，只统计本线程检测到的循环
                match self.inner.slots.wait(&flight) {
                    Ok(outcome) => outcome,
                    Err(chain) => Err(self.cycle_detected(chain)),
                }
            }
            Claim::Owner(owned) => {
                stats.cache_misses.fetch_add(1, Ordering::Relaxed);
                log::debug!("Resolving '{}' ({})", id, definition.kind());
                stack.push(id);
                let outcome = self.produce(definition, stack);
                stack.pop();
                owned.complete(outcome.clone());
                outcome
            }
        }
    }

    fn cycle_detected(&self, chain: Vec<String>) -> ContainerError {
        self.inner
            .stats
            .cycles_detected
            .fetch_add(1, Ordering::Relaxed);
        let err = ContainerError::CyclicReference { chain };
        log::warn!("{}", err);
        err
    }

    /// 按定义种类产生值，不读写缓存
    pub(crate) fn produce(
        &self,
        definition: &Definition,
        stack: &mut ResolutionStack,
    ) -> Result<Value, ContainerError> {
        match definition {
            Definition::Object(object) => InstanceBuilder::new(self)
                .build_with(object, stack)
                .map(Value::Object),
            Definition::Parameter(parameter) => Ok(parameter.value().clone()),
            Definition::Alias(alias) => self.resolve_entry(alias.target(), stack),
            Definition::FactoryCall(call) => self.call_factory(call, stack),
            Definition::Extension(extension) => Err(ContainerError::UnsupportedDefinition {
                id: extension.identifier().to_string(),
                kind: extension.kind().to_string(),
            }),
        }
    }

    fn call_factory(
        &self,
        call: &FactoryCallDefinition,
        stack: &mut ResolutionStack,
    ) -> Result<Value, ContainerError> {
        let id = call.identifier();
        let resolver = ReferenceResolver::new(self);
        match call.factory() {
            Factory::Service(reference) => {
                let factory = resolver.resolve_with(reference, stack)?;
                let instance = factory.as_instance().ok_or_else(|| {
                    ContainerError::invalid_argument(
                        id,
                        format!(
                            "factory {} resolved to {} instead of an object",
                            reference,
                            factory.kind()
                        ),
                    )
                })?;
                let args = resolver.resolve_arguments(id, call.arguments(), stack)?;
                log::debug!("Calling {}::{} for '{}'", instance.type_name(), call.method(), id);
                instance
                    .call(call.method(), args)
                    .map_err(|e| ContainerError::instantiation(id, instance.type_name(), e))
            }
            Factory::Static(type_name) => {
                let args = resolver.resolve_arguments(id, call.arguments(), stack)?;
                log::debug!("Calling static {}::{} for '{}'", type_name, call.method(), id);
                self.inner
                    .registry
                    .call_static(type_name, call.method(), args)
                    .map_err(|e| ContainerError::instantiation(id, type_name.as_str(), e))
            }
        }
    }
}

impl ContainerInterface for Container {
    fn get(&self, id: &str) -> Result<Value, ContainerError> {
        Container::get(self, id)
    }

    fn has(&self, id: &str) -> bool {
        Container::has(self, id)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.inner.provider.identifiers().len())
            .field("resolved", &self.resolved_count())
            .field("registry", &self.inner.registry)
            .finish()
    }
}

/// 容器构建器
pub struct ContainerBuilder {
    provider: Option<Box<dyn DefinitionProvider>>,
    registry: TypeRegistry,
    config: EngineConfig,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            registry: TypeRegistry::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn provider(mut self, provider: impl DefinitionProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// 在当前注册表上注册构造函数
    pub fn register_type<T, F>(mut self, type_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<T, InvocationError> + Send + Sync + 'static,
        T: Object,
    {
        self.registry.register(type_name, factory);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 构建容器；`validation.on_build` 开启时先校验全部定义
    pub fn build(self) -> Result<Container, ContainerError> {
        let container = self.build_lazy();
        if container.config().validation.on_build {
            let timer = OperationTimer::new("validate_definitions");
            container.validate()?;
            timer.finish();
        }
        log::debug!("Built {:?}", container);
        Ok(container)
    }

    /// 构建容器，跳过校验
    pub fn build_lazy(self) -> Container {
        let provider = self
            .provider
            .unwrap_or_else(|| Box::new(ArrayDefinitionProvider::default()));
        Container {
            inner: Arc::new(ContainerInner {
                provider,
                registry: self.registry,
                config: self.config,
                slots: SlotTable::default(),
                stats: InnerStats::default(),
            }),
        }
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
