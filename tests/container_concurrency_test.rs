//! 容器并发解析测试

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use definition_interop::{
    ArrayDefinitionProvider, Container, ContainerError, Definition, GenericObject,
    ObjectDefinition, Reference, TypeRegistry, Value,
};
use futures::future;

/// 构造耗时的类型，记录构造次数
fn slow_registry(constructed: Arc<AtomicUsize>) -> TypeRegistry {
    let mut registry = common::registry();
    registry.register("Slow", move |_args| {
        thread::sleep(Duration::from_millis(20));
        constructed.fetch_add(1, Ordering::SeqCst);
        Ok(GenericObject::new())
    });
    registry
}

fn slow_container(constructed: Arc<AtomicUsize>) -> Container {
    common::init_test_logging();
    Container::builder()
        .provider(ArrayDefinitionProvider::from_definitions([
            ObjectDefinition::new("slow", "Slow"),
        ]))
        .registry(slow_registry(constructed))
        .build()
        .unwrap()
}

#[test]
fn test_concurrent_first_access_constructs_once() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let container = slow_container(constructed.clone());

    let results: Vec<Value> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| container.get("slow").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|v| v.same_instance(&results[0])));
    assert_eq!(container.get_stats().instances_built, 1);
}

#[tokio::test]
async fn test_concurrent_resolution_from_async_tasks() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let container = slow_container(constructed.clone());

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let container = container.clone();
            tokio::task::spawn_blocking(move || container.get("slow"))
        })
        .collect();

    let results = future::join_all(handles).await;
    let values: Vec<Value> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(values.iter().all(|v| v.same_instance(&values[0])));

    let stats = container.get_stats();
    assert_eq!(stats.total(), 10);
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 9);
    assert!(stats.hit_rate() > 0.8);
}

#[test]
fn test_concurrent_failure_is_shared_then_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let mut registry = common::registry();
    {
        let attempts = attempts.clone();
        registry.register("Fragile", move |_args| {
            thread::sleep(Duration::from_millis(20));
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(definition_interop::InvocationError::Failed("cold start".into()))
            } else {
                Ok(GenericObject::new())
            }
        });
    }
    let container = Container::builder()
        .provider(ArrayDefinitionProvider::from_definitions([
            ObjectDefinition::new("fragile", "Fragile"),
        ]))
        .registry(registry)
        .build()
        .unwrap();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| container.get("fragile")))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // 首次解析失败；与其同时等待的调用者收到同一个失败，之后到达的调用者重新解析
    assert!(results.iter().any(|r| r.is_err()));
    let value = container.get("fragile").unwrap();
    assert!(value.as_instance().unwrap().is::<GenericObject>());
    assert!(container.is_resolved("fragile"));
}

#[test]
fn test_cross_thread_cycle_is_reported() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let mut registry = slow_registry(constructed);
    registry.register("Pair", |_args| Ok(GenericObject::new()));

    // 先构造一个耗时的内联对象，使两个线程都在持有各自标识符时请求对方
    let pair = |id: &str, other: &str| {
        Definition::from(
            ObjectDefinition::new(id, "Pair")
                .with_property_assignment("warmup", ObjectDefinition::new("warmup", "Slow"))
                .with_property_assignment("other", Reference::new(other)),
        )
    };
    let container = Container::builder()
        .provider(ArrayDefinitionProvider::from_definitions([
            pair("a", "b"),
            pair("b", "a"),
        ]))
        .registry(registry)
        .build()
        .unwrap();

    let (a, b) = thread::scope(|scope| {
        let a = scope.spawn(|| container.get("a"));
        let b = scope.spawn(|| container.get("b"));
        (a.join().unwrap(), b.join().unwrap())
    });

    assert!(matches!(a, Err(ContainerError::CyclicReference { .. })));
    assert!(matches!(b, Err(ContainerError::CyclicReference { .. })));
    assert_eq!(container.resolved_count(), 0);

    // 只有检测到循环的线程计数，另一个线程收到的是共享的失败
    let stats = container.get_stats();
    assert_eq!(stats.cycles_detected, 1);
    assert_eq!(stats.failures, 2);
}

#[test]
fn test_clones_share_cache() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let container = slow_container(constructed.clone());
    let clone = container.clone();

    let first = container.get("slow").unwrap();
    let second = clone.get("slow").unwrap();
    assert!(first.same_instance(&second));
    assert!(clone.is_resolved("slow"));
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
}
