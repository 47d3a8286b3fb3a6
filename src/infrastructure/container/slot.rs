//! 标识符状态表
//!
//! 每个标识符的状态：未解析（表中无条目）→ 解析中（`Resolving`）→ 已解析（`Resolved`）。
//! 首个调用者认领解析，并发调用者阻塞等待同一次解析的结果；
//! 解析失败时条目被移除，之后的调用可以重试。

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};

use crate::errors::{ContainerError, InvocationError};
use crate::types::Value;

type Outcome = Result<Value, ContainerError>;

/// 一次进行中的解析
pub(crate) struct Flight {
    id: String,
    owner: ThreadId,
    outcome: Mutex<Option<Outcome>>,
    ready: Condvar,
}

impl Flight {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            owner: thread::current().id(),
            outcome: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn finish(&self, outcome: Outcome) {
        let mut guard = self.outcome.lock();
        *guard = Some(outcome);
        self.ready.notify_all();
    }

    fn is_finished(&self) -> bool {
        self.outcome.lock().is_some()
    }

    fn wait(&self) -> Outcome {
        let mut guard = self.outcome.lock();
        loop {
            if let Some(outcome) = guard.as_ref() {
                return outcome.clone();
            }
            self.ready.wait(&mut guard);
        }
    }
}

enum Slot {
    Resolving(Arc<Flight>),
    Resolved(Value),
}

/// 认领结果
pub(crate) enum Claim<'t> {
    /// 已缓存的值
    Resolved(Value),
    /// 当前调用者负责解析
    Owner(OwnedFlight<'t>),
    /// 其他线程正在解析
    Wait(Arc<Flight>),
}

/// 解析拥有者持有的句柄
///
/// 未调用 [`OwnedFlight::complete`] 就被丢弃（例如构造函数 panic）时，
/// 以失败结束本次解析，等待者不会永久阻塞。
pub(crate) struct OwnedFlight<'t> {
    table: &'t SlotTable,
    flight: Arc<Flight>,
    completed: bool,
}

impl OwnedFlight<'_> {
    pub(crate) fn complete(mut self, outcome: Outcome) {
        self.completed = true;
        self.table.complete(&self.flight, outcome);
    }
}

impl Drop for OwnedFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            let id = self.flight.id.clone();
            self.table.complete(
                &self.flight,
                Err(ContainerError::instantiation(
                    id,
                    "<aborted>",
                    InvocationError::Failed("resolution aborted".to_string()),
                )),
            );
        }
    }
}

#[derive(Default)]
pub(crate) struct SlotTable {
    slots: DashMap<String, Slot>,
    /// 等待图：线程 → 正在等待的解析
    waits: Mutex<HashMap<ThreadId, Arc<Flight>>>,
}

impl SlotTable {
    pub(crate) fn claim(&self, id: &str) -> Claim<'_> {
        match self.slots.entry(id.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Resolved(value) => Claim::Resolved(value.clone()),
                Slot::Resolving(flight) => Claim::Wait(flight.clone()),
            },
            Entry::Vacant(entry) => {
                let flight = Arc::new(Flight::new(id));
                entry.insert(Slot::Resolving(flight.clone()));
                Claim::Owner(OwnedFlight {
                    table: self,
                    flight,
                    completed: false,
                })
            }
        }
    }

    /// 发布解析结果并唤醒所有等待者
    fn complete(&self, flight: &Arc<Flight>, outcome: Outcome) {
        match &outcome {
            Ok(value) => {
                self.slots
                    .insert(flight.id.clone(), Slot::Resolved(value.clone()));
            }
            Err(_) => {
                self.slots.remove_if(&flight.id, |_, slot| {
                    matches!(slot, Slot::Resolving(current) if Arc::ptr_eq(current, flight))
                });
            }
        }
        flight.finish(outcome);
    }

    /// 等待其他线程的解析结果
    ///
    /// 等待前沿着 "解析拥有者 → 其等待的解析" 检查等待图，
    /// 回到当前线程即为跨线程循环引用，此时返回 `Err(chain)`。
    /// 被等待的解析所产生的失败（包括其他线程检测到的循环）原样放在 `Ok` 中转交。
    pub(crate) fn wait(&self, flight: &Arc<Flight>) -> Result<Outcome, Vec<String>> {
        let me = thread::current().id();
        {
            let mut waits = self.waits.lock();
            // 已完成的解析无需等待，其拥有者之后的等待边与本线程无关
            if !flight.is_finished() {
                let mut chain = vec![flight.id.clone()];
                let mut owner = flight.owner;
                loop {
                    if owner == me {
                        chain.push(flight.id.clone());
                        return Err(chain);
                    }
                    match waits.get(&owner) {
                        // 已完成的解析不再构成等待边
                        Some(next) if !next.is_finished() => {
                            chain.push(next.id.clone());
                            owner = next.owner;
                        }
                        _ => break,
                    }
                }
                waits.insert(me, flight.clone());
            }
        }

        let outcome = flight.wait();
        self.waits.lock().remove(&me);
        Ok(outcome)
    }

    pub(crate) fn is_resolved(&self, id: &str) -> bool {
        self.slots
            .get(id)
            .map(|slot| matches!(*slot, Slot::Resolved(_)))
            .unwrap_or(false)
    }

    pub(crate) fn resolved_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Resolved(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_complete_then_hit() {
        let table = SlotTable::default();
        let owned = match table.claim("a") {
            Claim::Owner(owned) => owned,
            _ => panic!("first claim must own the flight"),
        };
        assert!(!table.is_resolved("a"));

        owned.complete(Ok(Value::Int(1)));

        assert!(table.is_resolved("a"));
        assert!(matches!(table.claim("a"), Claim::Resolved(Value::Int(1))));
        assert_eq!(table.resolved_count(), 1);
    }

    #[test]
    fn test_failure_clears_slot() {
        let table = SlotTable::default();
        let Claim::Owner(owned) = table.claim("a") else {
            panic!("first claim must own the flight");
        };
        owned.complete(Err(ContainerError::not_found("b")));

        assert!(!table.is_resolved("a"));
        assert!(matches!(table.claim("a"), Claim::Owner(_)));
    }

    #[test]
    fn test_waiter_receives_outcome() {
        let table = Arc::new(SlotTable::default());
        let Claim::Owner(owned) = table.claim("a") else {
            panic!("first claim must own the flight");
        };

        let waiter = {
            let table = table.clone();
            thread::spawn(move || match table.claim("a") {
                Claim::Wait(flight) => table.wait(&flight).unwrap(),
                Claim::Resolved(value) => Ok(value),
                Claim::Owner(_) => panic!("slot already claimed"),
            })
        };

        owned.complete(Ok(Value::from("done")));
        assert_eq!(waiter.join().unwrap(), Ok(Value::from("done")));
    }

    #[test]
    fn test_dropped_owner_fails_flight() {
        let table = SlotTable::default();
        let Claim::Owner(owned) = table.claim("a") else {
            panic!("first claim must own the flight");
        };
        let flight = owned.flight.clone();
        drop(owned);

        assert!(matches!(
            flight.wait(),
            Err(ContainerError::Instantiation { .. })
        ));
        assert!(matches!(table.claim("a"), Claim::Owner(_)));
    }

    #[test]
    fn test_waiting_on_own_flight_is_cycle() {
        let table = SlotTable::default();
        let Claim::Owner(owned) = table.claim("a") else {
            panic!("first claim must own the flight");
        };
        assert_eq!(
            table.wait(&owned.flight).unwrap_err(),
            vec!["a".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn test_finished_flight_ignores_owner_wait_edges() {
        let table = SlotTable::default();
        let Claim::Owner(mine) = table.claim("x") else {
            panic!("first claim must own the flight");
        };

        // 另一个线程解析完 "y"，随后开始等待当前线程持有的 "x"
        let theirs = thread::scope(|scope| {
            scope
                .spawn(|| {
                    let Claim::Owner(owned) = table.claim("y") else {
                        panic!("first claim must own the flight");
                    };
                    let flight = owned.flight.clone();
                    owned.complete(Ok(Value::from("y")));
                    flight
                })
                .join()
                .unwrap()
        });
        table.waits.lock().insert(theirs.owner, mine.flight.clone());

        assert_eq!(table.wait(&theirs), Ok(Ok(Value::from("y"))));
        assert!(!table.waits.lock().contains_key(&thread::current().id()));
        mine.complete(Ok(Value::from("x")));
    }
}
