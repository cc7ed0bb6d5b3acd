//! 监听器注册表（ListenerRegistry）
//!
//! 事件类型 → 按（优先级, 登记序号）排序的绑定列表。
//! 注册表以写时复制快照保存：分发在短暂读锁内克隆 `Arc<Snapshot>` 后无锁进行，
//! 变更在写锁内克隆、修改并整体替换，因此分发过程中的订阅/退订不会影响进行中的分发。
//!
use crate::error::{EventBusError, Result};
use crate::event::{Event, EventType};
use crate::event_types::EventTypeRegistry;
use crate::listener::{HandlerSpec, ListenerId, Priority};
use crate::strategy::{Executor, ExecutorFactory};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// 监听器对象的身份：（具体类型, 地址）
pub(crate) type ObjectKey = (TypeId, usize);

pub(crate) fn object_key<L: Any>(listener: &Arc<L>) -> ObjectKey {
    (TypeId::of::<L>(), Arc::as_ptr(listener) as usize)
}

/// 一个处理器的订阅绑定
pub(crate) struct Binding {
    pub listener: ListenerId,
    pub listener_name: &'static str,
    pub handler: &'static str,
    pub event_type: EventType,
    pub priority: Priority,
    pub seq: u64,
    pub executor: Arc<dyn Executor>,
}

#[derive(Clone)]
struct ListenerEntry {
    name: &'static str,
    event_types: Vec<EventType>,
    object: Option<ObjectKey>,
    // 订阅期间持有监听器的强引用
    _instance: Arc<dyn Any + Send + Sync>,
}

/// 注册表的不可变快照
#[derive(Clone, Default)]
pub(crate) struct Snapshot {
    slots: HashMap<EventType, Vec<Arc<Binding>>>,
    listeners: HashMap<ListenerId, ListenerEntry>,
    objects: HashMap<ObjectKey, ListenerId>,
    types: EventTypeRegistry,
    next_seq: u64,
    next_id: u64,
}

impl Snapshot {
    /// 接受 `ty` 的全部绑定（已排序）
    pub(crate) fn bindings(&self, ty: EventType) -> &[Arc<Binding>] {
        self.slots.get(&ty).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn types(&self) -> &EventTypeRegistry {
        &self.types
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn find_object(&self, key: ObjectKey) -> Option<ListenerId> {
        self.objects.get(&key).copied()
    }

    fn insert(&mut self, binding: Binding) {
        let slot = self.slots.entry(binding.event_type).or_default();
        let at = slot.partition_point(|b| (b.priority, b.seq) <= (binding.priority, binding.seq));
        slot.insert(at, Arc::new(binding));
    }

    fn remove(&mut self, id: ListenerId) -> Option<ListenerEntry> {
        let entry = self.listeners.remove(&id)?;
        if let Some(key) = entry.object {
            self.objects.remove(&key);
        }
        for ty in &entry.event_types {
            if let Some(slot) = self.slots.get_mut(ty) {
                slot.retain(|b| b.listener != id);
                if slot.is_empty() {
                    self.slots.remove(ty);
                }
            }
        }
        Some(entry)
    }
}

/// 待登记的监听器
pub(crate) struct Registration {
    pub name: &'static str,
    pub object: Option<ObjectKey>,
    pub instance: Arc<dyn Any + Send + Sync>,
    pub specs: Vec<HandlerSpec>,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    current: RwLock<Arc<Snapshot>>,
}

impl ListenerRegistry {
    pub(crate) fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// 在写锁内对快照副本执行修改；失败时保留原快照
    fn update<T>(&self, f: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let mut guard = self.current.write();
        let mut next = Snapshot::clone(&guard);
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }

    /// 登记监听器的全部处理器，要么全部成功，要么一个都不登记
    pub(crate) fn register(
        &self,
        registration: Registration,
        factory: &dyn ExecutorFactory,
    ) -> Result<ListenerId> {
        let Registration {
            name,
            object,
            instance,
            specs,
        } = registration;

        let id = self.update(|snap| {
            if object.is_some_and(|key| snap.objects.contains_key(&key)) {
                return Err(EventBusError::AlreadySubscribed { listener: name });
            }

            let mut bindings = Vec::with_capacity(specs.len());
            for spec in &specs {
                let executor = factory.create(&instance, spec).ok_or_else(|| {
                    EventBusError::invalid_listener(
                        name,
                        format!("handler '{}' cannot be bound to this listener", spec.name),
                    )
                })?;
                bindings.push((spec, executor));
            }

            snap.next_id += 1;
            let id = ListenerId::from_raw(snap.next_id);
            let mut event_types = Vec::new();
            for (spec, executor) in bindings {
                snap.next_seq += 1;
                if !event_types.contains(&spec.event_type) {
                    event_types.push(spec.event_type);
                }
                snap.insert(Binding {
                    listener: id,
                    listener_name: name,
                    handler: spec.name,
                    event_type: spec.event_type,
                    priority: spec.priority,
                    seq: snap.next_seq,
                    executor,
                });
            }

            if let Some(key) = object {
                snap.objects.insert(key, id);
            }
            snap.listeners.insert(
                id,
                ListenerEntry {
                    name,
                    event_types,
                    object,
                    _instance: instance,
                },
            );
            Ok(id)
        })?;

        tracing::debug!(listener = name, %id, handlers = specs.len(), "listener subscribed");
        Ok(id)
    }

    pub(crate) fn unregister(&self, id: ListenerId) -> Result<()> {
        let entry = self.update(|snap| {
            snap.remove(id).ok_or_else(|| EventBusError::NotSubscribed {
                listener: id.to_string(),
            })
        })?;

        tracing::debug!(listener = entry.name, %id, "listener unsubscribed");
        Ok(())
    }

    pub(crate) fn unregister_object(&self, key: ObjectKey, name: &'static str) -> Result<()> {
        let id = self.update(|snap| {
            let id = snap
                .find_object(key)
                .ok_or_else(|| EventBusError::NotSubscribed {
                    listener: name.to_string(),
                })?;
            snap.remove(id);
            Ok(id)
        })?;

        tracing::debug!(listener = name, %id, "listener unsubscribed");
        Ok(())
    }

    pub(crate) fn declare_supertype<C: Event, P: Event>(&self, project: fn(&C) -> &P) -> Result<()> {
        self.update(|snap| snap.types.declare(project))?;
        tracing::debug!(
            child = EventType::of::<C>().name(),
            parent = EventType::of::<P>().name(),
            "event supertype declared"
        );
        Ok(())
    }
}
