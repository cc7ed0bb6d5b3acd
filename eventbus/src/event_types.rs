//! 事件类型注册表（EventTypeRegistry）
//!
//! 记录事件类型之间的“父类型”关系。Rust 中没有继承，父类型以组合表达：
//! 子事件内嵌父事件，并通过投影函数 `fn(&Child) -> &Parent` 暴露出来。
//! 分发时从事件的具体类型出发按广度优先遍历全部祖先，得到每个类型下的事件视图。
//!
use crate::error::{EventBusError, Result};
use crate::event::{AnyEvent, Event, EventType};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// 子类型到父类型的投影
trait Upcast: Send + Sync {
    fn upcast<'a>(&self, child: &'a dyn Any) -> Option<&'a dyn Any>;
}

struct FieldUpcast<C, P> {
    project: fn(&C) -> &P,
}

impl<C: Event, P: Event> Upcast for FieldUpcast<C, P> {
    fn upcast<'a>(&self, child: &'a dyn Any) -> Option<&'a dyn Any> {
        child
            .downcast_ref::<C>()
            .map(|c| (self.project)(c) as &dyn Any)
    }
}

#[derive(Clone)]
struct Edge {
    parent: EventType,
    upcast: Arc<dyn Upcast>,
}

/// 某个类型下的事件视图
#[derive(Clone, Copy)]
pub(crate) struct EventView<'a> {
    pub event_type: EventType,
    pub value: &'a dyn Any,
}

#[derive(Clone, Default)]
pub(crate) struct EventTypeRegistry {
    parents: HashMap<TypeId, Vec<Edge>>,
}

impl EventTypeRegistry {
    /// 声明 `C` 的父类型为 `P`
    ///
    /// 拒绝自引用、重复声明与成环。
    pub(crate) fn declare<C: Event, P: Event>(&mut self, project: fn(&C) -> &P) -> Result<()> {
        let child = EventType::of::<C>();
        let parent = EventType::of::<P>();
        let reject = |reason: &str| EventBusError::InvalidEventHierarchy {
            child: child.name(),
            parent: parent.name(),
            reason: reason.to_string(),
        };

        if child == parent {
            return Err(reject("an event type cannot be its own supertype"));
        }
        if self.direct_parents(child).any(|p| p == parent) {
            return Err(reject("supertype already declared"));
        }
        if self.ancestors(parent).contains(&child) {
            return Err(reject("declaration would create a cycle"));
        }

        self.parents.entry(child.id()).or_default().push(Edge {
            parent,
            upcast: Arc::new(FieldUpcast { project }),
        });
        Ok(())
    }

    fn direct_parents(&self, ty: EventType) -> impl Iterator<Item = EventType> + '_ {
        self.parents
            .get(&ty.id())
            .into_iter()
            .flatten()
            .map(|e| e.parent)
    }

    /// `ty` 的全部祖先（不含自身）
    pub(crate) fn ancestors(&self, ty: EventType) -> Vec<EventType> {
        let mut seen = HashSet::from([ty]);
        let mut queue = VecDeque::from([ty]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            for parent in self.direct_parents(current) {
                if seen.insert(parent) {
                    out.push(parent);
                    queue.push_back(parent);
                }
            }
        }
        out
    }

    /// 解析事件在自身类型及全部祖先类型下的视图，自身在前，祖先按广度优先
    ///
    /// 菱形继承时同一祖先只出现一次（先到达的路径生效）。
    pub(crate) fn resolve<'a>(&self, event: &'a dyn AnyEvent) -> Vec<EventView<'a>> {
        let root = EventView {
            event_type: event.event_type(),
            value: event.as_any(),
        };
        let mut seen = HashSet::from([root.event_type]);
        let mut queue = VecDeque::from([root]);
        let mut out = Vec::new();

        while let Some(view) = queue.pop_front() {
            out.push(view);
            for edge in self.parents.get(&view.event_type.id()).into_iter().flatten() {
                if !seen.insert(edge.parent) {
                    continue;
                }
                if let Some(value) = edge.upcast.upcast(view.value) {
                    queue.push_back(EventView {
                        event_type: edge.parent,
                        value,
                    });
                }
            }
        }
        out
    }
}
