//! 事件（Event）标记与运行时类型标识
//!
//! - `Event`：所有事件载荷需要实现的零方法标记 trait；
//! - `EventType`：事件类型的运行时标识（`TypeId` + 类型名），亦可表示“全部事件”能力本身；
//! - `AnyEvent`：类型擦除后的事件视图，供按运行时类型分发。
//!
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// 事件标记 trait
///
/// 事件在 `fire` 时以引用传入，分发结束后不会被总线持有。
/// 通常通过 `#[derive(Event)]` 实现：
///
/// ```
/// use eventbus::Event;
///
/// struct MessageEvent(String);
/// impl Event for MessageEvent {}
/// ```
pub trait Event: Any + Send + Sync {}

/// 事件类型的运行时标识，仅按 `TypeId` 比较
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    /// “全部事件”能力：接受该类型的处理器会收到每一个事件
    pub fn any() -> Self {
        Self {
            id: TypeId::of::<dyn AnyEvent>(),
            name: "dyn Event",
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_any(&self) -> bool {
        self.id == TypeId::of::<dyn AnyEvent>()
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventType({})", self.name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 类型擦除的事件视图，对所有 `Event` 自动实现
pub trait AnyEvent: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    /// 事件的运行时（具体）类型
    fn event_type(&self) -> EventType;
}

impl<E: Event> AnyEvent for E {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn event_type(&self) -> EventType {
        EventType::of::<E>()
    }
}

impl dyn AnyEvent {
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }

    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }
}
