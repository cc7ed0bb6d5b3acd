//! 监听器（Listener）与处理器登记
//!
//! 监听器是调用方持有的对象，内含一个或多个被标记为订阅的处理方法。
//! Rust 没有运行时反射，处理器通过 `Listener::register` 显式登记：
//! 通常由 `#[listener]` 宏在监听器所在模块内生成，因此可以引用私有方法；
//! 也可以在订阅时通过 `EventBus::subscribe_with` 直接提供登记闭包。
//!
use crate::error::{EventBusError, Result};
use crate::event::{AnyEvent, Event, EventType};
use crate::strategy::{Executor, Invocation, compiled::DirectExecutor};
use std::any::{Any, TypeId, type_name};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 监听器：声明自身的全部处理器
///
/// ```
/// use eventbus::{Event, Handlers, Listener, Priority};
///
/// struct MessageEvent(String);
/// impl Event for MessageEvent {}
///
/// struct Printer;
///
/// impl Printer {
///     fn print(&self, event: &MessageEvent) {
///         println!("{}", event.0);
///     }
/// }
///
/// impl Listener for Printer {
///     fn register(handlers: &mut Handlers<Self>) {
///         handlers.handle::<MessageEvent, _, _>("print", Priority::Normal, Self::print);
///     }
/// }
/// ```
pub trait Listener: Sized + Send + Sync + 'static {
    fn register(handlers: &mut Handlers<Self>);
}

/// 一次订阅的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 处理器优先级
///
/// 同一事件的处理器按优先级从低到高依次调用，最高优先级最后执行、拥有最终决定权；
/// 同优先级按登记顺序调用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lowest => "lowest",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Highest => "highest",
        };
        f.write_str(s)
    }
}

/// 处理器返回值：`()` 或 `Result<(), E>`（`E` 可转换为 `anyhow::Error`）
pub trait HandlerOutput {
    fn into_result(self) -> anyhow::Result<()>;
}

impl HandlerOutput for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> HandlerOutput for std::result::Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

/// 处理器可接受的参数：具体事件类型，或 `dyn AnyEvent`（接收全部事件）
pub trait Param: 'static {
    fn event_type() -> EventType;

    fn extract<'a>(call: &Invocation<'a>) -> Option<&'a Self>;
}

impl<E: Event> Param for E {
    fn event_type() -> EventType {
        EventType::of::<E>()
    }

    fn extract<'a>(call: &Invocation<'a>) -> Option<&'a Self> {
        call.view.downcast_ref::<E>()
    }
}

impl Param for dyn AnyEvent {
    fn event_type() -> EventType {
        EventType::any()
    }

    fn extract<'a>(call: &Invocation<'a>) -> Option<&'a Self> {
        Some(call.origin)
    }
}

/// 处理器方法的类型擦除形态，由调用策略转换为执行器
pub(crate) trait Method: Send + Sync {
    fn listener_type(&self) -> TypeId;

    fn accepts(&self, receiver: &dyn Any) -> bool;

    /// 无状态（零大小）处理函数的类型标识，可在实例间共享；带捕获状态的闭包返回 `None`
    fn stateless_id(&self) -> Option<TypeId>;

    /// 绑定到具体监听器实例，生成直接调用点
    fn bind(&self, listener: &Arc<dyn Any + Send + Sync>) -> Option<Arc<dyn Executor>>;

    /// 经由擦除后的接收者调用；接收者或事件类型不匹配时返回 `None`
    fn invoke(&self, receiver: &dyn Any, call: Invocation<'_>) -> Option<anyhow::Result<()>>;
}

struct TypedMethod<L, P: ?Sized, F, R> {
    f: Arc<F>,
    _marker: PhantomData<fn(&L, &P) -> R>,
}

impl<L, P, F, R> Method for TypedMethod<L, P, F, R>
where
    L: Send + Sync + 'static,
    P: Param + ?Sized,
    F: Fn(&L, &P) -> R + Send + Sync + 'static,
    R: HandlerOutput + 'static,
{
    fn listener_type(&self) -> TypeId {
        TypeId::of::<L>()
    }

    fn accepts(&self, receiver: &dyn Any) -> bool {
        receiver.is::<L>()
    }

    fn stateless_id(&self) -> Option<TypeId> {
        (size_of::<F>() == 0).then(TypeId::of::<F>)
    }

    fn bind(&self, listener: &Arc<dyn Any + Send + Sync>) -> Option<Arc<dyn Executor>> {
        let listener = listener.clone().downcast::<L>().ok()?;
        Some(Arc::new(DirectExecutor::<L, P, F, R>::new(
            listener,
            self.f.clone(),
        )))
    }

    fn invoke(&self, receiver: &dyn Any, call: Invocation<'_>) -> Option<anyhow::Result<()>> {
        let receiver = receiver.downcast_ref::<L>()?;
        let param = P::extract(&call)?;
        Some((self.f)(receiver, param).into_result())
    }
}

/// 登记完成的单个处理器
#[derive(Clone)]
pub(crate) struct HandlerSpec {
    pub name: &'static str,
    pub event_type: EventType,
    pub priority: Priority,
    pub method: Arc<dyn Method>,
}

/// 处理器登记表：订阅时由 `Listener::register` 或登记闭包填充
pub struct Handlers<L> {
    specs: Vec<HandlerSpec>,
    _listener: PhantomData<fn(&L)>,
}

impl<L> Default for Handlers<L> {
    fn default() -> Self {
        Self {
            specs: Vec::new(),
            _listener: PhantomData,
        }
    }
}

impl<L: Send + Sync + 'static> Handlers<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个处理器
    ///
    /// - `name`：处理器名称，在同一监听器内唯一（用于日志与失败报告）
    /// - `P`：接受的事件类型；`dyn AnyEvent` 表示接收全部事件
    pub fn handle<P, R, F>(&mut self, name: &'static str, priority: Priority, handler: F) -> &mut Self
    where
        P: Param + ?Sized,
        F: Fn(&L, &P) -> R + Send + Sync + 'static,
        R: HandlerOutput + 'static,
    {
        self.specs.push(HandlerSpec {
            name,
            event_type: P::event_type(),
            priority,
            method: Arc::new(TypedMethod::<L, P, F, R> {
                f: Arc::new(handler),
                _marker: PhantomData,
            }),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// 已登记的处理器名称（登记顺序）
    pub fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(|s| s.name).collect()
    }

    /// 校验登记结果：至少一个处理器，名称非空且不重复
    pub(crate) fn validate(&self) -> Result<()> {
        let listener = type_name::<L>();

        if self.specs.is_empty() {
            return Err(EventBusError::invalid_listener(
                listener,
                "no subscribed handlers declared",
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.specs {
            if spec.name.trim().is_empty() {
                return Err(EventBusError::invalid_listener(
                    listener,
                    format!("handler for {} has an empty name", spec.event_type),
                ));
            }
            if !seen.insert(spec.name) {
                return Err(EventBusError::invalid_listener(
                    listener,
                    format!("duplicate handler name '{}'", spec.name),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn into_specs(self) -> Vec<HandlerSpec> {
        self.specs
    }
}
