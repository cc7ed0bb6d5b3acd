//! 事件总线（EventBus）
//!
//! 显式构造的总线实例，持有监听器注册表与调用策略；不存在全局单例。
//! 所有方法均可在多线程间共享调用（`EventBus: Send + Sync`）。
//!
use crate::config::BusConfig;
use crate::dispatch::dispatch;
use crate::error::Result;
use crate::event::{AnyEvent, Event};
use crate::listener::{HandlerOutput, Handlers, Listener, ListenerId, Param, Priority};
use crate::registry::{ListenerRegistry, Registration, object_key};
use crate::strategy::{ExecutorFactory, InvocationStrategy};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// 闭包监听器的占位接收者
struct ClosureListener;

pub struct EventBus {
    config: BusConfig,
    factory: Box<dyn ExecutorFactory>,
    registry: ListenerRegistry,
}

impl EventBus {
    pub fn new(config: BusConfig) -> Self {
        tracing::debug!(bus = %config.name, strategy = %config.strategy, "event bus created");
        Self {
            factory: config.strategy.factory(),
            registry: ListenerRegistry::default(),
            config,
        }
    }

    /// 使用默认配置与指定调用策略
    pub fn new_default(strategy: InvocationStrategy) -> Self {
        Self::new(BusConfig::with_strategy(strategy))
    }

    /// 按策略名构造；未知或不可用的策略名返回 `UnsupportedStrategy`
    pub fn from_strategy_name(name: &str) -> Result<Self> {
        Ok(Self::new_default(name.parse()?))
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn strategy(&self) -> InvocationStrategy {
        self.config.strategy
    }

    /// 订阅监听器：登记 `Listener::register` 声明的全部处理器
    pub fn subscribe<L: Listener>(&self, listener: Arc<L>) -> Result<ListenerId> {
        self.subscribe_with(listener, L::register)
    }

    /// 以显式登记闭包订阅监听器，监听器类型无需实现 `Listener`
    ///
    /// 校验失败时不登记任何处理器。
    pub fn subscribe_with<L, F>(&self, listener: Arc<L>, register: F) -> Result<ListenerId>
    where
        L: Send + Sync + 'static,
        F: FnOnce(&mut Handlers<L>),
    {
        let mut handlers = Handlers::new();
        register(&mut handlers);
        handlers.validate()?;

        self.registry.register(
            Registration {
                name: type_name::<L>(),
                object: Some(object_key(&listener)),
                instance: listener,
                specs: handlers.into_specs(),
            },
            self.factory.as_ref(),
        )
    }

    /// 以闭包订阅单一事件类型，优先级为 `Normal`
    pub fn on<P, R, F>(&self, handler: F) -> Result<ListenerId>
    where
        P: Param + ?Sized,
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: HandlerOutput + 'static,
    {
        self.on_with_priority(Priority::Normal, handler)
    }

    pub fn on_with_priority<P, R, F>(&self, priority: Priority, handler: F) -> Result<ListenerId>
    where
        P: Param + ?Sized,
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: HandlerOutput + 'static,
    {
        let mut handlers = Handlers::<ClosureListener>::new();
        handlers.handle::<P, _, _>("on", priority, move |_: &ClosureListener, event: &P| {
            handler(event)
        });

        self.registry.register(
            Registration {
                name: "closure",
                object: None,
                instance: Arc::new(ClosureListener),
                specs: handlers.into_specs(),
            },
            self.factory.as_ref(),
        )
    }

    /// 退订监听器对象的全部处理器；未订阅时返回 `NotSubscribed`
    pub fn unsubscribe<L: Send + Sync + 'static>(&self, listener: &Arc<L>) -> Result<()> {
        self.registry
            .unregister_object(object_key(listener), type_name::<L>())
    }

    /// 按订阅标识退订（闭包监听器只能以此方式退订）
    pub fn unsubscribe_id(&self, id: ListenerId) -> Result<()> {
        self.registry.unregister(id)
    }

    pub fn is_subscribed<L: Send + Sync + 'static>(&self, listener: &Arc<L>) -> bool {
        self.registry
            .snapshot()
            .find_object(object_key(listener))
            .is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.snapshot().listener_count()
    }

    /// 声明事件类型 `C` 的父类型为 `P`
    ///
    /// 此后触发的 `C` 事件同样分发给接受 `P` 的处理器，`P` 视图由 `project` 取得。
    pub fn declare_supertype<C: Event, P: Event>(&self, project: fn(&C) -> &P) -> Result<()> {
        self.registry.declare_supertype(project)
    }

    /// 同步分发事件，返回调用的处理器数量
    ///
    /// 无适用处理器时为空操作并返回 `Ok(0)`。
    pub fn fire<E: Event>(&self, event: &E) -> Result<usize> {
        self.fire_dyn(event)
    }

    /// 按运行时类型分发类型擦除的事件
    pub fn fire_dyn(&self, event: &dyn AnyEvent) -> Result<usize> {
        let snapshot = self.registry.snapshot();
        dispatch(&snapshot, event, &self.config)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.config.name)
            .field("strategy", &self.config.strategy)
            .field("failure_policy", &self.config.failure_policy)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
