//! 进程内类型化事件总线（eventbus）
//!
//! 单进程、内存内的发布/订阅分发器：
//! - 监听器对象声明若干被标记为订阅的处理方法（`Listener` / `#[listener]`）；
//! - 订阅时发现处理器、校验并按调用策略（`strategy`）生成执行器；
//! - `fire` 在调用线程上同步分发事件：按运行时类型、已声明的父类型与“全部事件”匹配，
//!   依（优先级, 登记顺序）依次调用；
//! - 失败按 `FailurePolicy` 汇总或立即返回，处理器 panic 默认被捕获为失败；
//! - `queued` 特性提供基于 tokio 的排队分发。
//!
//! 总线是显式构造的实例，不存在全局单例。
//!
//! ```
//! use eventbus::{Event, EventBus, Handlers, InvocationStrategy, Listener, Priority};
//! use std::sync::Arc;
//!
//! struct MessageEvent(String);
//! impl Event for MessageEvent {}
//!
//! struct ListenerBaby;
//!
//! impl ListenerBaby {
//!     fn on_message(&self, event: &MessageEvent) {
//!         println!("{}", event.0);
//!     }
//! }
//!
//! impl Listener for ListenerBaby {
//!     fn register(handlers: &mut Handlers<Self>) {
//!         handlers.handle::<MessageEvent, _, _>("on_message", Priority::Normal, Self::on_message);
//!     }
//! }
//!
//! let bus = EventBus::new_default(InvocationStrategy::Compiled);
//! bus.subscribe(Arc::new(ListenerBaby)).unwrap();
//! assert_eq!(bus.fire(&MessageEvent("Hello, World!".into())).unwrap(), 1);
//! ```
//!
mod bus;
pub mod config;
mod dispatch;
pub mod error;
mod event;
mod event_types;
mod listener;
#[cfg(feature = "queued")]
mod queued;
mod registry;
pub mod strategy;

pub use bus::EventBus;
pub use config::{BusConfig, FailurePolicy};
pub use error::{AggregateDispatchError, EventBusError, ListenerFailure, Result};
pub use event::{AnyEvent, Event, EventType};
pub use listener::{HandlerOutput, Handlers, Listener, ListenerId, Param, Priority};
#[cfg(feature = "queued")]
pub use queued::{PendingDispatch, QueuedDispatcher};
pub use strategy::{Invocation, InvocationStrategy};

// 允许在本 crate 内部通过 ::eventbus 进行自引用，
// 以便过程宏生成的代码在本 crate 的测试中也能解析。
extern crate self as eventbus;
