//! 事件总线统一错误定义
//!
//! 覆盖订阅校验、调用策略、事件层级与分发失败的最小必要集合，
//! 监听器自身返回的错误统一以 `anyhow::Error` 承载。
//!
use crate::listener::ListenerId;
use std::fmt;
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventBusError {
    // --- 订阅 ---
    #[error("invalid listener: listener={listener}, reason={reason}")]
    InvalidListener {
        listener: &'static str,
        reason: String,
    },
    #[error("listener not subscribed: {listener}")]
    NotSubscribed { listener: String },
    #[error("listener already subscribed: {listener}")]
    AlreadySubscribed { listener: &'static str },

    // --- 调用策略 ---
    #[error("unsupported invocation strategy: name={name}, reason={reason}")]
    UnsupportedStrategy { name: String, reason: String },

    // --- 事件层级 ---
    #[error("invalid event hierarchy: child={child}, parent={parent}, reason={reason}")]
    InvalidEventHierarchy {
        child: &'static str,
        parent: &'static str,
        reason: String,
    },

    // --- 分发 ---
    #[error(transparent)]
    AggregateDispatch(#[from] AggregateDispatchError),
    /// 未捕获 panic 的分发（`catch_panics = false`）在排队分发中被中断
    #[error("dispatch of {event} panicked: {message}")]
    DispatchPanicked { event: &'static str, message: String },
    #[error("queued dispatcher is closed")]
    DispatcherClosed,
}

/// 统一 Result 类型别名
pub type Result<T> = std::result::Result<T, EventBusError>;

impl EventBusError {
    pub(crate) fn invalid_listener(listener: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidListener {
            listener,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_strategy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedStrategy {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// 若为分发失败，返回聚合错误
    pub fn as_dispatch(&self) -> Option<&AggregateDispatchError> {
        match self {
            Self::AggregateDispatch(err) => Some(err),
            _ => None,
        }
    }
}

/// 单个监听器在一次分发中的失败记录
#[derive(Debug)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub listener_name: &'static str,
    pub handler: &'static str,
    pub source: anyhow::Error,
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} ({}): {}",
            self.listener_name, self.handler, self.listener, self.source
        )
    }
}

/// 一次 `fire` 调用中收集到的全部监听器失败
#[derive(Debug, Error)]
#[error("dispatch of {event} failed in {} listener(s): {}", .failures.len(), summary(.failures))]
pub struct AggregateDispatchError {
    pub event: &'static str,
    pub failures: Vec<ListenerFailure>,
}

impl AggregateDispatchError {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// 第一个失败的监听器（按调用顺序）
    pub fn first(&self) -> Option<&ListenerFailure> {
        self.failures.first()
    }

    pub fn handlers(&self) -> Vec<&'static str> {
        self.failures.iter().map(|f| f.handler).collect()
    }
}

fn summary(failures: &[ListenerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
