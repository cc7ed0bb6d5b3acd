//! 调用策略（InvocationStrategy）
//!
//! 订阅时把每个已登记的处理器转换为执行器（`Executor`），分发时只调用执行器：
//! - `Reflective`：基线策略。监听器以类型擦除形式保存，每次调用都对接收者与事件做向下转型，
//!   无状态处理函数的方法表按（监听器类型, 处理函数类型, 事件类型）在总线内共享缓存；
//! - `Compiled`：订阅时为每个绑定生成单态化的直接调用点，持有强类型的 `Arc<L>`，
//!   每次调用只检查事件视图。默认策略。
//!
//! 策略在总线构造时确定，生命周期内不可更换。
//!
pub(crate) mod compiled;
pub(crate) mod reflective;

use crate::error::EventBusError;
use crate::event::AnyEvent;
use crate::listener::HandlerSpec;
use serde::Deserialize;
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 一次处理器调用的输入：匹配类型下的事件视图与原始事件
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    pub(crate) view: &'a dyn Any,
    pub(crate) origin: &'a dyn AnyEvent,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(view: &'a dyn Any, origin: &'a dyn AnyEvent) -> Self {
        Self { view, origin }
    }
}

/// 绑定后的可调用体
pub(crate) trait Executor: Send + Sync {
    fn execute(&self, call: Invocation<'_>) -> anyhow::Result<()>;
}

/// 由策略生成执行器
pub(crate) trait ExecutorFactory: Send + Sync {
    fn create(
        &self,
        listener: &Arc<dyn Any + Send + Sync>,
        spec: &HandlerSpec,
    ) -> Option<Arc<dyn Executor>>;
}

/// 调用策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum InvocationStrategy {
    Reflective,
    #[default]
    Compiled,
}

impl InvocationStrategy {
    pub const ALL: [InvocationStrategy; 2] = [Self::Reflective, Self::Compiled];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reflective => "reflection",
            Self::Compiled => "compiled",
        }
    }

    pub(crate) fn factory(&self) -> Box<dyn ExecutorFactory> {
        match self {
            Self::Reflective => Box::new(reflective::ReflectiveFactory::default()),
            Self::Compiled => Box::new(compiled::CompiledFactory),
        }
    }
}

impl fmt::Display for InvocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InvocationStrategy {
    type Err = EventBusError;

    /// 解析策略名；运行时代码生成类策略不可用，直接报错而不回退
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reflection" | "reflective" => Ok(Self::Reflective),
            "compiled" | "direct" => Ok(Self::Compiled),
            name @ ("asm" | "bytecode" | "method-handle" | "method_handle" | "methodhandle") => {
                Err(EventBusError::unsupported_strategy(
                    name,
                    "runtime code generation is not available; use 'compiled'",
                ))
            }
            other => Err(EventBusError::unsupported_strategy(
                other,
                "unknown strategy; expected 'reflection' | 'compiled'",
            )),
        }
    }
}

impl TryFrom<String> for InvocationStrategy {
    type Error = EventBusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
