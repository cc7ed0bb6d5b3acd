use crate::strategy::InvocationStrategy;
use bon::Builder;
use serde::Deserialize;
use std::fmt;

/// 分发失败策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 调用全部处理器，结束后汇总返回所有失败
    #[default]
    Aggregate,
    /// 第一个失败即停止本次分发并返回
    FailFast,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate => f.write_str("aggregate"),
            Self::FailFast => f.write_str("fail_fast"),
        }
    }
}

/// 总线配置
///
/// ```
/// use eventbus::{BusConfig, FailurePolicy, InvocationStrategy};
///
/// let config = BusConfig::builder()
///     .name("orders")
///     .strategy(InvocationStrategy::Reflective)
///     .failure_policy(FailurePolicy::FailFast)
///     .build();
/// assert!(config.catch_panics);
/// ```
#[derive(Builder, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// 总线名称，用于日志
    #[builder(into, default = String::from("default"))]
    pub name: String,
    /// 调用策略，总线生命周期内不可更换
    #[builder(default)]
    pub strategy: InvocationStrategy,
    #[builder(default)]
    pub failure_policy: FailurePolicy,
    /// 是否捕获处理器 panic 并作为失败上报
    #[builder(default = true)]
    pub catch_panics: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BusConfig {
    pub fn with_strategy(strategy: InvocationStrategy) -> Self {
        Self::builder().strategy(strategy).build()
    }
}
