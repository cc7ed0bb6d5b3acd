//! 单次分发
//!
//! 从快照中收集事件自身类型、各祖先类型以及“全部事件”下的绑定，
//! 按（优先级, 登记序号）排序后在调用线程上依次执行，并按失败策略汇总结果。
//!
use crate::config::{BusConfig, FailurePolicy};
use crate::error::{AggregateDispatchError, ListenerFailure, Result};
use crate::event::{AnyEvent, EventType};
use crate::registry::{Binding, Snapshot};
use crate::strategy::Invocation;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

struct Call<'a> {
    binding: &'a Arc<Binding>,
    view: &'a dyn Any,
}

/// 收集事件适用的全部绑定并排序
fn plan<'a>(snapshot: &'a Snapshot, event: &'a dyn AnyEvent) -> Vec<Call<'a>> {
    let mut calls = Vec::new();
    for view in snapshot.types().resolve(event) {
        calls.extend(snapshot.bindings(view.event_type).iter().map(|binding| Call {
            binding,
            view: view.value,
        }));
    }
    calls.extend(snapshot.bindings(EventType::any()).iter().map(|binding| Call {
        binding,
        view: event.as_any(),
    }));
    calls.sort_by_key(|c| (c.binding.priority, c.binding.seq));
    calls
}

pub(crate) fn dispatch(
    snapshot: &Snapshot,
    event: &dyn AnyEvent,
    config: &BusConfig,
) -> Result<usize> {
    let event_type = event.event_type();
    let calls = plan(snapshot, event);
    tracing::trace!(
        bus = %config.name,
        event = event_type.name(),
        bindings = calls.len(),
        "dispatching event"
    );

    let mut failures = Vec::new();
    let mut invoked = 0;
    for call in calls {
        invoked += 1;
        let Err(source) = invoke(&call, event, config.catch_panics) else {
            continue;
        };

        let binding = call.binding;
        tracing::warn!(
            bus = %config.name,
            event = event_type.name(),
            listener = binding.listener_name,
            handler = binding.handler,
            id = %binding.listener,
            error = %source,
            "listener failed"
        );
        failures.push(ListenerFailure {
            listener: binding.listener,
            listener_name: binding.listener_name,
            handler: binding.handler,
            source,
        });

        if config.failure_policy == FailurePolicy::FailFast {
            break;
        }
    }

    if failures.is_empty() {
        Ok(invoked)
    } else {
        Err(AggregateDispatchError {
            event: event_type.name(),
            failures,
        }
        .into())
    }
}

fn invoke(call: &Call<'_>, event: &dyn AnyEvent, catch_panics: bool) -> anyhow::Result<()> {
    let invocation = Invocation::new(call.view, event);
    if !catch_panics {
        return call.binding.executor.execute(invocation);
    }

    match catch_unwind(AssertUnwindSafe(|| call.binding.executor.execute(invocation))) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!(
            "listener panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
