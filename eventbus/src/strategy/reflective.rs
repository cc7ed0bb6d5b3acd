//! 反射式调用策略：接收者类型擦除，每次调用动态匹配
//!
use super::{Executor, ExecutorFactory, Invocation};
use crate::event::EventType;
use crate::listener::{HandlerSpec, Method};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

// (监听器类型, 处理函数类型, 事件类型)
type MethodKey = (TypeId, TypeId, EventType);

/// 同一总线内，相同的无状态处理函数共享方法表条目
#[derive(Default)]
pub(crate) struct ReflectiveFactory {
    methods: DashMap<MethodKey, Arc<dyn Method>>,
}

impl ReflectiveFactory {
    fn lookup(&self, spec: &HandlerSpec) -> Arc<dyn Method> {
        let Some(callable) = spec.method.stateless_id() else {
            return spec.method.clone();
        };
        let key = (spec.method.listener_type(), callable, spec.event_type);
        self.methods
            .entry(key)
            .or_insert_with(|| spec.method.clone())
            .clone()
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.methods.len()
    }
}

impl ExecutorFactory for ReflectiveFactory {
    fn create(
        &self,
        listener: &Arc<dyn Any + Send + Sync>,
        spec: &HandlerSpec,
    ) -> Option<Arc<dyn Executor>> {
        if !spec.method.accepts(&**listener) {
            return None;
        }
        Some(Arc::new(ReflectiveExecutor {
            receiver: listener.clone(),
            method: self.lookup(spec),
            handler: spec.name,
        }))
    }
}

struct ReflectiveExecutor {
    receiver: Arc<dyn Any + Send + Sync>,
    method: Arc<dyn Method>,
    handler: &'static str,
}

impl Executor for ReflectiveExecutor {
    fn execute(&self, call: Invocation<'_>) -> anyhow::Result<()> {
        match self.method.invoke(&*self.receiver, call) {
            Some(result) => result,
            None => anyhow::bail!(
                "handler '{}' cannot accept {}",
                self.handler,
                call.origin.event_type()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AnyEvent, Event};
    use crate::listener::{Handlers, Priority};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tick;
    impl Event for Tick {}

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
    }

    impl Counter {
        fn on_tick(&self, _tick: &Tick) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }

        fn on_any(&self, _event: &dyn AnyEvent) {
            self.hits.fetch_add(10, Ordering::SeqCst);
        }
    }

    fn specs() -> Vec<HandlerSpec> {
        let mut handlers = Handlers::<Counter>::new();
        handlers
            .handle::<Tick, _, _>("on_tick", Priority::Normal, Counter::on_tick)
            .handle::<dyn AnyEvent, _, _>("on_any", Priority::Normal, Counter::on_any);
        handlers.into_specs()
    }

    #[test]
    fn invokes_through_erased_receiver() {
        let factory = ReflectiveFactory::default();
        let counter = Arc::new(Counter::default());
        let erased: Arc<dyn Any + Send + Sync> = counter.clone();

        let tick = Tick;
        let origin: &dyn AnyEvent = &tick;
        for spec in specs() {
            let executor = factory.create(&erased, &spec).unwrap();
            executor
                .execute(Invocation::new(origin.as_any(), origin))
                .unwrap();
        }

        assert_eq!(counter.hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn method_table_is_shared_between_instances() {
        let factory = ReflectiveFactory::default();
        for _ in 0..3 {
            let erased: Arc<dyn Any + Send + Sync> = Arc::new(Counter::default());
            for spec in specs() {
                factory.create(&erased, &spec).unwrap();
            }
        }
        assert_eq!(factory.cached(), 2);
    }

    #[test]
    fn capturing_closures_are_never_shared() {
        let factory = ReflectiveFactory::default();
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(Counter::default());
        let total = Arc::new(AtomicUsize::new(0));

        let tick = Tick;
        let origin: &dyn AnyEvent = &tick;
        for step in [1, 100] {
            let total = total.clone();
            let mut handlers = Handlers::<Counter>::new();
            handlers.handle::<Tick, _, _>("add", Priority::Normal, move |_: &Counter, _: &Tick| {
                total.fetch_add(step, Ordering::SeqCst);
            });
            let spec = handlers.into_specs().remove(0);
            factory
                .create(&erased, &spec)
                .unwrap()
                .execute(Invocation::new(origin.as_any(), origin))
                .unwrap();
        }

        assert_eq!(total.load(Ordering::SeqCst), 101);
        assert_eq!(factory.cached(), 0);
    }

    #[test]
    fn rejects_foreign_receiver() {
        let factory = ReflectiveFactory::default();
        let wrong: Arc<dyn Any + Send + Sync> = Arc::new(42_u8);
        assert!(factory.create(&wrong, &specs()[0]).is_none());
    }
}
