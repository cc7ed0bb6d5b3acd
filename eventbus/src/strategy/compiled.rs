//! 直接调用策略：订阅时生成单态化调用点
//!
use super::{Executor, ExecutorFactory, Invocation};
use crate::listener::{HandlerOutput, HandlerSpec, Param};
use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) struct CompiledFactory;

impl ExecutorFactory for CompiledFactory {
    fn create(
        &self,
        listener: &Arc<dyn Any + Send + Sync>,
        spec: &HandlerSpec,
    ) -> Option<Arc<dyn Executor>> {
        spec.method.bind(listener)
    }
}

/// 持有强类型监听器与处理函数的直接调用点
pub(crate) struct DirectExecutor<L, P: ?Sized, F, R> {
    listener: Arc<L>,
    f: Arc<F>,
    _marker: PhantomData<fn(&P) -> R>,
}

impl<L, P: ?Sized, F, R> DirectExecutor<L, P, F, R> {
    pub(crate) fn new(listener: Arc<L>, f: Arc<F>) -> Self {
        Self {
            listener,
            f,
            _marker: PhantomData,
        }
    }
}

impl<L, P, F, R> Executor for DirectExecutor<L, P, F, R>
where
    L: Send + Sync + 'static,
    P: Param + ?Sized,
    F: Fn(&L, &P) -> R + Send + Sync + 'static,
    R: HandlerOutput + 'static,
{
    fn execute(&self, call: Invocation<'_>) -> anyhow::Result<()> {
        let Some(param) = P::extract(&call) else {
            anyhow::bail!(
                "event view does not match handler parameter {}",
                type_name::<P>()
            );
        };
        (self.f)(&self.listener, param).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AnyEvent, Event};
    use crate::listener::{Handlers, Priority};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tick(usize);
    impl Event for Tick {}

    struct Other;
    impl Event for Other {}

    #[derive(Default)]
    struct Counter {
        total: AtomicUsize,
    }

    impl Counter {
        fn on_tick(&self, tick: &Tick) {
            self.total.fetch_add(tick.0, Ordering::SeqCst);
        }
    }

    fn compile(counter: &Arc<Counter>) -> Arc<dyn Executor> {
        let mut handlers = Handlers::<Counter>::new();
        handlers.handle::<Tick, _, _>("on_tick", Priority::Normal, Counter::on_tick);
        let spec = handlers.into_specs().remove(0);
        let erased: Arc<dyn Any + Send + Sync> = counter.clone();
        CompiledFactory.create(&erased, &spec).unwrap()
    }

    #[test]
    fn direct_executor_calls_typed_handler() {
        let counter = Arc::new(Counter::default());
        let executor = compile(&counter);

        let tick = Tick(5);
        let origin: &dyn AnyEvent = &tick;
        executor
            .execute(Invocation::new(origin.as_any(), origin))
            .unwrap();

        assert_eq!(counter.total.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn mismatched_event_view_is_an_error() {
        let counter = Arc::new(Counter::default());
        let executor = compile(&counter);

        let other = Other;
        let origin: &dyn AnyEvent = &other;
        let err = executor
            .execute(Invocation::new(origin.as_any(), origin))
            .unwrap_err();

        assert!(err.to_string().contains("does not match"));
        assert_eq!(counter.total.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn binding_to_wrong_listener_type_fails() {
        let mut handlers = Handlers::<Counter>::new();
        handlers.handle::<Tick, _, _>("on_tick", Priority::Normal, Counter::on_tick);
        let spec = handlers.into_specs().remove(0);

        let wrong: Arc<dyn Any + Send + Sync> = Arc::new(String::from("not a counter"));
        assert!(CompiledFactory.create(&wrong, &spec).is_none());
    }
}
