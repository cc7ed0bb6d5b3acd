//! 排队分发（QueuedDispatcher）
//!
//! 在 tokio 运行时中以单个工作任务串行消费事件队列：
//! - `post` 入队后立即返回 `PendingDispatch`，可等待该事件的分发结果；
//! - 事件按入队顺序逐个分发，处理器在阻塞线程池上同步执行；
//! - `shutdown` 关闭入口、排空已入队事件并等待工作任务结束。
//!
use crate::bus::EventBus;
use crate::dispatch::panic_message;
use crate::error::{EventBusError, Result};
use crate::event::{Event, EventType};
use parking_lot::Mutex;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct QueuedDispatcher {
    bus: Arc<EventBus>,
    tx: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedDispatcher {
    /// 在当前 tokio 运行时上启动工作任务
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use [`QueuedDispatcher::spawn_on`]
    /// with an explicit [`Handle`] from non-runtime threads.
    pub fn spawn(bus: Arc<EventBus>) -> Self {
        Self::spawn_on(bus, &Handle::current())
    }

    /// 在指定运行时上启动工作任务
    pub fn spawn_on(bus: Arc<EventBus>, handle: &Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = handle.spawn(Self::run(bus.config().name.clone(), rx));

        Self {
            bus,
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    async fn run(name: String, mut rx: mpsc::UnboundedReceiver<Job>) {
        while let Some(job) = rx.recv().await {
            if let Err(err) = tokio::task::spawn_blocking(job).await {
                tracing::error!(bus = %name, error = %err, "queued dispatch aborted");
            }
        }
        tracing::debug!(bus = %name, "queued dispatcher stopped");
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// 入队一个事件；关闭后返回 `DispatcherClosed`
    pub fn post<E: Event>(&self, event: E) -> Result<PendingDispatch> {
        let (done, outcome) = oneshot::channel();
        let bus = self.bus.clone();
        let job: Job = Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| bus.fire(&event))).unwrap_or_else(
                |payload| {
                    Err(EventBusError::DispatchPanicked {
                        event: EventType::of::<E>().name(),
                        message: panic_message(payload.as_ref()).to_owned(),
                    })
                },
            );
            // 接收方可能已放弃等待
            let _ = done.send(outcome);
        });

        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(EventBusError::DispatcherClosed)?;
        tx.send(job).map_err(|_| EventBusError::DispatcherClosed)?;
        Ok(PendingDispatch { outcome })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().as_ref().is_none_or(|tx| tx.is_closed())
    }

    /// 关闭入口并等待已入队事件全部分发完毕
    pub async fn shutdown(&self) {
        drop(self.tx.lock().take());
        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        if let Err(err) = worker.await {
            tracing::error!(bus = %self.bus.config().name, error = %err, "queued dispatcher worker failed");
        }
    }
}

/// 已入队事件的分发结果
#[must_use = "the dispatch outcome is only observable through `outcome().await`"]
pub struct PendingDispatch {
    outcome: oneshot::Receiver<Result<usize>>,
}

impl PendingDispatch {
    /// 等待分发完成，返回调用的处理器数量或分发错误
    pub async fn outcome(self) -> Result<usize> {
        self.outcome
            .await
            .map_err(|_| EventBusError::DispatcherClosed)?
    }
}
