use eventbus::EventBus;
use eventbus_macros::{Event, listener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[derive(Event)]
struct Tick;

#[derive(Default)]
struct Counter {
    ticks: AtomicUsize,
}

#[listener]
impl Counter {
    #[subscribed]
    fn on_tick(&self, _: &Tick) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn concurrent_fires_are_all_delivered() {
    let bus = Arc::new(EventBus::default());
    let counter = Arc::new(Counter::default());
    bus.subscribe(counter.clone()).unwrap();

    thread::scope(|s| {
        for _ in 0..8 {
            let bus = bus.clone();
            s.spawn(move || {
                for _ in 0..250 {
                    bus.fire(&Tick).unwrap();
                }
            });
        }
    });

    assert_eq!(counter.ticks.load(Ordering::SeqCst), 2000);
}

#[test]
fn subscribe_and_unsubscribe_race_with_fire() {
    let bus = Arc::new(EventBus::default());
    let stable = Arc::new(Counter::default());
    bus.subscribe(stable.clone()).unwrap();

    thread::scope(|s| {
        let churn = bus.clone();
        s.spawn(move || {
            for _ in 0..200 {
                let transient = Arc::new(Counter::default());
                churn.subscribe(transient.clone()).unwrap();
                churn.unsubscribe(&transient).unwrap();
            }
        });

        for _ in 0..4 {
            let bus = bus.clone();
            s.spawn(move || {
                for _ in 0..200 {
                    let invoked = bus.fire(&Tick).unwrap();
                    assert!((1..=2).contains(&invoked));
                }
            });
        }
    });

    assert_eq!(stable.ticks.load(Ordering::SeqCst), 800);
    assert_eq!(bus.listener_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_bus_across_tokio_tasks() {
    let bus = Arc::new(EventBus::default());
    let counter = Arc::new(Counter::default());
    bus.subscribe(counter.clone()).unwrap();

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..16 {
        let bus = bus.clone();
        set.spawn(async move { bus.fire(&Tick) });
    }
    while let Some(joined) = set.join_next().await {
        assert_eq!(joined.unwrap().unwrap(), 1);
    }

    assert_eq!(counter.ticks.load(Ordering::SeqCst), 16);
}
