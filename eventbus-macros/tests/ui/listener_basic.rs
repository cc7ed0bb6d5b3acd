use eventbus::{EventBus, InvocationStrategy};
use eventbus_macros::{Event, listener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Event)]
struct MessageEvent(String);

#[derive(Default)]
struct ListenerBaby {
    heard: AtomicUsize,
}

#[listener]
impl ListenerBaby {
    #[subscribed]
    fn on_message(&self, event: &MessageEvent) {
        assert_eq!(event.0, "Hello, World!");
        self.heard.fetch_add(1, Ordering::SeqCst);
    }

    // 未标记的方法不会被登记
    fn heard(&self) -> usize {
        self.heard.load(Ordering::SeqCst)
    }
}

fn main() {
    for strategy in InvocationStrategy::ALL {
        let bus = EventBus::new_default(strategy);
        let baby = Arc::new(ListenerBaby::default());
        bus.subscribe(baby.clone()).unwrap();

        assert_eq!(bus.fire(&MessageEvent("Hello, World!".into())).unwrap(), 1);
        assert_eq!(baby.heard(), 1);
    }
}
