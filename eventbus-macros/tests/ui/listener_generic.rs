use eventbus::{EventBus, Listener};
use eventbus_macros::{Event, listener};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Event)]
struct Amount(u64);

struct Summer<Tag> {
    total: AtomicU64,
    _tag: PhantomData<fn() -> Tag>,
}

#[listener]
impl<Tag: 'static> Summer<Tag> {
    #[subscribed(name = "add")]
    fn on_amount(&self, amount: &Amount) {
        self.total.fetch_add(amount.0, Ordering::SeqCst);
    }
}

struct Daily;

fn assert_listener<L: Listener>() {}

fn main() {
    assert_listener::<Summer<Daily>>();

    let bus = EventBus::default();
    let summer = Arc::new(Summer::<Daily> {
        total: AtomicU64::new(0),
        _tag: PhantomData,
    });
    bus.subscribe(summer.clone()).unwrap();
    bus.fire(&Amount(40)).unwrap();
    bus.fire(&Amount(2)).unwrap();

    assert_eq!(summer.total.load(Ordering::SeqCst), 42);
}
