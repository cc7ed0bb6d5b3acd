use eventbus::EventBus;
use eventbus_macros::{Event, listener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Event)]
struct Ping;

#[derive(Default)]
struct Pinger {
    pings: AtomicUsize,
}

#[listener]
impl Pinger {
    #[subscribed]
    fn shorthand(&self, _ping: &Ping) {
        self.pings.fetch_add(1, Ordering::SeqCst);
    }

    #[subscribed(priority = High)]
    fn typed(self: &Self, _ping: &Ping) {
        self.pings.fetch_add(10, Ordering::SeqCst);
    }
}

fn main() {
    let bus = EventBus::default();
    let pinger = Arc::new(Pinger::default());
    bus.subscribe(pinger.clone()).unwrap();

    assert_eq!(bus.fire(&Ping).unwrap(), 2);
    assert_eq!(pinger.pings.load(Ordering::SeqCst), 11);
}
