use eventbus::{AnyEvent, EventBus, Priority};
use eventbus_macros::{Event, listener};
use std::sync::{Arc, Mutex};

#[derive(Event)]
struct Ping;

#[derive(Default)]
struct Journal {
    lines: Mutex<Vec<&'static str>>,
}

#[listener]
impl Journal {
    #[subscribed(priority = Highest, name = "last_word")]
    fn conclude(&self, _: &Ping) {
        self.lines.lock().unwrap().push("highest");
    }

    #[subscribed(priority = Priority::Lowest)]
    fn first(&self, _: &Ping) -> anyhow::Result<()> {
        self.lines.lock().unwrap().push("lowest");
        Ok(())
    }

    #[subscribed]
    fn everything(&self, event: &dyn AnyEvent) {
        assert!(event.is::<Ping>());
        self.lines.lock().unwrap().push("any");
    }
}

fn main() {
    let bus = EventBus::default();
    let journal = Arc::new(Journal::default());
    bus.subscribe(journal.clone()).unwrap();

    assert_eq!(bus.fire(&Ping).unwrap(), 3);
    assert_eq!(
        *journal.lines.lock().unwrap(),
        vec!["lowest", "any", "highest"]
    );

    let _ = Priority::default();
}
