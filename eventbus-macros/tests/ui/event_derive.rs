use eventbus::{Event, EventType};
use eventbus_macros::Event;

#[derive(Event)]
struct MessageEvent(String);

#[derive(Event)]
struct Envelope<T> {
    payload: T,
}

#[derive(Event)]
enum Lifecycle {
    Started,
    Stopped { code: i32 },
}

fn assert_event<E: Event>() -> EventType {
    EventType::of::<E>()
}

fn main() {
    assert_ne!(assert_event::<MessageEvent>(), assert_event::<Envelope<u8>>());
    assert_ne!(assert_event::<Envelope<u8>>(), assert_event::<Envelope<String>>());
    let _ = assert_event::<Lifecycle>();

    let _ = MessageEvent(String::new()).0;
    let _ = Envelope { payload: 1_u8 }.payload;
    let _ = [Lifecycle::Started, Lifecycle::Stopped { code: 0 }];
}
