#![allow(dead_code)]
use eventbus_macros::listener;

struct Ping;
struct Pinger;

#[listener]
impl Pinger {
    #[subscribed(priority = Urgent)]
    fn handle(&self, _event: &Ping) {}
}

fn main() {}
