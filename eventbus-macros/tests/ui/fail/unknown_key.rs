#![allow(dead_code)]
use eventbus_macros::listener;

struct Ping;
struct Pinger;

#[listener]
impl Pinger {
    #[subscribed(order = 1)]
    fn handle(&self, _event: &Ping) {}
}

fn main() {}
