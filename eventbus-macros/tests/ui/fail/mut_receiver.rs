#![allow(dead_code)]
use eventbus_macros::listener;

struct Ping;
struct Pinger;

#[listener]
impl Pinger {
    #[subscribed]
    fn handle(&mut self, _event: &Ping) {}
}

fn main() {}
