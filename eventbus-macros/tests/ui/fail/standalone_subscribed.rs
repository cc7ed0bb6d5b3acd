#![allow(dead_code)]
use eventbus_macros::subscribed;

#[subscribed]
fn handle() {}

fn main() {}
