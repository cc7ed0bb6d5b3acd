use eventbus::{EventBus, InvocationStrategy};
use eventbus_macros::{Event, listener};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Event, Debug)]
struct MessageEvent {
    message: String,
}

struct ListenerBaby;

#[listener]
impl ListenerBaby {
    #[subscribed]
    fn on_message(&self, event: &MessageEvent) {
        println!("{}", event.message);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let bus = EventBus::new_default(InvocationStrategy::Compiled);
    let baby = Arc::new(ListenerBaby);
    bus.subscribe(baby.clone())?;

    let invoked = bus.fire(&MessageEvent {
        message: "Hello, World!".to_string(),
    })?;
    tracing::info!(invoked, "message delivered");

    bus.unsubscribe(&baby)?;
    Ok(())
}
