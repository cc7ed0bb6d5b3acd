use eventbus::{EventBus, QueuedDispatcher};
use eventbus_macros::Event;
use std::sync::Arc;

#[derive(Event)]
struct Job {
    id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Arc::new(EventBus::default());
    bus.on(|job: &Job| -> anyhow::Result<()> {
        anyhow::ensure!(job.id != 3, "job {} is cursed", job.id);
        println!("processed job {}", job.id);
        Ok(())
    })?;

    let dispatcher = QueuedDispatcher::spawn(bus);
    let pending: Vec<_> = (1..=5)
        .map(|id| dispatcher.post(Job { id }))
        .collect::<Result<_, _>>()?;

    for (id, p) in (1..=5).zip(pending) {
        if let Err(err) = p.outcome().await {
            eprintln!("job {id} failed: {err}");
        }
    }

    dispatcher.shutdown().await;
    Ok(())
}
