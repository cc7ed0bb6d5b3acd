use eventbus::{BusConfig, EventBus, FailurePolicy, InvocationStrategy, Priority};
use eventbus_macros::{Event, listener};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Event)]
struct Withdraw {
    amount: i64,
}

struct Account {
    balance: AtomicI64,
}

#[listener]
impl Account {
    // 最先执行：校验
    #[subscribed(priority = Lowest)]
    fn validate(&self, event: &Withdraw) -> anyhow::Result<()> {
        anyhow::ensure!(event.amount > 0, "amount must be positive");
        let balance = self.balance.load(Ordering::SeqCst);
        anyhow::ensure!(balance >= event.amount, "insufficient funds: {balance}");
        Ok(())
    }

    #[subscribed]
    fn apply(&self, event: &Withdraw) {
        self.balance.fetch_sub(event.amount, Ordering::SeqCst);
    }

    // 最后执行：观察最终结果
    #[subscribed(priority = Highest, name = "report")]
    fn report(&self, event: &Withdraw) {
        println!(
            "withdrew {}, balance now {}",
            event.amount,
            self.balance.load(Ordering::SeqCst)
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = EventBus::new(
        BusConfig::builder()
            .name("accounts")
            .strategy(InvocationStrategy::Compiled)
            .failure_policy(FailurePolicy::FailFast)
            .build(),
    );
    let account = Arc::new(Account {
        balance: AtomicI64::new(100),
    });
    bus.subscribe(account.clone())?;

    // 闭包监听器，优先级介于校验与执行之间
    bus.on_with_priority(Priority::Low, |event: &Withdraw| {
        println!("audit: withdraw {}", event.amount);
    })?;

    for amount in [30, 50, 40] {
        match bus.fire(&Withdraw { amount }) {
            Ok(invoked) => println!("{invoked} handler(s) ran"),
            Err(err) => eprintln!("rejected: {err}"),
        }
    }
    Ok(())
}
