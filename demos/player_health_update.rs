//! Player Health Update Example
//!
//! Demonstrates a HUD element subscribed through a weak reference. When the
//! HUD closes, the next raise evicts its binding without calling it.
//!
//! Expected output:
//!
//! ```text
//! [Game] Player took 25 damage
//! [UI] Player HP: 75
//! [Game] Player took 10 damage
//! Active observers: 0
//! ```

use sparkle::prelude::*;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

struct HealthBar;

impl HealthBar {
    fn on_health_changed(&self, hp: &i32) {
        println!("[UI] Player HP: {}", hp);
    }
}

struct Player {
    hp: i32,
    on_health_changed: Event<i32>,
}

impl Player {
    fn new() -> Self {
        Self {
            hp: 100,
            on_health_changed: Event::named("HealthChanged"),
        }
    }

    fn damage(&mut self, amount: i32) {
        self.hp -= amount;
        println!("[Game] Player took {} damage", amount);
        self.on_health_changed.raise(self.hp);
    }

    fn on_health_changed(&mut self) -> &mut EventBinder<i32> {
        self.on_health_changed.binder_mut()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut player = Player::new();

    {
        // HUD spawned
        let ui = Rc::new(HealthBar);
        player
            .on_health_changed()
            .bind_weak(&Rc::downgrade(&ui), HealthBar::on_health_changed);

        player.damage(25);
        // HUD closed
    }

    player.damage(10);
    println!("Active observers: {}", player.on_health_changed.size());
}
